//! Turning decoded envelopes into domain results.
//!
//! # Design
//! The service reports log and response-time timestamps in the account's
//! timezone without saying so on each value. When `showTimezone=1` was sent,
//! the envelope carries the offset in minutes and [`apply_timezone`] shifts
//! every nested timestamp of every monitor by it, once.
//!
//! `newMonitor` only echoes an id (and sometimes a status); [`backfill_created`]
//! rebuilds the monitor from the request that created it.

use chrono::{NaiveDateTime, TimeDelta};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::envelope::{CreatedMonitor, Envelope, RetrievePayload};
use crate::error::ApiError;
use crate::types::{Monitor, NewMonitor};

/// Decode a response body into an envelope of the expected shape.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<Envelope<T>, ApiError> {
    serde_json::from_str::<Option<Envelope<T>>>(body)
        .map_err(|e| ApiError::DeserializationError(e.to_string()))?
        .ok_or_else(|| ApiError::DeserializationError("response envelope is null".to_string()))
}

/// Unwrap the payload of a successful envelope, or surface the remote error.
pub fn check_status<T>(envelope: Envelope<T>) -> Result<T, ApiError> {
    if envelope.is_ok() {
        return Ok(envelope.payload);
    }
    warn!(
        stat = envelope.stat.as_deref().unwrap_or(""),
        code = envelope.error_code.as_deref().unwrap_or(""),
        message = envelope.error_message.as_deref().unwrap_or(""),
        "remote API reported failure"
    );
    Err(ApiError::Remote {
        code: envelope.error_code,
        message: envelope.error_message,
    })
}

/// The offset to apply, if the raw value parses to a non-zero number of
/// minutes.
pub fn timezone_offset(raw: Option<&str>) -> Option<i64> {
    raw?.trim().parse::<i64>().ok().filter(|&minutes| minutes != 0)
}

/// Shift every log and response-time timestamp of every monitor. Offsets that
/// would leave the representable date range are ignored.
pub fn apply_timezone(monitors: &mut [Monitor], offset_minutes: i64) {
    let Some(offset) = TimeDelta::try_minutes(offset_minutes) else {
        warn!(offset_minutes, "timezone offset out of range, not applied");
        return;
    };
    for monitor in monitors.iter_mut() {
        for sample in monitor.response_times.iter_mut() {
            sample.date = shift(sample.date, offset);
        }
        for log in monitor.logs.iter_mut() {
            log.date = shift(log.date, offset);
        }
    }
}

fn shift(date: NaiveDateTime, offset: TimeDelta) -> NaiveDateTime {
    date.checked_add_signed(offset).unwrap_or(date)
}

/// Monitors of a `getMonitors` payload, timezone-corrected. An absent list is
/// an empty result.
pub fn normalize_monitors(payload: RetrievePayload) -> Vec<Monitor> {
    let Some(list) = payload.monitors else {
        debug!("response carried no monitor list");
        return Vec::new();
    };
    let mut monitors = list.monitor;
    if let Some(offset) = timezone_offset(payload.timezone.as_deref()) {
        debug!(offset, monitors = monitors.len(), "applying timezone correction");
        apply_timezone(&mut monitors, offset);
    }
    monitors
}

/// The monitor a successful `newMonitor` call created. The request is trusted
/// over the response for everything but the id and status.
pub fn backfill_created(created: CreatedMonitor, request: &NewMonitor) -> Monitor {
    Monitor {
        id: created.id,
        name: request.name.clone(),
        target: request.target.clone(),
        monitor_type: request.monitor_type,
        subtype: request.subtype,
        port: request.port,
        keyword_type: request.keyword_type,
        keyword_value: request.keyword_value.clone(),
        http_username: request.http_username.clone(),
        http_password: request.http_password.clone(),
        status: created.status,
        interval: None,
        all_time_uptime_ratio: None,
        custom_uptime_ratios: Vec::new(),
        alerts: Vec::new(),
        logs: Vec::new(),
        response_times: Vec::new(),
    }
}
