//! Response envelopes as decoded from the wire.
//!
//! Every reply shares `stat`, `id` (error code) and `message`; the
//! operation-specific payload is flattened alongside them.

use serde::Deserialize;

use crate::types::{Monitor, MonitorStatus};
use crate::wire;

#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// `"ok"` or `"fail"`.
    #[serde(default)]
    pub stat: Option<String>,
    #[serde(rename = "id", default, deserialize_with = "wire::opt_string")]
    pub error_code: Option<String>,
    #[serde(rename = "message", default, deserialize_with = "wire::opt_string")]
    pub error_message: Option<String>,
    #[serde(flatten)]
    pub payload: T,
}

impl<T> Envelope<T> {
    pub fn is_ok(&self) -> bool {
        self.stat.as_deref() == Some("ok")
    }
}

/// Payload of `getMonitors`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetrievePayload {
    /// Account timezone offset in minutes, only sent with `showTimezone=1`.
    #[serde(default, deserialize_with = "wire::opt_string")]
    pub timezone: Option<String>,
    #[serde(default)]
    pub monitors: Option<MonitorList>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonitorList {
    #[serde(default)]
    pub monitor: Vec<Monitor>,
}

/// Payload of `newMonitor`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePayload {
    #[serde(default)]
    pub monitor: Option<CreatedMonitor>,
}

/// What the service echoes back for a new monitor.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedMonitor {
    #[serde(deserialize_with = "wire::string")]
    pub id: String,
    #[serde(default, deserialize_with = "wire::opt_code_or_empty")]
    pub status: Option<MonitorStatus>,
}

/// Payload of operations that only report success.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoPayload {}
