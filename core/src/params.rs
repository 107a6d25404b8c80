//! Encoding of requests into the service's flat query parameters.
//!
//! # Design
//! Every request is a value of [`Request`]; [`Request::encode`] is the only
//! place that knows the parameter names and their quirks:
//!
//! - lists are joined with `-`, and an empty list is omitted entirely;
//! - booleans are sent as `"1"` / `"0"`;
//! - unset optional fields are omitted, never sent as empty strings;
//! - `showMonitorAlertContacts` is always sent, defaulting to `"0"`;
//! - `logs`, `alertContacts` and `showTimezone` are one coupled flag;
//! - edits without a subtype send `monitorSubType=0`, otherwise the service
//!   silently picks its own default.

use std::fmt::Display;

use serde::Deserialize;

use crate::types::{KeywordType, Monitor, MonitorType, NewMonitor, Subtype};
use crate::wire::Coded;

/// An ordered list of query parameters. Inserting an existing key replaces its
/// value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    fn insert_opt(&mut self, key: &str, value: Option<impl Into<String>>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    fn insert_list<T: Display>(&mut self, key: &str, items: &[T]) {
        if !items.is_empty() {
            self.insert(key, join_dashed(items));
        }
    }

    /// Append every pair of `other`, keeping this list's order first.
    pub fn extend(&mut self, other: Params) {
        for (key, value) in other.0 {
            self.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<(String, String)> {
        self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

pub fn encode_bool(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn encode_code<T: Coded>(value: T) -> String {
    value.code().to_string()
}

fn join_dashed<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("-")
}

/// Filters and detail flags for `getMonitors`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetrieveParameters {
    pub monitors: Vec<String>,
    /// Periods in days for which the service computes extra uptime ratios.
    pub custom_uptime_ratio: Vec<f32>,
    /// Drives the coupled `logs` / `alertContacts` / `showTimezone` flags.
    pub show_log: Option<bool>,
    pub show_alerts: Option<bool>,
    pub show_response_times: Option<bool>,
    /// Averaging window for response times, in minutes.
    pub response_times_average: Option<u32>,
    pub logs_limit: Option<u32>,
    pub response_times_limit: Option<u32>,
}

impl RetrieveParameters {
    pub fn encode(&self) -> Params {
        let mut params = Params::new();
        params.insert_list("monitors", &self.monitors);
        params.insert_list("customUptimeRatio", &self.custom_uptime_ratio);
        params.insert(
            "showMonitorAlertContacts",
            encode_bool(self.show_alerts.unwrap_or(false)),
        );
        if let Some(show_log) = self.show_log {
            let flag = encode_bool(show_log);
            params.insert("logs", flag);
            params.insert("alertContacts", flag);
            params.insert("showTimezone", flag);
        }
        params.insert_opt("responseTimes", self.show_response_times.map(encode_bool));
        params.insert_opt(
            "responseTimesAverage",
            self.response_times_average.map(|n| n.to_string()),
        );
        params.insert_opt("logsLimit", self.logs_limit.map(|n| n.to_string()));
        params.insert_opt(
            "responseTimesLimit",
            self.response_times_limit.map(|n| n.to_string()),
        );
        params
    }
}

/// Fields of `newMonitor` and `editMonitor`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorParameters {
    pub name: Option<String>,
    pub target: Option<String>,
    pub monitor_type: Option<MonitorType>,
    pub subtype: Option<Subtype>,
    pub port: Option<u16>,
    pub keyword_type: Option<KeywordType>,
    pub keyword_value: Option<String>,
    pub http_username: Option<String>,
    pub http_password: Option<String>,
    /// Alert contact ids.
    pub alerts: Vec<String>,
}

impl MonitorParameters {
    pub fn encode(&self) -> Params {
        let mut params = Params::new();
        params.insert_opt("monitorFriendlyName", self.name.clone());
        params.insert_opt("monitorURL", self.target.clone());
        params.insert_opt("monitorType", self.monitor_type.map(encode_code));
        params.insert_opt("monitorSubType", self.subtype.map(encode_code));
        params.insert_opt("monitorPort", self.port.map(|port| port.to_string()));
        params.insert_opt("monitorKeywordType", self.keyword_type.map(encode_code));
        params.insert_opt("monitorKeywordValue", self.keyword_value.clone());
        params.insert_opt("monitorHTTPUsername", self.http_username.clone());
        params.insert_opt("monitorHTTPPassword", self.http_password.clone());
        params.insert_list("monitorAlertContacts", &self.alerts);
        params
    }
}

impl From<&NewMonitor> for MonitorParameters {
    fn from(input: &NewMonitor) -> Self {
        Self {
            name: Some(input.name.clone()),
            target: Some(input.target.clone()),
            monitor_type: Some(input.monitor_type),
            subtype: input.subtype,
            port: input.port,
            keyword_type: input.keyword_type,
            keyword_value: input.keyword_value.clone(),
            http_username: input.http_username.clone(),
            http_password: input.http_password.clone(),
            alerts: input.alerts.clone(),
        }
    }
}

/// The service cannot change a monitor's type, so edits never send it.
impl From<&Monitor> for MonitorParameters {
    fn from(monitor: &Monitor) -> Self {
        Self {
            name: Some(monitor.name.clone()),
            target: Some(monitor.target.clone()),
            monitor_type: None,
            subtype: monitor.subtype,
            port: monitor.port,
            keyword_type: monitor.keyword_type,
            keyword_value: monitor.keyword_value.clone(),
            http_username: monitor.http_username.clone(),
            http_password: monitor.http_password.clone(),
            alerts: monitor.alert_ids(),
        }
    }
}

/// A request to the service, tagged by operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Retrieve(RetrieveParameters),
    Add(MonitorParameters),
    Edit { id: String, parameters: MonitorParameters },
    Delete { id: String },
}

impl Request {
    /// The remote operation name, used as the request path.
    pub fn operation(&self) -> &'static str {
        match self {
            Request::Retrieve(_) => "getMonitors",
            Request::Add(_) => "newMonitor",
            Request::Edit { .. } => "editMonitor",
            Request::Delete { .. } => "deleteMonitor",
        }
    }

    pub fn encode(&self) -> Params {
        match self {
            Request::Retrieve(parameters) => parameters.encode(),
            Request::Add(parameters) => parameters.encode(),
            Request::Edit { id, parameters } => {
                let mut params = parameters.encode();
                if parameters.subtype.is_none() {
                    params.insert("monitorSubType", "0");
                }
                params.insert("monitorID", id.clone());
                params
            }
            Request::Delete { id } => Params::from_iter([("monitorID", id.clone())]),
        }
    }
}
