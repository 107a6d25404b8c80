//! Domain types for the uptime API.
//!
//! # Design
//! The same structs serve as the decoding target for responses and as the
//! values handed to callers; field renames carry the service's lowercase wire
//! names. Enumerations travel as numeric codes and implement [`Coded`] so the
//! parameter codec and the decoder share one mapping.
//!
//! Codes the client has no name for decode to each enum's `Unknown(code)`
//! variant, so a newer alert channel or monitor type never fails a whole
//! listing.
//!
//! Alert status `0` is documented by the service as both "unknown" and "not
//! activated". [`AlertStatus::NotActivated`] is the single representation of
//! that code.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};

use crate::wire::{self, Coded};

macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $code:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// A code without a named variant, kept as received.
            Unknown(u16),
        }

        impl Coded for $name {
            const NAME: &'static str = stringify!($name);

            fn code(self) -> u16 {
                match self {
                    $($name::$variant => $code,)+
                    $name::Unknown(code) => code,
                }
            }

            fn from_code(code: u16) -> Option<Self> {
                match code {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }

            fn unknown(code: u16) -> Self {
                $name::Unknown(code)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                wire::coded(deserializer)
            }
        }
    };
}

coded_enum! {
    /// What kind of check the service performs.
    MonitorType {
        Http = 1,
        Keyword = 2,
        Ping = 3,
        Port = 4,
    }
}

coded_enum! {
    /// Protocol of a port monitor.
    Subtype {
        Http = 1,
        Https = 2,
        Ftp = 3,
        Smtp = 4,
        Pop3 = 5,
        Imap = 6,
        /// Any port; requires `port` to be set.
        Custom = 99,
    }
}

coded_enum! {
    /// Whether a keyword monitor alerts when the keyword is present or absent.
    KeywordType {
        Exists = 1,
        NotExists = 2,
    }
}

coded_enum! {
    MonitorStatus {
        Paused = 0,
        NotCheckedYet = 1,
        Up = 2,
        SeemsDown = 8,
        Down = 9,
    }
}

coded_enum! {
    /// Notification channel of an alert contact.
    AlertType {
        Sms = 1,
        Email = 2,
        Twitter = 3,
        Boxcar = 4,
    }
}

coded_enum! {
    #[derive(Default)]
    AlertStatus {
        /// Code `0`, also reported by the service as "unknown".
        #[default]
        NotActivated = 0,
        Paused = 1,
        Active = 2,
    }
}

coded_enum! {
    LogType {
        Down = 1,
        Up = 2,
        Started = 98,
        Paused = 99,
    }
}

/// An alert contact. Monitors and log entries reference alerts; they do not
/// own them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Alert {
    #[serde(default, deserialize_with = "wire::string")]
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    #[serde(default)]
    pub status: AlertStatus,
    /// Phone number, e-mail address or account handle.
    #[serde(default, deserialize_with = "wire::string")]
    pub value: String,
}

/// A state change recorded for a monitor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Log {
    #[serde(rename = "type")]
    pub log_type: LogType,
    #[serde(rename = "datetime", deserialize_with = "wire::datetime")]
    pub date: NaiveDateTime,
    /// Alerts notified for this event.
    #[serde(rename = "alertcontact", default)]
    pub alerts: Vec<Alert>,
}

/// A latency sample in milliseconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResponseTime {
    #[serde(rename = "datetime", deserialize_with = "wire::datetime")]
    pub date: NaiveDateTime,
    #[serde(deserialize_with = "wire::number")]
    pub value: u32,
}

/// A watched target.
///
/// `port` is meaningful for [`MonitorType::Port`] with [`Subtype::Custom`];
/// the keyword fields for [`MonitorType::Keyword`]. Nested collections are
/// empty unless details were requested.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Monitor {
    #[serde(deserialize_with = "wire::string")]
    pub id: String,
    #[serde(rename = "friendlyname", default, deserialize_with = "wire::string")]
    pub name: String,
    #[serde(rename = "url", default, deserialize_with = "wire::string")]
    pub target: String,
    #[serde(rename = "type")]
    pub monitor_type: MonitorType,
    #[serde(default, deserialize_with = "wire::opt_coded")]
    pub subtype: Option<Subtype>,
    #[serde(default, deserialize_with = "wire::opt_number")]
    pub port: Option<u16>,
    #[serde(rename = "keywordtype", default, deserialize_with = "wire::opt_coded")]
    pub keyword_type: Option<KeywordType>,
    #[serde(rename = "keywordvalue", default, deserialize_with = "wire::opt_non_empty")]
    pub keyword_value: Option<String>,
    #[serde(rename = "httpusername", default, deserialize_with = "wire::opt_non_empty")]
    pub http_username: Option<String>,
    #[serde(rename = "httppassword", default, deserialize_with = "wire::opt_non_empty")]
    pub http_password: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_code_or_empty")]
    pub status: Option<MonitorStatus>,
    /// Check interval in seconds.
    #[serde(default, deserialize_with = "wire::opt_number")]
    pub interval: Option<u32>,
    #[serde(rename = "alltimeuptimeratio", default, deserialize_with = "wire::opt_number")]
    pub all_time_uptime_ratio: Option<f64>,
    /// One ratio per period requested through `customUptimeRatio`.
    #[serde(rename = "customuptimeratio", default, deserialize_with = "wire::dash_list")]
    pub custom_uptime_ratios: Vec<f64>,
    #[serde(rename = "alertcontact", default)]
    pub alerts: Vec<Alert>,
    #[serde(rename = "log", default)]
    pub logs: Vec<Log>,
    #[serde(rename = "responsetime", default)]
    pub response_times: Vec<ResponseTime>,
}

impl Monitor {
    /// Ids of the alerts attached to this monitor, in order.
    pub fn alert_ids(&self) -> Vec<String> {
        self.alerts.iter().map(|alert| alert.id.clone()).collect()
    }
}

/// Input for creating a monitor.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMonitor {
    pub name: String,
    pub target: String,
    pub monitor_type: MonitorType,
    pub subtype: Option<Subtype>,
    pub port: Option<u16>,
    pub keyword_value: Option<String>,
    pub keyword_type: Option<KeywordType>,
    /// Ids of existing alert contacts to notify.
    pub alerts: Vec<String>,
    pub http_username: Option<String>,
    pub http_password: Option<String>,
}

impl NewMonitor {
    pub fn new(name: impl Into<String>, target: impl Into<String>, monitor_type: MonitorType) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            monitor_type,
            subtype: None,
            port: None,
            keyword_value: None,
            keyword_type: None,
            alerts: Vec::new(),
            http_username: None,
            http_password: None,
        }
    }

    pub fn subtype(mut self, subtype: Subtype) -> Self {
        self.subtype = Some(subtype);
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn keyword(mut self, value: impl Into<String>, keyword_type: KeywordType) -> Self {
        self.keyword_value = Some(value.into());
        self.keyword_type = Some(keyword_type);
        self
    }

    pub fn alert(mut self, id: impl Into<String>) -> Self {
        self.alerts.push(id.into());
        self
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.http_username = Some(username.into());
        self.http_password = Some(password.into());
        self
    }
}

/// Anything that identifies a monitor.
pub trait MonitorId {
    fn monitor_id(&self) -> &str;
}

impl MonitorId for str {
    fn monitor_id(&self) -> &str {
        self
    }
}

impl MonitorId for String {
    fn monitor_id(&self) -> &str {
        self
    }
}

impl MonitorId for Monitor {
    fn monitor_id(&self) -> &str {
        &self.id
    }
}
