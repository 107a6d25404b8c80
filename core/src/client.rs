//! Stateless request builder and response parser for the uptime API.
//!
//! # Design
//! `UptimeClient` holds only the base URL and the API key and carries no
//! mutable state between calls. Each operation is split into a `build_*`
//! method that produces an `HttpRequest` and a `parse_*` method that consumes
//! an `HttpResponse`. The caller, or [`MonitorClient`](crate::MonitorClient),
//! executes the round-trip in between.

use std::fmt;

use crate::config::ClientConfig;
use crate::envelope::{CreatePayload, NoPayload, RetrievePayload};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::normalize;
use crate::params::{MonitorParameters, Params, Request, RetrieveParameters};
use crate::types::{Monitor, NewMonitor};

/// Synchronous, stateless client for the uptime API.
#[derive(Clone)]
pub struct UptimeClient {
    base_url: String,
    api_key: String,
}

impl UptimeClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.base_url, &config.api_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Wrap an encoded request with the account parameters every call needs.
    pub fn build(&self, request: &Request) -> HttpRequest {
        let operation = request.operation();
        let mut params: Params = [
            ("apiKey", self.api_key.as_str()),
            ("format", "json"),
            ("noJsonCallback", "1"),
        ]
        .into_iter()
        .collect();
        params.extend(request.encode());

        HttpRequest {
            operation: operation.to_string(),
            url: format!("{}/{operation}", self.base_url),
            params,
        }
    }

    pub fn build_get_monitors(&self, parameters: &RetrieveParameters) -> HttpRequest {
        self.build(&Request::Retrieve(parameters.clone()))
    }

    pub fn build_new_monitor(&self, input: &NewMonitor) -> HttpRequest {
        self.build(&Request::Add(MonitorParameters::from(input)))
    }

    /// Alerts are taken from the monitor's current alert references.
    pub fn build_edit_monitor(&self, monitor: &Monitor) -> HttpRequest {
        self.build(&Request::Edit {
            id: monitor.id.clone(),
            parameters: MonitorParameters::from(monitor),
        })
    }

    pub fn build_delete_monitor(&self, id: &str) -> HttpRequest {
        self.build(&Request::Delete { id: id.to_string() })
    }

    /// Monitors in response order, timezone-corrected; empty when the
    /// response carries no list.
    pub fn parse_get_monitors(&self, response: HttpResponse) -> Result<Vec<Monitor>, ApiError> {
        check_status(&response)?;
        let payload = normalize::check_status(normalize::decode::<RetrievePayload>(&response.body)?)?;
        Ok(normalize::normalize_monitors(payload))
    }

    /// The created monitor, built from `input` and the id the service
    /// assigned.
    pub fn parse_new_monitor(&self, input: &NewMonitor, response: HttpResponse) -> Result<Monitor, ApiError> {
        check_status(&response)?;
        let payload = normalize::check_status(normalize::decode::<CreatePayload>(&response.body)?)?;
        let created = payload.monitor.ok_or_else(|| {
            ApiError::DeserializationError("newMonitor response carried no monitor".to_string())
        })?;
        Ok(normalize::backfill_created(created, input))
    }

    pub fn parse_edit_monitor(&self, response: HttpResponse) -> Result<bool, ApiError> {
        parse_default(response)
    }

    pub fn parse_delete_monitor(&self, response: HttpResponse) -> Result<bool, ApiError> {
        parse_default(response)
    }
}

impl fmt::Debug for UptimeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UptimeClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

fn parse_default(response: HttpResponse) -> Result<bool, ApiError> {
    check_status(&response)?;
    normalize::check_status(normalize::decode::<NoPayload>(&response.body)?)?;
    Ok(true)
}

/// Map non-2xx status codes to `ApiError::HttpError`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AlertType, MonitorStatus, MonitorType, Subtype};

    fn client() -> UptimeClient {
        UptimeClient::new("https://api.uptimerobot.com", "u956-abc")
    }

    const FAIL_402: &str = r#"{"stat":"fail","id":"402","message":"invalid API key"}"#;

    #[test]
    fn every_request_carries_account_parameters_first() {
        let req = client().build_delete_monitor("42");
        assert_eq!(req.operation, "deleteMonitor");
        assert_eq!(req.url, "https://api.uptimerobot.com/deleteMonitor");
        assert_eq!(
            req.params.keys().collect::<Vec<_>>(),
            vec!["apiKey", "format", "noJsonCallback", "monitorID"]
        );
        assert_eq!(req.params.get("apiKey"), Some("u956-abc"));
        assert_eq!(req.params.get("format"), Some("json"));
        assert_eq!(req.params.get("noJsonCallback"), Some("1"));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = UptimeClient::new("http://localhost:3000/", "k");
        let req = client.build_get_monitors(&RetrieveParameters::default());
        assert_eq!(req.url, "http://localhost:3000/getMonitors");
    }

    #[test]
    fn build_new_monitor_encodes_input() {
        let input = NewMonitor::new("api", "https://api.example.com", MonitorType::Http);
        let req = client().build_new_monitor(&input);
        assert_eq!(req.operation, "newMonitor");
        assert_eq!(req.params.get("monitorFriendlyName"), Some("api"));
        assert_eq!(req.params.get("monitorType"), Some("1"));
        assert!(!req.params.contains("monitorSubType"));
    }

    #[test]
    fn build_edit_monitor_uses_alert_ids_and_subtype_workaround() {
        let body = r#"{"id":"7","friendlyname":"a","url":"b","type":"1",
            "alertcontact":[{"id":"3","type":"2","value":"x@example.com"},
                            {"id":"4","type":"1","value":"+100"}]}"#;
        let monitor: Monitor = serde_json::from_str(body).unwrap();
        let req = client().build_edit_monitor(&monitor);
        assert_eq!(req.operation, "editMonitor");
        assert_eq!(req.params.get("monitorAlertContacts"), Some("3-4"));
        assert_eq!(req.params.get("monitorSubType"), Some("0"));
        assert!(!req.params.contains("monitorType"));
        assert_eq!(req.params.keys().last(), Some("monitorID"));
        assert_eq!(req.params.get("monitorID"), Some("7"));
    }

    #[test]
    fn parse_get_monitors_success() {
        let response = HttpResponse::ok(
            r#"{"stat":"ok","monitors":{"monitor":[
                {"id":"1","friendlyname":"one","url":"1.example","type":"4","subtype":"2"}]}}"#,
        );
        let monitors = client().parse_get_monitors(response).unwrap();
        assert_eq!(monitors.len(), 1);
        assert_eq!(monitors[0].subtype, Some(Subtype::Https));
    }

    #[test]
    fn parse_get_monitors_keeps_monitors_with_unrecognised_codes() {
        let response = HttpResponse::ok(
            r#"{"stat":"ok","monitors":{"monitor":[
                {"id":"1","friendlyname":"one","url":"1.example","type":"1","status":"",
                 "alertcontact":[{"id":"8","type":"11","status":"2","value":"https://hooks.example"}]},
                {"id":"2","friendlyname":"two","url":"2.example","type":"5","status":"2"}]}}"#,
        );
        let monitors = client().parse_get_monitors(response).unwrap();
        assert_eq!(monitors.len(), 2);
        assert_eq!(monitors[0].status, None);
        assert_eq!(monitors[0].alerts[0].alert_type, AlertType::Unknown(11));
        assert_eq!(monitors[0].alert_ids(), vec!["8".to_string()]);
        assert_eq!(monitors[1].monitor_type, MonitorType::Unknown(5));
        assert_eq!(monitors[1].status, Some(MonitorStatus::Up));
    }

    #[test]
    fn parse_get_monitors_without_list_is_empty() {
        let monitors = client().parse_get_monitors(HttpResponse::ok(r#"{"stat":"ok"}"#)).unwrap();
        assert!(monitors.is_empty());
    }

    #[test]
    fn remote_failure_surfaces_code_for_every_parse() {
        let c = client();
        let input = NewMonitor::new("a", "b", MonitorType::Ping);
        let errors = [
            c.parse_get_monitors(HttpResponse::ok(FAIL_402)).unwrap_err(),
            c.parse_new_monitor(&input, HttpResponse::ok(FAIL_402)).unwrap_err(),
            c.parse_edit_monitor(HttpResponse::ok(FAIL_402)).unwrap_err(),
            c.parse_delete_monitor(HttpResponse::ok(FAIL_402)).unwrap_err(),
        ];
        for err in errors {
            assert_eq!(err.remote_code(), Some("402"));
            assert_eq!(err.remote_message(), Some("invalid API key"));
        }
    }

    #[test]
    fn non_success_status_is_an_http_error() {
        let response = HttpResponse {
            status: 502,
            body: "bad gateway".to_string(),
        };
        let err = client().parse_delete_monitor(response).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 502, .. }));
    }

    #[test]
    fn parse_new_monitor_without_monitor_is_an_error() {
        let input = NewMonitor::new("a", "b", MonitorType::Ping);
        let err = client()
            .parse_new_monitor(&input, HttpResponse::ok(r#"{"stat":"ok"}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn parse_delete_monitor_success() {
        let response = HttpResponse::ok(r#"{"stat":"ok","monitor":{"id":"42"}}"#);
        assert!(client().parse_delete_monitor(response).unwrap());
    }

    #[test]
    fn parse_bad_json() {
        let err = client().parse_edit_monitor(HttpResponse::ok("not json")).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn debug_output_hides_the_key() {
        assert!(!format!("{:?}", client()).contains("u956-abc"));
    }
}
