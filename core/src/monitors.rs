//! Async monitor operations over a [`Transport`].
//!
//! # Design
//! Each operation is one linear sequence: build the request with
//! [`UptimeClient`], send it, parse and normalize the response. Nothing is
//! retried or cached. The transport call is the only await point and is raced
//! against the caller's [`Cancellation`].

use std::time::Duration;

use tracing::{debug, warn};

use crate::cancel::Cancellation;
use crate::client::UptimeClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::params::RetrieveParameters;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{Monitor, MonitorId, NewMonitor};

/// Number of log entries and response-time samples requested per monitor.
pub const DETAIL_PAGE_SIZE: u32 = 25;

/// Options for [`MonitorClient::list`] and [`MonitorClient::get`].
#[derive(Debug, Clone, PartialEq)]
pub struct ListOptions {
    /// Restrict the result to these monitor ids; empty means all.
    pub ids: Vec<String>,
    /// Include alerts, logs and response times.
    pub include_details: bool,
    /// Periods in days for extra uptime ratios.
    pub custom_uptime_ratio: Vec<f32>,
    /// Averaging window for response times in minutes; `0` leaves it to the
    /// service.
    pub response_times_average: u32,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            include_details: true,
            custom_uptime_ratio: Vec::new(),
            response_times_average: 0,
        }
    }
}

impl ListOptions {
    pub fn ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn include_details(mut self, include: bool) -> Self {
        self.include_details = include;
        self
    }

    pub fn custom_uptime_ratio(mut self, days: Vec<f32>) -> Self {
        self.custom_uptime_ratio = days;
        self
    }

    pub fn response_times_average(mut self, minutes: u32) -> Self {
        self.response_times_average = minutes;
        self
    }

    fn to_parameters(&self) -> RetrieveParameters {
        RetrieveParameters {
            monitors: self.ids.clone(),
            custom_uptime_ratio: self.custom_uptime_ratio.clone(),
            show_log: Some(self.include_details),
            show_alerts: Some(self.include_details),
            show_response_times: Some(self.include_details),
            response_times_average: (self.response_times_average > 0)
                .then_some(self.response_times_average),
            logs_limit: Some(DETAIL_PAGE_SIZE),
            response_times_limit: Some(DETAIL_PAGE_SIZE),
        }
    }
}

/// Typed monitor operations. Holds only immutable configuration, so one
/// instance can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct MonitorClient<T> {
    client: UptimeClient,
    transport: T,
}

impl MonitorClient<ReqwestTransport> {
    /// A client that talks to the configured endpoint through `reqwest`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::new(UptimeClient::from_config(config), transport))
    }
}

impl<T: Transport> MonitorClient<T> {
    pub fn new(client: UptimeClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &UptimeClient {
        &self.client
    }

    /// All monitors matching `options`, in the order the service returned
    /// them.
    pub async fn list(&self, options: &ListOptions, cancel: &Cancellation) -> Result<Vec<Monitor>, ApiError> {
        let request = self.client.build_get_monitors(&options.to_parameters());
        let response = self.dispatch(request, cancel).await?;
        let monitors = self.client.parse_get_monitors(response)?;
        debug!(count = monitors.len(), "retrieved monitors");
        Ok(monitors)
    }

    /// The monitor with `id`, or `None` when the service returns no match.
    /// `options.ids` is replaced by `id`.
    pub async fn get(
        &self,
        id: &str,
        options: &ListOptions,
        cancel: &Cancellation,
    ) -> Result<Option<Monitor>, ApiError> {
        let options = options.clone().ids([id]);
        let monitors = self.list(&options, cancel).await?;
        Ok(monitors.into_iter().next())
    }

    /// Create a monitor. The result reflects `input`, with the id assigned by
    /// the service.
    pub async fn create(&self, input: &NewMonitor, cancel: &Cancellation) -> Result<Monitor, ApiError> {
        let request = self.client.build_new_monitor(input);
        let response = self.dispatch(request, cancel).await?;
        let monitor = self.client.parse_new_monitor(input, response)?;
        debug!(id = %monitor.id, "created monitor");
        Ok(monitor)
    }

    /// Push the editable fields of `monitor`, including its current alerts.
    pub async fn edit(&self, monitor: &Monitor, cancel: &Cancellation) -> Result<bool, ApiError> {
        let request = self.client.build_edit_monitor(monitor);
        let response = self.dispatch(request, cancel).await?;
        self.client.parse_edit_monitor(response)
    }

    pub async fn delete<I>(&self, monitor: &I, cancel: &Cancellation) -> Result<bool, ApiError>
    where
        I: MonitorId + ?Sized,
    {
        let request = self.client.build_delete_monitor(monitor.monitor_id());
        let response = self.dispatch(request, cancel).await?;
        self.client.parse_delete_monitor(response)
    }

    /// Not offered by the API; fails without contacting the service.
    pub async fn pause<I>(&self, _monitor: &I, _cancel: &Cancellation) -> Result<bool, ApiError>
    where
        I: MonitorId + ?Sized,
    {
        Err(ApiError::Unsupported("pause"))
    }

    /// Not offered by the API; fails without contacting the service.
    pub async fn resume<I>(&self, _monitor: &I, _cancel: &Cancellation) -> Result<bool, ApiError>
    where
        I: MonitorId + ?Sized,
    {
        Err(ApiError::Unsupported("resume"))
    }

    async fn dispatch(&self, request: HttpRequest, cancel: &Cancellation) -> Result<HttpResponse, ApiError> {
        let operation = request.operation.clone();
        if cancel.is_cancelled() {
            warn!(%operation, "cancelled before dispatch");
            return Err(ApiError::Cancelled);
        }
        debug!(%operation, params = request.params.len(), "dispatching request");

        let started = std::time::Instant::now();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!(%operation, "cancelled while in flight");
                Err(ApiError::Cancelled)
            }
            result = self.transport.send(request) => {
                let response = result.map_err(|e| {
                    warn!(%operation, error = %e, "transport failed");
                    ApiError::from(e)
                })?;
                debug!(
                    %operation,
                    status = response.status,
                    elapsed_ms = elapsed_ms(started.elapsed()),
                    "received response"
                );
                Ok(response)
            }
        }
    }
}

fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::cancel::cancellation;
    use crate::error::TransportError;
    use crate::types::{KeywordType, MonitorType, Subtype};

    /// Replies with a fixed body and records every request.
    struct FakeTransport {
        body: String,
        calls: AtomicUsize,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl FakeTransport {
        fn replying(body: &str) -> Arc<Self> {
            Arc::new(Self {
                body: body.to_string(),
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_request(&self) -> HttpRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request);
            Ok(HttpResponse::ok(self.body.clone()))
        }
    }

    /// Never answers.
    struct HangingTransport;

    #[async_trait]
    impl Transport for HangingTransport {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            std::future::pending().await
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            Err(TransportError::Connection("connection refused".to_string()))
        }
    }

    fn service<T: Transport>(transport: T) -> MonitorClient<T> {
        MonitorClient::new(UptimeClient::new("http://uptime.test", "key"), transport)
    }

    const TWO_MONITORS: &str = r#"{"stat":"ok","timezone":"60","monitors":{"monitor":[
        {"id":"1","friendlyname":"first","url":"1.example","type":"1",
         "responsetime":[{"datetime":"10/13/2014 10:00:00","value":"100"}]},
        {"id":"2","friendlyname":"second","url":"2.example","type":"1"}]}}"#;

    const FAIL_402: &str = r#"{"stat":"fail","id":"402","message":"invalid API key"}"#;

    #[tokio::test]
    async fn list_requests_details_with_fixed_page_size() {
        let transport = FakeTransport::replying(TWO_MONITORS);
        let monitors = service(transport.clone())
            .list(&ListOptions::default(), &Cancellation::never())
            .await
            .unwrap();
        assert_eq!(monitors.len(), 2);
        assert_eq!(
            monitors[0].response_times[0].date.to_string(),
            "2014-10-13 11:00:00"
        );

        let request = transport.last_request();
        assert_eq!(request.operation, "getMonitors");
        for (key, value) in [
            ("showMonitorAlertContacts", "1"),
            ("logs", "1"),
            ("alertContacts", "1"),
            ("showTimezone", "1"),
            ("responseTimes", "1"),
            ("logsLimit", "25"),
            ("responseTimesLimit", "25"),
        ] {
            assert_eq!(request.params.get(key), Some(value), "{key}");
        }
        assert!(!request.params.contains("monitors"));
        assert!(!request.params.contains("responseTimesAverage"));
    }

    #[tokio::test]
    async fn list_without_details_sends_zero_flags() {
        let transport = FakeTransport::replying(r#"{"stat":"ok"}"#);
        let options = ListOptions::default()
            .include_details(false)
            .ids(["4", "5"])
            .custom_uptime_ratio(vec![7.0, 30.0])
            .response_times_average(60);
        let monitors = service(transport.clone())
            .list(&options, &Cancellation::never())
            .await
            .unwrap();
        assert!(monitors.is_empty());

        let request = transport.last_request();
        assert_eq!(request.params.get("monitors"), Some("4-5"));
        assert_eq!(request.params.get("customUptimeRatio"), Some("7-30"));
        assert_eq!(request.params.get("showMonitorAlertContacts"), Some("0"));
        assert_eq!(request.params.get("logs"), Some("0"));
        assert_eq!(request.params.get("showTimezone"), Some("0"));
        assert_eq!(request.params.get("responseTimesAverage"), Some("60"));
    }

    #[tokio::test]
    async fn get_returns_first_match() {
        let transport = FakeTransport::replying(TWO_MONITORS);
        let monitor = service(transport.clone())
            .get("1", &ListOptions::default().ids(["ignored"]), &Cancellation::never())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(monitor.id, "1");
        assert_eq!(transport.last_request().params.get("monitors"), Some("1"));
    }

    #[tokio::test]
    async fn get_without_match_is_none() {
        let transport = FakeTransport::replying(r#"{"stat":"ok","monitors":{"monitor":[]}}"#);
        let monitor = service(transport)
            .get("404", &ListOptions::default(), &Cancellation::never())
            .await
            .unwrap();
        assert!(monitor.is_none());
    }

    #[tokio::test]
    async fn create_backfills_from_input() {
        let transport = FakeTransport::replying(
            r#"{"stat":"ok","monitor":{"id":"777","friendlyname":"from server","type":"1"}}"#,
        );
        let input = NewMonitor::new("shop", "shop.example.com", MonitorType::Keyword)
            .keyword("sold out", KeywordType::Exists)
            .alert("3")
            .credentials("u", "p");
        let monitor = service(transport.clone())
            .create(&input, &Cancellation::never())
            .await
            .unwrap();

        assert_eq!(monitor.id, "777");
        assert_eq!(monitor.name, "shop");
        assert_eq!(monitor.target, "shop.example.com");
        assert_eq!(monitor.monitor_type, MonitorType::Keyword);
        assert_eq!(monitor.subtype, None);
        assert_eq!(monitor.port, None);
        assert_eq!(monitor.keyword_value.as_deref(), Some("sold out"));
        assert_eq!(monitor.keyword_type, Some(KeywordType::Exists));
        assert_eq!(monitor.http_username.as_deref(), Some("u"));
        assert_eq!(monitor.http_password.as_deref(), Some("p"));

        let request = transport.last_request();
        assert_eq!(request.operation, "newMonitor");
        assert_eq!(request.params.get("monitorAlertContacts"), Some("3"));
    }

    #[tokio::test]
    async fn edit_sends_subtype_workaround_and_id() {
        let transport = FakeTransport::replying(r#"{"stat":"ok","monitor":{"id":"9"}}"#);
        let monitor = service(FakeTransport::replying(
            r#"{"stat":"ok","monitor":{"id":"9"}}"#,
        ))
        .create(
            &NewMonitor::new("n", "t", MonitorType::Http),
            &Cancellation::never(),
        )
        .await
        .unwrap();

        let ok = service(transport.clone())
            .edit(&monitor, &Cancellation::never())
            .await
            .unwrap();
        assert!(ok);
        let request = transport.last_request();
        assert_eq!(request.operation, "editMonitor");
        assert_eq!(request.params.get("monitorSubType"), Some("0"));
        assert_eq!(request.params.keys().last(), Some("monitorID"));
    }

    #[tokio::test]
    async fn edit_keeps_explicit_subtype() {
        let transport = FakeTransport::replying(r#"{"stat":"ok"}"#);
        let mut monitor = service(FakeTransport::replying(r#"{"stat":"ok","monitor":{"id":"3"}}"#))
            .create(
                &NewMonitor::new("ftp", "ftp.example", MonitorType::Port).subtype(Subtype::Ftp),
                &Cancellation::never(),
            )
            .await
            .unwrap();
        monitor.name = "renamed".to_string();

        service(transport.clone())
            .edit(&monitor, &Cancellation::never())
            .await
            .unwrap();
        let request = transport.last_request();
        assert_eq!(request.params.get("monitorSubType"), Some("3"));
        assert_eq!(request.params.get("monitorFriendlyName"), Some("renamed"));
    }

    #[tokio::test]
    async fn delete_accepts_ids() {
        let transport = FakeTransport::replying(r#"{"stat":"ok","monitor":{"id":"12"}}"#);
        let deleted = service(transport.clone())
            .delete("12", &Cancellation::never())
            .await
            .unwrap();
        assert!(deleted);
        let request = transport.last_request();
        assert_eq!(request.operation, "deleteMonitor");
        assert_eq!(request.params.get("monitorID"), Some("12"));
    }

    #[tokio::test]
    async fn pause_and_resume_never_reach_the_transport() {
        let transport = FakeTransport::replying(r#"{"stat":"ok"}"#);
        let service = service(transport.clone());
        let cancel = Cancellation::never();

        let err = service.pause("1", &cancel).await.unwrap_err();
        assert!(matches!(err, ApiError::Unsupported("pause")));
        let err = service.resume("1", &cancel).await.unwrap_err();
        assert!(matches!(err, ApiError::Unsupported("resume")));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn remote_failure_is_reported_by_every_operation() {
        let transport = FakeTransport::replying(FAIL_402);
        let service = service(transport.clone());
        let cancel = Cancellation::never();
        let input = NewMonitor::new("a", "b", MonitorType::Ping);
        let existing = service
            .client()
            .parse_new_monitor(&input, HttpResponse::ok(r#"{"stat":"ok","monitor":{"id":"1"}}"#))
            .unwrap();

        let errors = vec![
            service.list(&ListOptions::default(), &cancel).await.unwrap_err(),
            service.get("1", &ListOptions::default(), &cancel).await.unwrap_err(),
            service.create(&input, &cancel).await.unwrap_err(),
            service.edit(&existing, &cancel).await.unwrap_err(),
            service.delete(&existing, &cancel).await.unwrap_err(),
        ];
        for err in errors {
            assert_eq!(err.remote_code(), Some("402"));
            assert_eq!(err.remote_message(), Some("invalid API key"));
        }
        assert_eq!(transport.calls(), 5);
    }

    #[tokio::test]
    async fn transport_failure_is_surfaced_unchanged() {
        let err = service(FailingTransport)
            .delete("1", &Cancellation::never())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Transport(TransportError::Connection(ref msg)) if msg == "connection refused"
        ));
    }

    #[tokio::test]
    async fn cancel_aborts_in_flight_request() {
        let (handle, token) = cancellation();
        let service = service(HangingTransport);
        let options = ListOptions::default();
        let pending = service.list(&options, &token);
        let (result, ()) = tokio::join!(pending, async move { handle.cancel() });
        assert!(matches!(result, Err(ApiError::Cancelled)));
    }

    #[tokio::test]
    async fn already_cancelled_token_skips_the_transport() {
        let (handle, token) = cancellation();
        handle.cancel();
        let transport = FakeTransport::replying(r#"{"stat":"ok"}"#);
        let err = service(transport.clone())
            .delete("1", &token)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Cancelled));
        assert_eq!(transport.calls(), 0);
    }
}
