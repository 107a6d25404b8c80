//! In-memory fake of the uptime monitoring API.
//!
//! Serves `getMonitors`, `newMonitor`, `editMonitor` and `deleteMonitor` as
//! `GET` endpoints with query parameters and answers with the service's JSON
//! envelope (`stat`, `id`, `message`). Numbers are rendered as strings and
//! timestamps as `MM/DD/YYYY HH:MM:SS`, like the real service.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDateTime, Utc};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

pub const DEFAULT_API_KEY: &str = "u000000-mock";
const DATETIME_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Settings of the fake account.
#[derive(Clone, Debug)]
pub struct MockConfig {
    pub api_key: String,
    /// Offset reported as `timezone`, in minutes.
    pub timezone_minutes: i32,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            api_key: DEFAULT_API_KEY.to_string(),
            timezone_minutes: 0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct StoredMonitor {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub monitor_type: String,
    pub subtype: String,
    pub port: String,
    pub keyword_type: String,
    pub keyword_value: String,
    pub http_username: String,
    pub http_password: String,
    pub alerts: Vec<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Default)]
pub struct Store {
    next_id: u64,
    monitors: BTreeMap<u64, StoredMonitor>,
}

#[derive(Clone)]
pub struct AppState {
    config: Arc<MockConfig>,
    store: Arc<RwLock<Store>>,
}

type Params = HashMap<String, String>;

pub fn app() -> Router {
    app_with(MockConfig::default())
}

pub fn app_with(config: MockConfig) -> Router {
    let state = AppState {
        config: Arc::new(config),
        store: Arc::new(RwLock::new(Store {
            next_id: 775_000_000,
            monitors: BTreeMap::new(),
        })),
    };
    Router::new()
        .route("/getMonitors", get(get_monitors))
        .route("/newMonitor", get(new_monitor))
        .route("/editMonitor", get(edit_monitor))
        .route("/deleteMonitor", get(delete_monitor))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, MockConfig::default()).await
}

pub async fn run_with(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock uptime API listening");
    }
    axum::serve(listener, app_with(config)).await
}

fn fail(code: &str, message: &str) -> Json<Value> {
    Json(json!({ "stat": "fail", "id": code, "message": message }))
}

fn authorize(state: &AppState, params: &Params) -> Result<(), Json<Value>> {
    match params.get("apiKey").map(String::as_str) {
        None | Some("") => Err(fail("100", "apiKey not mentioned or in a wrong format")),
        Some(key) if key != state.config.api_key => Err(fail("101", "apiKey is wrong")),
        Some(_) => Ok(()),
    }
}

fn flag(params: &Params, key: &str) -> bool {
    params.get(key).map(String::as_str) == Some("1")
}

fn limit(params: &Params, key: &str) -> usize {
    params
        .get(key)
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(usize::MAX)
}

fn render_monitor(monitor: &StoredMonitor, params: &Params) -> Value {
    let mut value = json!({
        "id": monitor.id.to_string(),
        "friendlyname": monitor.name,
        "url": monitor.url,
        "type": monitor.monitor_type,
        "subtype": monitor.subtype,
        "keywordtype": monitor.keyword_type,
        "keywordvalue": monitor.keyword_value,
        "httpusername": monitor.http_username,
        "httppassword": monitor.http_password,
        "port": monitor.port,
        "interval": "300",
        "status": "1",
        "alltimeuptimeratio": "100",
    });
    let created = monitor.created_at.format(DATETIME_FORMAT).to_string();
    let contacts: Vec<Value> = monitor
        .alerts
        .iter()
        .map(|id| json!({ "id": id, "type": "2", "status": "2", "value": format!("alert-{id}@example.com") }))
        .collect();

    if let Some(ratios) = params.get("customUptimeRatio") {
        let rendered: Vec<&str> = ratios.split('-').map(|_| "100.000").collect();
        value["customuptimeratio"] = json!(rendered.join("-"));
    }
    if flag(params, "showMonitorAlertContacts") {
        value["alertcontact"] = json!(contacts);
    }
    if flag(params, "logs") {
        let logs = vec![json!({ "type": "98", "datetime": created, "alertcontact": contacts })];
        let logs: Vec<Value> = logs.into_iter().take(limit(params, "logsLimit")).collect();
        value["log"] = json!(logs);
    }
    if flag(params, "responseTimes") {
        let samples = vec![json!({ "datetime": created, "value": "250" })];
        let samples: Vec<Value> = samples
            .into_iter()
            .take(limit(params, "responseTimesLimit"))
            .collect();
        value["responsetime"] = json!(samples);
    }
    value
}

async fn get_monitors(State(state): State<AppState>, Query(params): Query<Params>) -> Json<Value> {
    if let Err(reply) = authorize(&state, &params) {
        return reply;
    }
    let store = state.store.read().await;
    let wanted: Option<Vec<u64>> = params
        .get("monitors")
        .map(|ids| ids.split('-').filter_map(|id| id.parse().ok()).collect());

    let monitors: Vec<Value> = store
        .monitors
        .values()
        .filter(|m| wanted.as_ref().map_or(true, |ids| ids.contains(&m.id)))
        .map(|m| render_monitor(m, &params))
        .collect();
    debug!(count = monitors.len(), "getMonitors");

    if monitors.is_empty() {
        return Json(json!({ "stat": "ok" }));
    }
    let mut body = json!({
        "stat": "ok",
        "offset": "0",
        "limit": "50",
        "total": monitors.len().to_string(),
        "monitors": { "monitor": monitors },
    });
    if flag(&params, "showTimezone") {
        body["timezone"] = json!(state.config.timezone_minutes.to_string());
    }
    Json(body)
}

fn param(params: &Params, key: &str) -> String {
    params.get(key).cloned().unwrap_or_default()
}

fn alert_ids(params: &Params) -> Vec<String> {
    params
        .get("monitorAlertContacts")
        .map(|ids| ids.split('-').filter(|id| !id.is_empty()).map(str::to_string).collect())
        .unwrap_or_default()
}

async fn new_monitor(State(state): State<AppState>, Query(params): Query<Params>) -> Json<Value> {
    if let Err(reply) = authorize(&state, &params) {
        return reply;
    }
    for required in ["monitorFriendlyName", "monitorURL", "monitorType"] {
        if params.get(required).map_or(true, String::is_empty) {
            return fail("205", &format!("{required} not mentioned or in a wrong format"));
        }
    }
    if !matches!(param(&params, "monitorType").as_str(), "1" | "2" | "3" | "4") {
        return fail("206", "monitorType is wrong");
    }

    let mut store = state.store.write().await;
    store.next_id += 1;
    let monitor = StoredMonitor {
        id: store.next_id,
        name: param(&params, "monitorFriendlyName"),
        url: param(&params, "monitorURL"),
        monitor_type: param(&params, "monitorType"),
        subtype: param(&params, "monitorSubType"),
        port: param(&params, "monitorPort"),
        keyword_type: param(&params, "monitorKeywordType"),
        keyword_value: param(&params, "monitorKeywordValue"),
        http_username: param(&params, "monitorHTTPUsername"),
        http_password: param(&params, "monitorHTTPPassword"),
        alerts: alert_ids(&params),
        created_at: Utc::now().naive_utc(),
    };
    let id = monitor.id;
    store.monitors.insert(id, monitor);
    info!(id, "created monitor");
    Json(json!({ "stat": "ok", "monitor": { "id": id.to_string(), "status": "1" } }))
}

fn lookup_id(params: &Params) -> Result<u64, Json<Value>> {
    params
        .get("monitorID")
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| fail("210", "monitorID not mentioned or in a wrong format"))
}

async fn edit_monitor(State(state): State<AppState>, Query(params): Query<Params>) -> Json<Value> {
    if let Err(reply) = authorize(&state, &params) {
        return reply;
    }
    let id = match lookup_id(&params) {
        Ok(id) => id,
        Err(reply) => return reply,
    };
    let mut store = state.store.write().await;
    let Some(monitor) = store.monitors.get_mut(&id) else {
        return fail("212", "monitorID doesn't exist");
    };

    let fields: [(&str, &mut String); 8] = [
        ("monitorFriendlyName", &mut monitor.name),
        ("monitorURL", &mut monitor.url),
        ("monitorPort", &mut monitor.port),
        ("monitorKeywordType", &mut monitor.keyword_type),
        ("monitorKeywordValue", &mut monitor.keyword_value),
        ("monitorHTTPUsername", &mut monitor.http_username),
        ("monitorHTTPPassword", &mut monitor.http_password),
        ("monitorSubType", &mut monitor.subtype),
    ];
    for (key, field) in fields {
        if let Some(value) = params.get(key) {
            *field = value.clone();
        }
    }
    if monitor.subtype == "0" {
        monitor.subtype.clear();
    }
    if params.contains_key("monitorAlertContacts") {
        monitor.alerts = alert_ids(&params);
    }
    info!(id, "edited monitor");
    Json(json!({ "stat": "ok", "monitor": { "id": id.to_string() } }))
}

async fn delete_monitor(State(state): State<AppState>, Query(params): Query<Params>) -> Json<Value> {
    if let Err(reply) = authorize(&state, &params) {
        return reply;
    }
    let id = match lookup_id(&params) {
        Ok(id) => id,
        Err(reply) => return reply,
    };
    let mut store = state.store.write().await;
    if store.monitors.remove(&id).is_none() {
        return fail("212", "monitorID doesn't exist");
    }
    info!(id, "deleted monitor");
    Json(json!({ "stat": "ok", "monitor": { "id": id.to_string() } }))
}
