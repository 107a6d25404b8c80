//! Client core for an UptimeRobot-style monitoring API.
//!
//! # Overview
//! The remote API takes flat, stringly-typed query parameters and answers
//! with a loosely-typed JSON envelope. This crate translates between that and
//! typed monitor operations:
//!
//! - [`params`] encodes requests into the exact parameter set the service
//!   expects, quirks included.
//! - [`normalize`] validates envelopes and turns them into domain values,
//!   correcting timestamps for the account timezone.
//! - [`UptimeClient`] builds `HttpRequest`s and parses `HttpResponse`s without
//!   touching the network (host-does-IO).
//! - [`MonitorClient`] runs the async operations over a [`Transport`], with
//!   cooperative cancellation.
//!
//! # Design
//! - Clients hold only immutable configuration; calls never share state.
//! - One remote call per operation, no retries, no caching.
//! - Pause/resume are on the surface but always fail with
//!   [`ApiError::Unsupported`].

pub mod cancel;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod monitors;
pub mod normalize;
pub mod params;
pub mod transport;
pub mod types;
mod wire;

pub use cancel::{cancellation, CancelHandle, Cancellation};
pub use client::UptimeClient;
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError, TransportError};
pub use http::{HttpRequest, HttpResponse};
pub use monitors::{ListOptions, MonitorClient};
pub use params::{MonitorParameters, Params, Request, RetrieveParameters};
pub use transport::{ReqwestTransport, Transport};
pub use types::{
    Alert, AlertStatus, AlertType, KeywordType, Log, LogType, Monitor, MonitorId, MonitorStatus,
    MonitorType, NewMonitor, ResponseTime, Subtype,
};
pub use wire::{parse_datetime, Coded};
