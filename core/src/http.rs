//! HTTP exchange types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. `UptimeClient` builds an
//! `HttpRequest` and parses an `HttpResponse` without touching the network;
//! a [`Transport`](crate::transport::Transport) (or the caller) performs the
//! actual round-trip. Every call is a `GET` with the parameters in the query
//! string, so the request only needs the URL and the ordered parameters.

use crate::params::Params;

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Remote operation name, e.g. `getMonitors`.
    pub operation: String,
    /// Full URL without the query string.
    pub url: String,
    /// Query parameters in the order they must be sent.
    pub params: Params,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// A `200 OK` response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
