//! Error types for the uptime API client.
//!
//! # Design
//! Transport problems, undecodable payloads and remote-reported failures are
//! kept in separate variants so callers can tell "the service said no" from
//! "we never got a usable answer". `Remote` carries the service's own error
//! code and message verbatim. `Unsupported` and `Cancelled` are raised locally
//! and never involve the network.

use thiserror::Error;

/// Failures raised by a [`Transport`](crate::transport::Transport) while
/// executing a request.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The remote host could not be reached.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Any other failure while sending the request or reading the body.
    #[error("HTTP request failed: {0}")]
    Http(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connection(err.to_string())
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

/// Errors returned by `UptimeClient` parse methods and `MonitorClient`
/// operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The transport failed before a response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be decoded into the expected envelope.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The envelope's `stat` was not `"ok"`.
    #[error(
        "remote API error {}: {}",
        .code.as_deref().unwrap_or("(no code)"),
        .message.as_deref().unwrap_or("(no message)")
    )]
    Remote {
        code: Option<String>,
        message: Option<String>,
    },

    /// The operation exists on the client surface but the API version behind
    /// it cannot perform it.
    #[error("{0} is not supported by this API version")]
    Unsupported(&'static str),

    /// The caller cancelled the operation while it was in flight.
    #[error("operation cancelled")]
    Cancelled,
}

impl ApiError {
    /// The remote error code, if the service reported one.
    pub fn remote_code(&self) -> Option<&str> {
        match self {
            ApiError::Remote { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// The remote error message, if the service reported one.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            ApiError::Remote { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// True for failures of the transport or the HTTP exchange itself.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_) | ApiError::HttpError { .. })
    }
}

/// Errors raised while assembling a `ClientConfig`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("UPTIMEROBOT_API_KEY is not set")]
    MissingApiKey,

    #[error("invalid timeout {0:?}, expected whole seconds")]
    InvalidTimeout(String),
}
