//! Error translation for REST calls.
//!
//! Display strings are what a visitor sees in a toast. The underlying cause is
//! kept as the error source for logging.

use reqwest::StatusCode;
use thiserror::Error;

/// Message shown whenever the API could not be reached at all.
pub const NETWORK_ERROR_MESSAGE: &str =
    "Unable to connect to the server. Please check your connection and try again.";

/// Errors that can occur when calling the Threadline REST API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (offline, DNS, refused connection).
    #[error("{}", NETWORK_ERROR_MESSAGE)]
    Network(#[source] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("{message}")]
    Server {
        status: StatusCode,
        /// The body's `message` field, or a status-derived fallback.
        message: String,
    },

    /// A 2xx body did not have the expected shape.
    #[error("Unexpected response from the server")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The caller's component went away before the response arrived.
    #[error("Request cancelled")]
    Cancelled,

    /// The configured base URL or a request path could not be parsed.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Build a [`ApiError::Server`] from a non-2xx response body.
    ///
    /// Uses the body's `message` field when the body is JSON and has one,
    /// otherwise a message derived from the status code.
    #[must_use]
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|json| {
                json.get("message")
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_owned)
            })
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| status_message(status));

        Self::Server { status, message }
    }

    /// HTTP status for server-reported errors.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Toast text for this error. Cancelled calls show nothing.
    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Cancelled => None,
            Self::InvalidUrl(_) => Some("Something went wrong. Please try again.".to_string()),
            _ => Some(self.to_string()),
        }
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The token was missing, expired, or rejected.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self.status(),
            Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        )
    }

    /// Whether this should reach Sentry rather than only a toast.
    #[must_use]
    pub fn is_server_fault(&self) -> bool {
        match self {
            Self::Server { status, .. } => status.is_server_error(),
            Self::Decode { .. } | Self::InvalidUrl(_) => true,
            Self::Network(_) | Self::Cancelled => false,
        }
    }
}

/// Fallback message when the body carries no `message`.
fn status_message(status: StatusCode) -> String {
    status.canonical_reason().map_or_else(
        || format!("Request failed with status {}", status.as_u16()),
        |reason| format!("Request failed with status {} ({reason})", status.as_u16()),
    )
}
