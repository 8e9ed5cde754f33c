//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Server faults are captured to
//! Sentry before responding. The response carries an [`ErrorToast`] extension
//! so the HTMX toast middleware can turn it into a toast fragment; plain
//! requests get a short text body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use threadline_client::{ApiError, StorageError};
use threadline_core::validation::ValidationError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// REST API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Visitor storage could not be written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Template rendering failed.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Submitted form failed validation; nothing was sent to the API.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Visitor is not logged in.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Message a failed request wants shown as a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorToast(pub String);

impl AppError {
    /// Whether this is our fault (or the API's) rather than the visitor's.
    #[must_use]
    pub fn is_server_fault(&self) -> bool {
        match self {
            Self::Api(err) => err.is_server_fault(),
            Self::Session(_) | Self::Storage(_) | Self::Template(_) | Self::Internal(_) => true,
            Self::Validation(_) | Self::NotFound(_) | Self::Unauthorized(_) | Self::BadRequest(_) => {
                false
            }
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Api(ApiError::Server { status, .. }) => match *status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StatusCode::UNAUTHORIZED,
                StatusCode::NOT_FOUND => StatusCode::NOT_FOUND,
                s if s.is_client_error() => StatusCode::BAD_REQUEST,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Api(ApiError::Network(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Api(ApiError::Cancelled) => StatusCode::NO_CONTENT,
            Self::Api(_) => StatusCode::BAD_GATEWAY,
            Self::Session(_) | Self::Storage(_) | Self::Template(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    /// Text for the visitor, or `None` when nothing should be shown.
    ///
    /// Internal details never leave the server.
    #[must_use]
    pub fn toast_message(&self) -> Option<String> {
        match self {
            Self::Api(err) => err.user_message(),
            Self::Session(_) | Self::Storage(_) | Self::Template(_) | Self::Internal(_) => {
                Some("Something went wrong. Please try again.".to_string())
            }
            Self::Validation(err) => Some(err.to_string()),
            Self::NotFound(what) => Some(format!("{what} not found")),
            Self::Unauthorized(_) => Some("Please log in to continue.".to_string()),
            Self::BadRequest(msg) => Some(msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Self::Api(ApiError::Cancelled) = self {
            tracing::debug!("request cancelled before the API answered");
            return StatusCode::NO_CONTENT.into_response();
        }

        if self.is_server_fault() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }

        let status = self.status();
        let message = self.toast_message().unwrap_or_default();

        let mut response = (status, message.clone()).into_response();
        response.extensions_mut().insert(ErrorToast(message));
        response
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Log a failed fetch that a page degrades around, returning the toast text.
///
/// Used where the page still renders with defaults (empty lists, zero counts).
pub fn degrade(what: &str, err: &ApiError) -> Option<String> {
    if err.is_server_fault() {
        tracing::error!(error = %err, what, "fetch failed, rendering defaults");
    } else if !err.is_cancelled() {
        tracing::warn!(error = %err, what, "fetch failed, rendering defaults");
    }
    err.user_message()
}

/// Add a breadcrumb for visitor actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str) {
    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Product".to_string());
        assert_eq!(err.to_string(), "Not found: Product");
        assert_eq!(err.toast_message().as_deref(), Some("Product not found"));
    }

    #[test]
    fn test_server_message_reaches_the_toast() {
        let err = AppError::from(ApiError::from_response(
            StatusCode::CONFLICT,
            r#"{"message": "Only 2 left in stock"}"#,
        ));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.toast_message().as_deref(), Some("Only 2 left in stock"));

        let response = err.into_response();
        assert_eq!(
            response.extensions().get::<ErrorToast>(),
            Some(&ErrorToast("Only 2 left in stock".to_string()))
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::Internal("pool exhausted".to_string());
        assert!(!err.toast_message().unwrap().contains("pool"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_cancelled_produces_no_toast() {
        let response = AppError::Api(ApiError::Cancelled).into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.extensions().get::<ErrorToast>().is_none());
    }

    #[test]
    fn test_validation_is_a_bad_request() {
        let err = AppError::from(ValidationError::Required { field: "email" });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(!err.is_server_fault());
    }
}
