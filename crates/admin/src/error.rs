//! Unified error handling for admin.
//!
//! Failures reach the operator as toasts: the response carries an
//! [`ErrorToast`] extension that the HTMX middleware turns into a toast
//! fragment. Server faults are also captured to Sentry.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use threadline_client::{ApiError, StorageError};
use threadline_core::validation::ValidationError;

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AppError {
    /// REST API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Form failed validation; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Token storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Template rendering failed.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Message a failed request wants shown as a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorToast(pub String);

impl AppError {
    #[must_use]
    pub fn is_server_fault(&self) -> bool {
        match self {
            Self::Api(err) => err.is_server_fault(),
            Self::Session(_) | Self::Storage(_) | Self::Template(_) | Self::Internal(_) => true,
            Self::Validation(_) | Self::NotFound(_) => false,
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
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Session(_) | Self::Storage(_) | Self::Template(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Toast text; internal details stay in the logs.
    #[must_use]
    pub fn toast_message(&self) -> Option<String> {
        match self {
            Self::Api(err) => err.user_message(),
            Self::Validation(err) => Some(err.to_string()),
            Self::NotFound(what) => Some(format!("{what} not found")),
            Self::Session(_) | Self::Storage(_) | Self::Template(_) | Self::Internal(_) => {
                Some("Something went wrong. Please try again.".to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Self::Api(ApiError::Cancelled) = self {
            return StatusCode::NO_CONTENT.into_response();
        }

        if self.is_server_fault() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        } else {
            tracing::warn!(error = %self, "Admin request rejected");
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

/// Set the Sentry user context to the signed-in administrator.
pub fn set_sentry_admin(email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            email: Some(email.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
