//! Command implementations.
//!
//! Every command writes its report to the `out` writer it is handed, so tests
//! can capture it. Diagnostics go through `tracing`.

pub mod catalog;
pub mod coupons;
pub mod device;
pub mod guest;
pub mod sales;

use secrecy::SecretString;
use thiserror::Error;

use threadline_client::{ApiClient, ApiError, DEFAULT_API_URL, StorageError};
use threadline_core::validation::ValidationError;

/// Base URL of the Threadline REST API.
pub const API_URL_VAR: &str = "THREADLINE_API_URL";

/// Administrator bearer token for the coupon commands.
pub const ADMIN_TOKEN_VAR: &str = "THREADLINE_ADMIN_TOKEN";

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

/// Client for the API named by `THREADLINE_API_URL`, or the local default.
///
/// # Errors
///
/// Returns an error if the URL does not parse.
pub fn api_client() -> Result<ApiClient, CliError> {
    let url = std::env::var(API_URL_VAR).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    tracing::debug!(api = %url, "using API");
    Ok(ApiClient::new(&url)?)
}

/// Client carrying the administrator token from `THREADLINE_ADMIN_TOKEN`.
///
/// # Errors
///
/// Returns an error if the token is unset or blank, or the URL does not parse.
pub fn admin_client() -> Result<ApiClient, CliError> {
    let token = std::env::var(ADMIN_TOKEN_VAR)
        .ok()
        .filter(|token| !token.trim().is_empty())
        .ok_or(CliError::MissingEnvVar(ADMIN_TOKEN_VAR))?;
    Ok(api_client()?.authorized(SecretString::from(token)))
}
