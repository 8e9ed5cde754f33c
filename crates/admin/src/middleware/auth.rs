//! Admin authentication.
//!
//! Signing in stores the API's admin bearer token under `adminToken` in a
//! storage scope named by the session. [`RequireAdminAuth`] turns that token
//! back into an authorized client for each request.

use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use uuid::Uuid;

use threadline_client::storage::keys;
use threadline_client::ApiClient;

use super::htmx::{HX_REDIRECT, HxRequest};
use crate::error::{AppError, clear_sentry_user, set_sentry_admin};
use crate::state::AppState;

/// Session key holding the operator's storage scope.
pub const SCOPE_KEY: &str = "admin_scope";
/// Session key holding the operator's email, for display.
pub const EMAIL_KEY: &str = "admin_email";

pub const LOGIN_PATH: &str = "/login";

/// A signed-in operator.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub email: String,
    /// Client carrying the admin bearer token.
    pub api: ApiClient,
}

/// Extractor that requires admin authentication.
///
/// Without a stored `adminToken` the request is sent to the login page:
/// a redirect for page loads, `HX-Redirect` for htmx requests.
///
/// ```rust,ignore
/// async fn coupons(RequireAdminAuth(admin): RequireAdminAuth) -> Result<impl IntoResponse> {
///     let coupons = admin.api.admin_list::<CouponResource>(None).await?;
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAdminAuth(pub AdminSession);

/// Error returned when admin authentication is required but missing.
#[derive(Debug)]
pub enum AdminAuthRejection {
    RedirectToLogin { htmx: bool },
    Failed(AppError),
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { htmx: false } => Redirect::to(LOGIN_PATH).into_response(),
            Self::RedirectToLogin { htmx: true } => (
                StatusCode::OK,
                [(HX_REDIRECT, HeaderValue::from_static(LOGIN_PATH))],
            )
                .into_response(),
            Self::Failed(err) => err.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAdminAuth {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let htmx = HxRequest::from_headers(&parts.headers).0;
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, reason)| AdminAuthRejection::Failed(AppError::Internal(reason.to_string())))?;

        let scope: Option<String> = session
            .get(SCOPE_KEY)
            .await
            .map_err(|e| AdminAuthRejection::Failed(e.into()))?;
        let Some(token) = scope.and_then(|scope| state.storage(&scope).admin_token()) else {
            tracing::debug!(path = %parts.uri.path(), "admin login required");
            return Err(AdminAuthRejection::RedirectToLogin { htmx });
        };

        let email: String = session
            .get(EMAIL_KEY)
            .await
            .map_err(|e| AdminAuthRejection::Failed(e.into()))?
            .unwrap_or_default();
        tracing::Span::current().record("admin", email.as_str());

        Ok(Self(AdminSession {
            email,
            api: state.api().authorized(token),
        }))
    }
}

/// Store `token` for this session, replacing any previous sign-in.
///
/// # Errors
///
/// Returns an error if the session or token storage cannot be written.
pub async fn sign_in(
    session: &Session,
    state: &AppState,
    token: &str,
    email: &str,
) -> Result<(), AppError> {
    session.cycle_id().await?;
    let scope = Uuid::new_v4().to_string();
    state.storage(&scope).set(keys::ADMIN_TOKEN, token)?;
    session.insert(SCOPE_KEY, &scope).await?;
    session.insert(EMAIL_KEY, email).await?;
    set_sentry_admin(email);
    Ok(())
}

/// Forget the token and end the session.
///
/// # Errors
///
/// Returns an error if the session or token storage cannot be written.
pub async fn sign_out(session: &Session, state: &AppState) -> Result<(), AppError> {
    if let Some(scope) = session.get::<String>(SCOPE_KEY).await? {
        state.storage(&scope).remove(keys::ADMIN_TOKEN)?;
    }
    session.flush().await?;
    clear_sentry_user();
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_htmx_rejection_uses_hx_redirect() {
        let response = AdminAuthRejection::RedirectToLogin { htmx: true }.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[HX_REDIRECT], LOGIN_PATH);
    }

    #[test]
    fn test_page_rejection_redirects() {
        let response = AdminAuthRejection::RedirectToLogin { htmx: false }.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }
}
