//! Login-required extractor.

use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};

use super::htmx::{HX_REDIRECT, HxRequest};
use crate::error::AppError;
use crate::state::AppState;
use crate::visitor::Visitor;

/// A visitor with a stored shopper token.
///
/// Guests are redirected to the login page, with `next` pointing back at the
/// page they asked for. htmx requests get an `HX-Redirect` instead.
///
/// ```rust,ignore
/// async fn orders(RequireLogin(visitor): RequireLogin) -> Result<impl IntoResponse> {
///     let orders = visitor.api().my_orders().await?;
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireLogin(pub Visitor);

/// Why [`RequireLogin`] refused the request.
#[derive(Debug)]
pub enum LoginRejection {
    Redirect { to: String, htmx: bool },
    Failed(AppError),
}

impl IntoResponse for LoginRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect { to, htmx: false } => Redirect::to(&to).into_response(),
            Self::Redirect { to, htmx: true } => match HeaderValue::from_str(&to) {
                Ok(value) => (StatusCode::OK, [(HX_REDIRECT, value)]).into_response(),
                Err(_) => Redirect::to("/auth/login").into_response(),
            },
            Self::Failed(err) => err.into_response(),
        }
    }
}

/// Login URL that returns to `path` afterwards.
#[must_use]
pub fn login_url(path: &str) -> String {
    let mut url = String::from("/auth/login?");
    url.push_str(
        &url::form_urlencoded::Serializer::new(String::new())
            .append_pair("next", path)
            .finish(),
    );
    url
}

impl FromRequestParts<AppState> for RequireLogin {
    type Rejection = LoginRejection;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let visitor = Visitor::from_request_parts(parts, state)
            .await
            .map_err(LoginRejection::Failed)?;

        if visitor.is_logged_in() {
            return Ok(Self(visitor));
        }

        tracing::debug!(path = %parts.uri.path(), "login required");
        Err(LoginRejection::Redirect {
            to: login_url(parts.uri.path()),
            htmx: HxRequest::from_headers(&parts.headers).0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_url_encodes_next() {
        assert_eq!(login_url("/checkout"), "/auth/login?next=%2Fcheckout");
    }
}
