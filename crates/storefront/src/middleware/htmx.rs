//! HTMX request detection and error toasts.
//!
//! An HTMX request that fails gets a `200` toast fragment retargeted to the
//! page's toast region (`HX-Retarget: #toasts`, `HX-Reswap: beforeend`), so
//! the region the visitor was interacting with is left as it was. Full page
//! requests keep the error response untouched.

use std::convert::Infallible;

use askama::Template;
use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header::CONTENT_TYPE, request::Parts},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};

use crate::components::toast::Toast;
use crate::error::ErrorToast;

pub const HX_REQUEST: HeaderName = HeaderName::from_static("hx-request");
pub const HX_TRIGGER: HeaderName = HeaderName::from_static("hx-trigger");
pub const HX_REDIRECT: HeaderName = HeaderName::from_static("hx-redirect");
pub const HX_RETARGET: HeaderName = HeaderName::from_static("hx-retarget");
pub const HX_RESWAP: HeaderName = HeaderName::from_static("hx-reswap");

/// CSS selector of the toast region in the layout.
pub const TOAST_REGION: &str = "#toasts";

/// Whether the request came from htmx.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HxRequest(pub bool);

impl HxRequest {
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self(headers.get(HX_REQUEST).is_some_and(|v| v == "true"))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for HxRequest {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

/// Turn error responses into toast fragments for htmx requests.
pub async fn htmx_toast_middleware(request: Request, next: Next) -> Response {
    let HxRequest(is_htmx) = HxRequest::from_headers(request.headers());
    let response = next.run(request).await;

    if !is_htmx {
        return response;
    }
    let Some(ErrorToast(message)) = response.extensions().get::<ErrorToast>().cloned() else {
        return response;
    };
    if message.is_empty() {
        return response;
    }

    toast_response(&Toast::error(message))
}

/// A toast fragment that appends itself to the toast region.
#[must_use]
pub fn toast_response(toast: &Toast) -> Response {
    let body = match toast.render() {
        Ok(html) => html,
        Err(err) => {
            tracing::error!(error = %err, "failed to render toast");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mut response = Html(body).into_response();
    let headers = response.headers_mut();
    headers.insert(HX_RETARGET, HeaderValue::from_static(TOAST_REGION));
    headers.insert(HX_RESWAP, HeaderValue::from_static("beforeend"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
    response
}
