//! HTMX request detection and toasts.
//!
//! Failed htmx requests get a `200` toast fragment retargeted to `#toasts`.
//! Successful mutations attach their toast out of band with [`with_toast`].

use std::convert::Infallible;

use askama::Template;
use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header::CONTENT_TYPE, request::Parts},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};

use crate::components::Toast;
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
    match response.extensions().get::<ErrorToast>() {
        Some(ErrorToast(message)) if !message.is_empty() => toast_response(&Toast::error(message)),
        _ => response,
    }
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

/// Append `toast` to `html` as an out-of-band swap into the toast region.
///
/// # Errors
///
/// Returns an error if the toast fails to render.
pub fn with_toast(mut html: String, toast: &Toast) -> askama::Result<Html<String>> {
    html.push_str(r#"<div hx-swap-oob="beforeend:"#);
    html.push_str(TOAST_REGION);
    html.push_str(r#"">"#);
    html.push_str(&toast.render()?);
    html.push_str("</div>");
    Ok(Html(html))
}

/// Attach `HX-Trigger: event` to a response.
pub fn trigger(response: impl IntoResponse, event: &'static str) -> Response {
    let mut response = response.into_response();
    response
        .headers_mut()
        .insert(HX_TRIGGER, HeaderValue::from_static(event));
    response
}
