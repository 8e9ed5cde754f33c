//! Per-request page context and the chrome every full page shares.

use axum::{extract::FromRequestParts, http::request::Parts};

use threadline_core::Device;

use crate::components::{HeaderProps, Toast};
use crate::device::Viewport;
use crate::dispatch;
use crate::error::AppError;
use crate::hooks::CountSource;
use crate::middleware::CspNonce;
use crate::state::AppState;
use crate::visitor::Visitor;

/// Live endpoint for pages with no region besides the header.
pub const HEADER_LIVE_PATH: &str = "/live/header";

/// Everything a page handler needs about the current request.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub state: AppState,
    pub visitor: Visitor,
    pub device: Device,
    pub nonce: CspNonce,
}

impl FromRequestParts<AppState> for PageContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let visitor = Visitor::from_request_parts(parts, state).await?;
        let Viewport(width) = Viewport::from_headers(&parts.headers);
        let device = state.devices().observe(visitor.id, width);
        let nonce = CspNonce::from_request_parts(parts, state)
            .await
            .unwrap_or_else(|never| match never {});

        Ok(Self {
            state: state.clone(),
            visitor,
            device,
            nonce,
        })
    }
}

impl PageContext {
    /// Render the header and collect the layout fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the header template fails to render.
    pub async fn chrome(&self, title: impl Into<String>) -> Result<Chrome, AppError> {
        self.chrome_with(title, HeaderProps::default(), Vec::new()).await
    }

    /// Like [`Self::chrome`] with a search term and toasts.
    ///
    /// # Errors
    ///
    /// Returns an error if the header template fails to render.
    pub async fn chrome_with(
        &self,
        title: impl Into<String>,
        header: HeaderProps,
        toasts: Vec<Toast>,
    ) -> Result<Chrome, AppError> {
        let counts = CountSource::new(self.state.clone(), self.visitor.id)
            .counts()
            .await;
        let header = HeaderProps {
            counts,
            logged_in: self.visitor.is_logged_in(),
            ..header
        };

        Ok(Chrome {
            title: title.into(),
            search: header.search.clone(),
            nonce: self.nonce.value().to_string(),
            device: self.device,
            header: dispatch::render(&header, self.device)?,
            toasts,
            live_path: HEADER_LIVE_PATH,
        })
    }
}

/// Layout fields used by `base.html`.
#[derive(Debug, Clone)]
pub struct Chrome {
    pub title: String,
    /// Search term echoed by the header, carried over to live re-renders.
    pub search: String,
    pub nonce: String,
    pub device: Device,
    /// Rendered header variant.
    pub header: String,
    pub toasts: Vec<Toast>,
    /// SSE endpoint feeding this page's live regions.
    pub live_path: &'static str,
}

impl Chrome {
    #[must_use]
    pub fn live_at(mut self, path: &'static str) -> Self {
        self.live_path = path;
        self
    }

    /// `live_path` plus the search term, for `sse-connect`.
    #[must_use]
    pub fn live_src(&self) -> String {
        if self.search.is_empty() {
            return self.live_path.to_string();
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("search", &self.search)
            .finish();
        format!("{}?{query}", self.live_path)
    }

    #[must_use]
    pub fn with_toast(mut self, toast: Option<Toast>) -> Self {
        self.toasts.extend(toast);
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn chrome(search: &str) -> Chrome {
        Chrome {
            title: "Shop".to_string(),
            search: search.to_string(),
            nonce: String::new(),
            device: Device::Web,
            header: String::new(),
            toasts: Vec::new(),
            live_path: HEADER_LIVE_PATH,
        }
    }

    #[test]
    fn test_live_src_carries_the_search_term() {
        assert_eq!(chrome("").live_src(), "/live/header");
        assert_eq!(
            chrome("linen shirt").live_at("/live/home").live_src(),
            "/live/home?search=linen+shirt"
        );
    }

    #[test]
    fn test_with_toast_appends() {
        let page = chrome("").with_toast(Some(Toast::error("Network error"))).with_toast(None);
        assert_eq!(page.toasts.len(), 1);
    }
}
