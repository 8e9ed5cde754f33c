//! End-to-end harness for Threadline.
//!
//! Each test serves the real storefront or admin router on an ephemeral port
//! and points it at a [`wiremock`] server standing in for the Threadline REST
//! API. A cookie-keeping `reqwest` client plays the browser.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p threadline-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;

use axum::Router;
use reqwest::redirect::Policy;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use threadline_admin::config::AdminConfig;
use threadline_storefront::config::StorefrontConfig;

/// A served app plus the mock API behind it.
pub struct TestContext {
    pub api: MockServer,
    pub base_url: String,
    pub browser: reqwest::Client,
}

impl TestContext {
    /// Serve the storefront against a fresh mock API.
    ///
    /// # Panics
    ///
    /// Panics if the app cannot be started.
    pub async fn storefront() -> Self {
        let api = MockServer::start().await;
        let config = StorefrontConfig::local(&api_url(&api));
        let state = threadline_storefront::state::AppState::new(config)
            .expect("storefront state");
        let base_url = serve(threadline_storefront::app(state)).await;
        Self::new(api, base_url)
    }

    /// Serve the admin console against a fresh mock API.
    ///
    /// # Panics
    ///
    /// Panics if the app cannot be started.
    pub async fn admin() -> Self {
        let api = MockServer::start().await;
        let config = AdminConfig::local(&api_url(&api));
        let state = threadline_admin::state::AppState::new(config).expect("admin state");
        let base_url = serve(threadline_admin::app(state)).await;
        Self::new(api, base_url)
    }

    fn new(api: MockServer, base_url: String) -> Self {
        let browser = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to create HTTP client");
        Self {
            api,
            base_url,
            browser,
        }
    }

    /// Absolute URL of an app path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Sign the browser in to the admin console as `ops@threadline.test`.
    ///
    /// # Panics
    ///
    /// Panics if the login is not accepted.
    pub async fn sign_in_admin(&self) {
        Mock::given(method("POST"))
            .and(path("/api/admin/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "admin-token",
                "user": {"_id": 1, "email": "ops@threadline.test", "isAdmin": true}
            })))
            .mount(&self.api)
            .await;

        let response = self
            .browser
            .post(self.url("/login"))
            .form(&[("email", "ops@threadline.test"), ("password", "hunter22")])
            .send()
            .await
            .expect("login request");
        assert_eq!(response.status(), reqwest::StatusCode::SEE_OTHER);
    }
}

fn api_url(api: &MockServer) -> String {
    format!("{}/api", api.uri())
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("Failed to bind to address");
    let addr = listener.local_addr().expect("bound address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{addr}")
}
