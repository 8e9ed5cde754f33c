//! HTTP plumbing shared by every resource method.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::ApiError;

/// Base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:5001/api";

/// Threadline REST API client.
///
/// Cloning is cheap. [`ApiClient::authorized`] and [`ApiClient::bound_to`]
/// return new handles sharing the same connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
    bearer: Option<SecretString>,
    cancel: Option<CancellationToken>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("bearer", &self.bearer.as_ref().map(|_| "[REDACTED]"))
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}

impl ApiClient {
    /// Create a client for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if `base_url` does not parse, or
    /// [`ApiError::Network`] if the HTTP client fails to build.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("threadline/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Network)?;
        Self::with_http(http, base_url)
    }

    /// Create a client around an existing `reqwest::Client`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if `base_url` does not parse.
    pub fn with_http(http: reqwest::Client, base_url: &str) -> Result<Self, ApiError> {
        // Url::join drops the last segment unless the base ends in a slash.
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalized).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;

        Ok(Self {
            inner: Arc::new(ApiClientInner { http, base_url }),
            bearer: None,
            cancel: None,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// A handle that sends `Authorization: Bearer <token>` on every request.
    #[must_use]
    pub fn authorized(&self, token: SecretString) -> Self {
        Self {
            bearer: Some(token),
            ..self.clone()
        }
    }

    /// A handle whose in-flight requests resolve to [`ApiError::Cancelled`]
    /// once `cancel` fires.
    #[must_use]
    pub fn bound_to(&self, cancel: CancellationToken) -> Self {
        Self {
            cancel: Some(cancel),
            ..self.clone()
        }
    }

    #[must_use]
    pub const fn is_authorized(&self) -> bool {
        self.bearer.is_some()
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.inner.http.request(method, url);
        match &self.bearer {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Execute a GET request.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.url(path)?;
        let mut builder = self.request(Method::GET, url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        self.execute(Method::GET, path, builder).await
    }

    /// Execute a POST request with a JSON body.
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path)?;
        let builder = self.request(Method::POST, url).json(body);
        self.execute(Method::POST, path, builder).await
    }

    /// Execute a PUT request with a JSON body.
    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path)?;
        let builder = self.request(Method::PUT, url).json(body);
        self.execute(Method::PUT, path, builder).await
    }

    /// Execute a DELETE request, ignoring any response body.
    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path)?;
        let builder = self.request(Method::DELETE, url);
        self.execute::<serde::de::IgnoredAny>(Method::DELETE, path, builder)
            .await
            .map(|_| ())
    }

    /// Send once, racing the cancellation token if this handle has one.
    #[instrument(skip(self, builder))]
    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let exchange = async {
            let response = builder.send().await.map_err(|e| {
                warn!(error = %e, "API unreachable");
                ApiError::Network(e)
            })?;
            Self::handle_response(path, response).await
        };

        match &self.cancel {
            Some(cancel) => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        debug!("request cancelled");
                        Err(ApiError::Cancelled)
                    }
                    result = exchange => result,
                }
            }
            None => exchange.await,
        }
    }

    /// Map a response to `T` or to the server's error message.
    async fn handle_response<T: DeserializeOwned>(
        path: &str,
        response: Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await.map_err(ApiError::Network)?;

        if !status.is_success() {
            let err = ApiError::from_response(status, &body);
            warn!(status = status.as_u16(), message = %err, "API error response");
            return Err(err);
        }

        debug!(status = status.as_u16(), bytes = body.len(), "API response");

        // 204 and empty 200 bodies decode as JSON null.
        let body = if body.trim().is_empty() { "null" } else { body.as_str() };
        serde_json::from_str(body).map_err(|source| ApiError::Decode {
            context: path.to_string(),
            source,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn test_base_url_keeps_api_prefix() {
        let client = ApiClient::new(DEFAULT_API_URL).unwrap();
        assert_eq!(
            client.url("/products/5").unwrap().as_str(),
            "http://localhost:5001/api/products/5"
        );

        let client = ApiClient::new("http://localhost:5001/api/").unwrap();
        assert_eq!(
            client.url("cart").unwrap().as_str(),
            "http://localhost:5001/api/cart"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = ApiClient::new(DEFAULT_API_URL)
            .unwrap()
            .authorized(SecretString::from("s3cret"));
        let debug = format!("{client:?}");
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[tokio::test]
    async fn test_bearer_header_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/ping"))
            .and(header("authorization", "Bearer abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&format!("{}/api", server.uri()))
            .unwrap()
            .authorized(SecretString::from("abc123"));
        let body: serde_json::Value = client.get("ping", &[]).await.unwrap();
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_empty_success_body_is_null() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/cart/4"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = ApiClient::new(&format!("{}/api", server.uri())).unwrap();
        client.delete("cart/4").await.unwrap();
    }

    #[tokio::test]
    async fn test_server_message_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"message": "Invalid credentials"})),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(&format!("{}/api", server.uri())).unwrap();
        let err = client
            .post::<serde_json::Value, _>("auth/login", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Port 9 (discard) is closed on test machines.
        let client = ApiClient::new("http://127.0.0.1:9/api").unwrap();
        let err = client
            .get::<serde_json::Value>("products", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
        assert_eq!(err.to_string(), crate::NETWORK_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_cancelled_before_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([]))
                    .set_delay(std::time::Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        let client = ApiClient::new(&format!("{}/api", server.uri()))
            .unwrap()
            .bound_to(cancel.clone());

        let pending = tokio::spawn(async move { client.get::<serde_json::Value>("slow", &[]).await });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        cancel.cancel();

        let err = pending.await.unwrap().unwrap_err();
        assert!(err.is_cancelled());
    }
}
