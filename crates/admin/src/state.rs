//! Application state shared across handlers.

use std::sync::Arc;

use threadline_client::{ApiClient, ApiError, KeyValueStore, LocalStorage, MemoryStore};

use crate::config::AdminConfig;

/// Application state shared across all handlers.
///
/// Holds the anonymous API client and the store behind each operator's
/// `adminToken`. The store is in memory; a restart signs everyone out.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    api: ApiClient,
    store: Arc<dyn KeyValueStore>,
}

impl AppState {
    /// # Errors
    ///
    /// Returns an error if the API url is invalid.
    pub fn new(config: AdminConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api_url)?;
        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                store: Arc::new(MemoryStore::new()),
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Client without credentials; only the login call uses it directly.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Storage scope of one admin session.
    #[must_use]
    pub fn storage(&self, scope: &str) -> LocalStorage {
        LocalStorage::new(Arc::clone(&self.inner.store), scope)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .field("api", &self.inner.api)
            .finish_non_exhaustive()
    }
}
