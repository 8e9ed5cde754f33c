//! Application state shared across handlers.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use threadline_client::{ApiClient, ApiError, FileStore, KeyValueStore, MemoryStore, StorageError};

use crate::config::StorefrontConfig;
use crate::device::DeviceStore;
use crate::events::EventBus;

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("invalid API url: {0}")]
    Api(#[from] ApiError),
    #[error("cannot open visitor storage: {0}")]
    Storage(#[from] StorageError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds the anonymous API client, the visitor
/// storage backend, the event bus and the device store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    store: Arc<dyn KeyValueStore>,
    events: EventBus,
    devices: DeviceStore,
    shutdown: CancellationToken,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Visitor storage is file-backed when `storage_dir` is configured and
    /// in-memory otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the API url is invalid or the storage directory
    /// cannot be created.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let api = ApiClient::new(&config.api_url)?;
        let store: Arc<dyn KeyValueStore> = match &config.storage_dir {
            Some(dir) => Arc::new(FileStore::open(dir)?),
            None => Arc::new(MemoryStore::new()),
        };

        Ok(Self::with_parts(config, api, store))
    }

    /// Assemble state from already-built parts.
    #[must_use]
    pub fn with_parts(config: StorefrontConfig, api: ApiClient, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                store,
                events: EventBus::new(),
                devices: DeviceStore::new(),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Anonymous API client. Use [`crate::visitor::Visitor::api`] for calls
    /// that need the visitor's token.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.inner.store)
    }

    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    #[must_use]
    pub fn devices(&self) -> &DeviceStore {
        &self.inner.devices
    }

    /// Cancelled when the server starts shutting down, ending open live
    /// connections so graceful shutdown does not wait on them.
    #[must_use]
    pub fn shutdown(&self) -> &CancellationToken {
        &self.inner.shutdown
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
