//! Per-visitor key-value storage.
//!
//! The storefront keeps the same keys a browser would keep in local storage:
//! auth tokens, the guest cart, and the guest compare list. Each visitor gets
//! a scope (their visitor id) so two visitors never see each other's values.
//!
//! Reads never fail: a missing key, an I/O error, or malformed JSON all read
//! as "nothing stored". Writes report errors so callers can log them.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

use threadline_core::guest::{GuestCart, GuestCompare};

/// Storage keys.
pub mod keys {
    /// Bearer token of a logged-in shopper.
    pub const TOKEN: &str = "token";
    /// Bearer token of a logged-in administrator.
    pub const ADMIN_TOKEN: &str = "adminToken";
    /// JSON array of guest cart lines.
    pub const CART_GUEST: &str = "cart_guest";
    /// JSON array of product ids being compared.
    pub const COMPARE_ITEMS: &str = "compareItems";
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Backing store for [`LocalStorage`].
pub trait KeyValueStore: Send + Sync + 'static {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing medium cannot be read.
    fn get(&self, scope: &str, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing medium cannot be written.
    fn set(&self, scope: &str, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing medium cannot be written.
    fn remove(&self, scope: &str, key: &str) -> Result<(), StorageError>;
}

/// In-process store. Values are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, scope: &str, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(scope).and_then(|s| s.get(key)).cloned())
    }

    fn set(&self, scope: &str, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries
            .entry(scope.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, scope: &str, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(scoped) = entries.get_mut(scope) {
            scoped.remove(key);
        }
        Ok(())
    }
}

/// One JSON file per scope under a root directory.
///
/// Writes are read-modify-write with no locking across processes.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Use `root` as the storage directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, scope: &str) -> PathBuf {
        let safe: String = scope
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{safe}.json"))
    }

    fn load(&self, scope: &str) -> Result<HashMap<String, String>, StorageError> {
        match fs::read_to_string(self.path_for(scope)) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, scope: &str, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        let path = self.path_for(scope);
        if entries.is_empty() {
            return match fs::remove_file(path) {
                Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            };
        }
        fs::write(path, serde_json::to_vec(entries)?)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, scope: &str, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load(scope)?.remove(key))
    }

    fn set(&self, scope: &str, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.load(scope).unwrap_or_default();
        entries.insert(key.to_string(), value.to_string());
        self.save(scope, &entries)
    }

    fn remove(&self, scope: &str, key: &str) -> Result<(), StorageError> {
        let mut entries = self.load(scope).unwrap_or_default();
        if entries.remove(key).is_some() {
            self.save(scope, &entries)?;
        }
        Ok(())
    }
}

/// A visitor's view of the store.
#[derive(Clone)]
pub struct LocalStorage {
    store: Arc<dyn KeyValueStore>,
    scope: String,
}

impl std::fmt::Debug for LocalStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStorage")
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl LocalStorage {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, scope: impl Into<String>) -> Self {
        Self {
            store,
            scope: scope.into(),
        }
    }

    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Raw string value; `None` when missing or unreadable.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match self.store.get(&self.scope, key) {
            Ok(value) => value,
            Err(e) => {
                warn!(scope = %self.scope, key, error = %e, "storage read failed");
                None
            }
        }
    }

    /// # Errors
    ///
    /// Returns an error when the backing store cannot be written.
    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.store.set(&self.scope, key, value)
    }

    /// # Errors
    ///
    /// Returns an error when the backing store cannot be written.
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.store.remove(&self.scope, key)
    }

    /// Decode a JSON value. Missing or malformed values read as `T::default()`.
    #[must_use]
    pub fn get_json<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let Some(raw) = self.get(key) else {
            return T::default();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(scope = %self.scope, key, error = %e, "malformed stored JSON, treating as empty");
            T::default()
        })
    }

    /// # Errors
    ///
    /// Returns an error when `value` cannot be encoded or stored.
    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw)
    }

    /// Shopper bearer token.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.get(keys::TOKEN)
            .filter(|t| !t.is_empty())
            .map(SecretString::from)
    }

    /// Administrator bearer token.
    #[must_use]
    pub fn admin_token(&self) -> Option<SecretString> {
        self.get(keys::ADMIN_TOKEN)
            .filter(|t| !t.is_empty())
            .map(SecretString::from)
    }

    #[must_use]
    pub fn guest_cart(&self) -> GuestCart {
        self.get_json(keys::CART_GUEST)
    }

    /// # Errors
    ///
    /// Returns an error when the cart cannot be stored.
    pub fn set_guest_cart(&self, cart: &GuestCart) -> Result<(), StorageError> {
        self.set_json(keys::CART_GUEST, cart)
    }

    #[must_use]
    pub fn guest_compare(&self) -> GuestCompare {
        self.get_json(keys::COMPARE_ITEMS)
    }

    /// # Errors
    ///
    /// Returns an error when the list cannot be stored.
    pub fn set_guest_compare(&self, compare: &GuestCompare) -> Result<(), StorageError> {
        self.set_json(keys::COMPARE_ITEMS, compare)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;
    use threadline_core::ProductId;
    use threadline_core::guest::GuestCartLine;

    use super::*;

    fn memory(scope: &str) -> LocalStorage {
        LocalStorage::new(Arc::new(MemoryStore::new()), scope)
    }

    #[test]
    fn test_scopes_are_isolated() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let alice = LocalStorage::new(Arc::clone(&store), "alice");
        let bob = LocalStorage::new(store, "bob");

        alice.set(keys::TOKEN, "tok-a").unwrap();
        assert_eq!(alice.token().unwrap().expose_secret(), "tok-a");
        assert!(bob.token().is_none());
    }

    #[test]
    fn test_malformed_json_reads_as_empty() {
        let storage = memory("v1");
        storage.set(keys::CART_GUEST, "{not json").unwrap();
        assert!(storage.guest_cart().is_empty());

        storage.set(keys::COMPARE_ITEMS, r#"{"ids": [1]}"#).unwrap();
        assert!(storage.guest_compare().is_empty());
    }

    #[test]
    fn test_guest_cart_persists() {
        let storage = memory("v1");
        let mut cart = storage.guest_cart();
        cart.add(GuestCartLine::new(ProductId::new(4), 2));
        storage.set_guest_cart(&cart).unwrap();

        assert_eq!(storage.guest_cart().total_quantity(), 2);
        assert_eq!(
            storage.get(keys::CART_GUEST).unwrap(),
            r#"[{"productId":4,"quantity":2}]"#
        );
    }

    #[test]
    fn test_empty_token_is_absent() {
        let storage = memory("v1");
        storage.set(keys::ADMIN_TOKEN, "").unwrap();
        assert!(storage.admin_token().is_none());
        storage.remove(keys::ADMIN_TOKEN).unwrap();
        storage.remove(keys::ADMIN_TOKEN).unwrap();
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.set("visitor/../1", keys::TOKEN, "abc").unwrap();
        assert_eq!(
            store.get("visitor/../1", keys::TOKEN).unwrap().as_deref(),
            Some("abc")
        );
        // Scope characters outside [A-Za-z0-9_-] never escape the root.
        assert!(dir.path().join("visitor____1.json").exists());

        store.remove("visitor/../1", keys::TOKEN).unwrap();
        assert_eq!(store.get("visitor/../1", keys::TOKEN).unwrap(), None);
        assert!(!dir.path().join("visitor____1.json").exists());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        FileStore::open(dir.path())
            .unwrap()
            .set("v2", keys::COMPARE_ITEMS, "[1,2]")
            .unwrap();

        let storage = LocalStorage::new(Arc::new(FileStore::open(dir.path()).unwrap()), "v2");
        assert_eq!(storage.guest_compare().len(), 2);
    }
}
