//! Visitor identity and per-visitor storage.
//!
//! Every browser session gets a random [`VisitorId`], kept in the session
//! cookie. It scopes the local storage keys (`token`, `cart_guest`, ...) and
//! the event bus, standing in for one browser profile.

use std::fmt;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use threadline_client::storage::keys;
use threadline_client::{ApiClient, LocalStorage};
use threadline_core::guest::{GuestCart, GuestCompare};

use crate::error::AppError;
use crate::events::{EventBus, EventKind};
use crate::state::AppState;

/// Session key holding the visitor id.
pub const VISITOR_KEY: &str = "visitor_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitorId(Uuid);

impl VisitorId {
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for VisitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The current visitor: id, storage, and an API client carrying their token.
#[derive(Debug, Clone)]
pub struct Visitor {
    pub id: VisitorId,
    pub storage: LocalStorage,
    api: ApiClient,
    events: EventBus,
}

impl Visitor {
    /// Build a visitor handle without going through the session.
    #[must_use]
    pub fn new(id: VisitorId, state: &AppState) -> Self {
        let storage = LocalStorage::new(state.store(), id.to_string());
        let api = match storage.token() {
            Some(token) => state.api().authorized(token),
            None => state.api().clone(),
        };
        Self {
            id,
            storage,
            api,
            events: state.events().clone(),
        }
    }

    /// API client, authorized when the visitor is logged in.
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.api.is_authorized()
    }

    /// Publish an event for this visitor.
    pub fn notify(&self, kind: EventKind) {
        self.events.publish(self.id, kind);
    }

    /// Store the shopper token and announce the login.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be stored.
    pub fn sign_in(&self, token: &str) -> Result<(), AppError> {
        self.storage.set(keys::TOKEN, token)?;
        self.events.publish_all(
            self.id,
            [
                EventKind::StorageChanged {
                    key: keys::TOKEN.to_string(),
                },
                EventKind::AuthChanged,
            ],
        );
        Ok(())
    }

    /// Forget the shopper token and announce the logout.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be removed.
    pub fn sign_out(&self) -> Result<(), AppError> {
        self.storage.remove(keys::TOKEN)?;
        self.events.publish_all(
            self.id,
            [
                EventKind::StorageChanged {
                    key: keys::TOKEN.to_string(),
                },
                EventKind::AuthChanged,
            ],
        );
        Ok(())
    }

    /// Persist the guest cart and announce it.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be stored.
    pub fn save_guest_cart(&self, cart: &GuestCart) -> Result<(), AppError> {
        self.storage.set_guest_cart(cart)?;
        self.events.publish_all(
            self.id,
            [
                EventKind::StorageChanged {
                    key: keys::CART_GUEST.to_string(),
                },
                EventKind::CartUpdated,
            ],
        );
        Ok(())
    }

    /// Persist the guest compare list and announce it.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be stored.
    pub fn save_guest_compare(&self, compare: &GuestCompare) -> Result<(), AppError> {
        self.storage.set_guest_compare(compare)?;
        self.events.publish_all(
            self.id,
            [
                EventKind::StorageChanged {
                    key: keys::COMPARE_ITEMS.to_string(),
                },
                EventKind::CompareUpdated,
            ],
        );
        Ok(())
    }
}

impl FromRequestParts<AppState> for Visitor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| AppError::Internal(msg.to_string()))?;

        let id = match session.get::<VisitorId>(VISITOR_KEY).await? {
            Some(id) => id,
            None => {
                let id = VisitorId::random();
                session.insert(VISITOR_KEY, id).await?;
                tracing::debug!(visitor = %id, "new visitor");
                id
            }
        };

        tracing::Span::current().record("visitor", tracing::field::display(id));
        Ok(Self::new(id, state))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use threadline_core::ProductId;
    use threadline_core::guest::GuestCartLine;

    use super::*;
    use crate::config::StorefrontConfig;

    fn state() -> AppState {
        AppState::new(StorefrontConfig::local("http://127.0.0.1:9/api")).unwrap()
    }

    #[tokio::test]
    async fn test_guest_cart_write_publishes_storage_and_cart_events() {
        let state = state();
        let mut rx = state.events().subscribe();
        let visitor = Visitor::new(VisitorId::random(), &state);

        let cart = GuestCart::new(vec![GuestCartLine::new(ProductId::new(1), 3)]);
        visitor.save_guest_cart(&cart).unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(
            first.kind,
            EventKind::StorageChanged {
                key: keys::CART_GUEST.to_string()
            }
        );
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::CartUpdated);
        assert_eq!(visitor.storage.guest_cart().total_quantity(), 3);
    }

    #[test]
    fn test_sign_in_authorizes_new_handles() {
        let state = state();
        let id = VisitorId::random();
        let visitor = Visitor::new(id, &state);
        assert!(!visitor.is_logged_in());

        visitor.sign_in("tok").unwrap();
        assert!(Visitor::new(id, &state).is_logged_in());

        visitor.sign_out().unwrap();
        assert!(!Visitor::new(id, &state).is_logged_in());
    }
}
