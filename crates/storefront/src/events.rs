//! Visitor-scoped event bus.
//!
//! Handlers that change cart, compare, auth, or local storage state publish an
//! [`Event`] here. Live regions and count hooks subscribe and filter to their
//! own visitor, so a change made in one tab reaches every other tab of the
//! same visitor.
//!
//! The bus is a `tokio::sync::broadcast` channel. A subscriber that falls
//! behind sees `Lagged` and should treat it as "everything changed".

use axum::http::HeaderValue;
use tokio::sync::broadcast;
use tracing::debug;

use threadline_client::storage::keys;

use crate::visitor::VisitorId;

/// Buffered events per subscriber before it starts lagging.
const BUS_CAPACITY: usize = 256;

/// What changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Login or logout.
    AuthChanged,
    /// Cart contents changed.
    CartUpdated,
    /// Compare list changed.
    CompareUpdated,
    /// A local storage key was written or removed.
    StorageChanged { key: String },
}

impl EventKind {
    /// Name used in `HX-Trigger` so the acting page can react too.
    #[must_use]
    pub const fn trigger_name(&self) -> &'static str {
        match self {
            Self::AuthChanged => "authChanged",
            Self::CartUpdated => "cartUpdated",
            Self::CompareUpdated => "compareUpdated",
            Self::StorageChanged { .. } => "storage",
        }
    }

    /// Whether the cart badge has to be recomputed.
    #[must_use]
    pub fn affects_cart(&self) -> bool {
        match self {
            Self::AuthChanged | Self::CartUpdated => true,
            Self::CompareUpdated => false,
            Self::StorageChanged { key } => key == keys::CART_GUEST || key == keys::TOKEN,
        }
    }

    /// Whether the compare badge has to be recomputed.
    #[must_use]
    pub fn affects_compare(&self) -> bool {
        match self {
            Self::AuthChanged | Self::CompareUpdated => true,
            Self::CartUpdated => false,
            Self::StorageChanged { key } => key == keys::COMPARE_ITEMS || key == keys::TOKEN,
        }
    }
}

/// An event for one visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub visitor: VisitorId,
    pub kind: EventKind,
}

/// Broadcast bus shared by every handler.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BUS_CAPACITY);
        Self { sender }
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, visitor: VisitorId, kind: EventKind) {
        debug!(%visitor, ?kind, "publishing visitor event");
        let _ = self.sender.send(Event { visitor, kind });
    }

    /// Publish several events for one visitor.
    pub fn publish_all(&self, visitor: VisitorId, kinds: impl IntoIterator<Item = EventKind>) {
        for kind in kinds {
            self.publish(visitor, kind);
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

/// `HX-Trigger` header value naming each distinct event once, in first-seen
/// order, comma-separated.
#[must_use]
pub fn hx_trigger(kinds: &[EventKind]) -> HeaderValue {
    let mut names: Vec<&'static str> = Vec::with_capacity(kinds.len());
    for name in kinds.iter().map(EventKind::trigger_name) {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    HeaderValue::from_str(&names.join(", ")).unwrap_or_else(|_| HeaderValue::from_static(""))
}
