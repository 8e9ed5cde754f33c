//! Header badge counts.
//!
//! A logged-in visitor's counts come from the REST cart and compare
//! endpoints; a guest's from their storage scope. A failed fetch counts as
//! zero. [`spawn_count_hook`] keeps the counts current for a live region:
//! it computes once on mount and again whenever the bus reports a change
//! that touches the cart or the compare list.

use tokio::sync::{broadcast::error::RecvError, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use threadline_client::{ApiClient, cart_quantity};

use crate::state::AppState;
use crate::visitor::{Visitor, VisitorId};

/// Badge values shown in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeaderCounts {
    pub cart: u32,
    pub compare: u32,
}

/// Computes counts for one visitor.
///
/// The visitor handle is rebuilt on every computation so a login or logout
/// in another tab switches between the REST and guest paths.
#[derive(Debug, Clone)]
pub struct CountSource {
    state: AppState,
    visitor: VisitorId,
    cancel: Option<CancellationToken>,
}

impl CountSource {
    #[must_use]
    pub const fn new(state: AppState, visitor: VisitorId) -> Self {
        Self {
            state,
            visitor,
            cancel: None,
        }
    }

    /// Bind REST calls to `cancel`.
    #[must_use]
    pub fn bound_to(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn visitor(&self) -> (Visitor, ApiClient) {
        let visitor = Visitor::new(self.visitor, &self.state);
        let api = match &self.cancel {
            Some(cancel) => visitor.api().bound_to(cancel.clone()),
            None => visitor.api().clone(),
        };
        (visitor, api)
    }

    /// Sum of cart line quantities.
    pub async fn cart(&self) -> u32 {
        let (visitor, api) = self.visitor();
        if !visitor.is_logged_in() {
            return visitor.storage.guest_cart().total_quantity();
        }

        match api.get_cart().await {
            Ok(items) => cart_quantity(&items),
            Err(err) => {
                if !err.is_cancelled() {
                    warn!(error = %err, visitor = %self.visitor, "cart count unavailable");
                }
                0
            }
        }
    }

    /// Number of products being compared.
    pub async fn compare(&self) -> u32 {
        let (visitor, api) = self.visitor();
        let len = if visitor.is_logged_in() {
            match api.get_compare().await {
                Ok(products) => products.len(),
                Err(err) => {
                    if !err.is_cancelled() {
                        warn!(error = %err, visitor = %self.visitor, "compare count unavailable");
                    }
                    0
                }
            }
        } else {
            visitor.storage.guest_compare().len()
        };
        u32::try_from(len).unwrap_or(u32::MAX)
    }

    pub async fn counts(&self) -> HeaderCounts {
        let (cart, compare) = tokio::join!(self.cart(), self.compare());
        HeaderCounts { cart, compare }
    }
}

/// Keep a visitor's counts current until `cancel` fires or every receiver
/// is dropped.
///
/// The receiver starts at zero counts and is updated once the first
/// computation finishes.
#[must_use]
pub fn spawn_count_hook(source: CountSource, cancel: CancellationToken) -> watch::Receiver<HeaderCounts> {
    let (tx, rx) = watch::channel(HeaderCounts::default());
    let mut bus = source.state.events().subscribe();
    let source = source.bound_to(cancel.clone());

    tokio::spawn(async move {
        let mut counts = source.counts().await;
        if cancel.is_cancelled() {
            return;
        }
        tx.send_replace(counts);

        loop {
            let (cart, compare) = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = tx.closed() => break,
                event = bus.recv() => match event {
                    Ok(event) if event.visitor == source.visitor => {
                        (event.kind.affects_cart(), event.kind.affects_compare())
                    }
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "count hook lagged, recomputing everything");
                        (true, true)
                    }
                    Err(RecvError::Closed) => break,
                },
            };

            if cart {
                counts.cart = source.cart().await;
            }
            if compare {
                counts.compare = source.compare().await;
            }
            if cancel.is_cancelled() {
                break;
            }
            tx.send_if_modified(|current| {
                let changed = *current != counts;
                *current = counts;
                changed
            });
        }
        debug!(visitor = %source.visitor, "count hook stopped");
    });

    rx
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use threadline_core::ProductId;
    use threadline_core::guest::{GuestCart, GuestCartLine, GuestCompare};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::events::EventKind;

    fn state(api_url: &str) -> AppState {
        AppState::new(StorefrontConfig::local(api_url)).unwrap()
    }

    #[tokio::test]
    async fn test_guest_count_is_sum_of_quantities() {
        let state = state("http://127.0.0.1:9/api");
        let visitor = Visitor::new(VisitorId::random(), &state);
        let mut cart = GuestCart::default();
        cart.add(GuestCartLine::new(ProductId::new(1), 2));
        cart.add(GuestCartLine::new(ProductId::new(2), 3));
        visitor.save_guest_cart(&cart).unwrap();
        visitor
            .save_guest_compare(&GuestCompare::new(vec![ProductId::new(1)]))
            .unwrap();

        let counts = CountSource::new(state, visitor.id).counts().await;
        assert_eq!(counts, HeaderCounts { cart: 5, compare: 1 });
    }

    #[tokio::test]
    async fn test_logged_in_counts_come_from_the_api() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cart"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "productId": 7, "quantity": 2},
                {"id": 2, "productId": 8}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/compare"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let state = state(&format!("{}/api", server.uri()));
        let visitor = Visitor::new(VisitorId::random(), &state);
        visitor.sign_in("tok").unwrap();

        let counts = CountSource::new(state, visitor.id).counts().await;
        assert_eq!(counts, HeaderCounts { cart: 3, compare: 0 });
    }

    #[tokio::test]
    async fn test_hook_follows_cart_events_for_its_visitor() {
        let state = state("http://127.0.0.1:9/api");
        let visitor = Visitor::new(VisitorId::random(), &state);
        let cancel = CancellationToken::new();
        let mut rx = spawn_count_hook(CountSource::new(state.clone(), visitor.id), cancel.clone());

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().cart, 0);

        visitor
            .save_guest_cart(&GuestCart::new(vec![GuestCartLine::new(ProductId::new(3), 4)]))
            .unwrap();
        tokio::time::timeout(Duration::from_secs(5), rx.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rx.borrow_and_update().cart, 4);

        // Another visitor's events do not wake this hook.
        state
            .events()
            .publish(VisitorId::random(), EventKind::CartUpdated);
        cancel.cancel();
        assert!(rx.changed().await.is_err());
    }
}
