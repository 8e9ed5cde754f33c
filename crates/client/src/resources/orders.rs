//! Checkout and order history.

use tracing::instrument;

use crate::ApiClient;
use crate::error::ApiError;
use crate::types::{Listing, Order, PlaceOrder};

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error if the request fails or the order is rejected.
    #[instrument(skip(self, order), fields(lines = order.items.len()))]
    pub async fn place_order(&self, order: &PlaceOrder) -> Result<Order, ApiError> {
        self.post("orders", order).await
    }

    /// The logged-in shopper's orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn my_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get::<Listing<Order>>("orders/my", &[])
            .await
            .map(Listing::into_items)
    }
}
