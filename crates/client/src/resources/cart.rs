//! Server-side cart for logged-in shoppers.

use serde::de::IgnoredAny;
use serde_json::json;
use tracing::instrument;

use threadline_core::CartItemId;

use crate::ApiClient;
use crate::error::ApiError;
use crate::types::{CartAdd, CartItem, Listing};

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error if the request fails (401 when the token is stale).
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<Vec<CartItem>, ApiError> {
        self.get::<Listing<CartItem>>("cart", &[])
            .await
            .map(Listing::into_items)
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %line.product_id))]
    pub async fn add_to_cart(&self, line: &CartAdd) -> Result<(), ApiError> {
        self.post::<IgnoredAny, _>("cart", line).await.map(|_| ())
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(item_id = %item))]
    pub async fn update_cart_item(&self, item: CartItemId, quantity: u32) -> Result<(), ApiError> {
        self.put::<IgnoredAny, _>(&format!("cart/{item}"), &json!({ "quantity": quantity }))
            .await
            .map(|_| ())
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(item_id = %item))]
    pub async fn remove_cart_item(&self, item: CartItemId) -> Result<(), ApiError> {
        self.delete(&format!("cart/{item}")).await
    }
}
