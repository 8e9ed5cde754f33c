//! Server-side compare list for logged-in shoppers.

use serde::de::IgnoredAny;
use serde_json::json;
use tracing::instrument;

use threadline_core::ProductId;

use crate::ApiClient;
use crate::error::ApiError;
use crate::types::{Listing, Product};

impl ApiClient {
    /// Products on the shopper's compare list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn get_compare(&self) -> Result<Vec<Product>, ApiError> {
        self.get::<Listing<Product>>("compare", &[])
            .await
            .map(Listing::into_items)
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %product))]
    pub async fn add_to_compare(&self, product: ProductId) -> Result<(), ApiError> {
        self.post::<IgnoredAny, _>("compare", &json!({ "productId": product }))
            .await
            .map(|_| ())
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %product))]
    pub async fn remove_from_compare(&self, product: ProductId) -> Result<(), ApiError> {
        self.delete(&format!("compare/{product}")).await
    }
}
