//! Products and categories.

use tracing::instrument;

use threadline_core::ProductId;

use crate::ApiClient;
use crate::error::ApiError;
use crate::types::{Category, ContentBlock, Listing, Product};

/// Filters for the product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ProductQuery {
    #[must_use]
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn in_category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }

    /// Query-string pairs; blank filters are omitted.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            pairs.push(("category", category.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Listing<Product>, ApiError> {
        self.get("products", &query.to_pairs()).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails, including 404 for unknown ids.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.get(&format!("products/{id}"), &[]).await
    }

    /// Detail-page content blocks for a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product_content(&self, id: ProductId) -> Result<Vec<ContentBlock>, ApiError> {
        self.get::<Listing<ContentBlock>>(&format!("products/{id}/content"), &[])
            .await
            .map(Listing::into_items)
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get::<Listing<Category>>("categories", &[])
            .await
            .map(Listing::into_items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_filters_are_omitted() {
        let query = ProductQuery {
            search: Some("   ".to_string()),
            category: Some(String::new()),
            page: Some(2),
            limit: None,
        };
        assert_eq!(query.to_pairs(), vec![("page", "2".to_string())]);
    }

    #[test]
    fn test_search_is_trimmed() {
        assert_eq!(
            ProductQuery::search(" linen ").to_pairs(),
            vec![("search", "linen".to_string())]
        );
    }
}
