//! Inventory route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Response,
};
use serde::Deserialize;
use tracing::instrument;

use threadline_client::{ApiClient, InventoryItem};
use threadline_core::ProductId;
use threadline_core::validation::whole_number;

use super::{RESOURCE_CHANGED, inline_failure};
use crate::components::Toast;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::middleware::htmx::{trigger, with_toast};
use crate::page::Chrome;
use crate::state::AppState;

/// Query parameters for the inventory page.
#[derive(Debug, Default, Deserialize)]
pub struct InventoryQuery {
    pub search: Option<String>,
    /// Present when "low stock only" is ticked.
    pub low_stock_only: Option<String>,
}

impl InventoryQuery {
    fn term(&self) -> &str {
        self.search.as_deref().map_or("", str::trim)
    }

    fn low_only(&self) -> bool {
        self.low_stock_only.is_some()
    }
}

/// Form input for setting a stock level.
#[derive(Debug, Deserialize)]
pub struct StockForm {
    pub stock: String,
}

/// Inventory index page template.
#[derive(Template, WebTemplate)]
#[template(path = "inventory/index.html")]
pub struct InventoryIndexTemplate {
    pub page: Chrome,
    pub debounce_ms: u128,
    pub search: String,
    pub low_stock_only: bool,
    pub items: Vec<InventoryItem>,
}

/// Inventory table fragment.
#[derive(Template, WebTemplate)]
#[template(path = "inventory/list.html")]
pub struct InventoryListTemplate {
    pub items: Vec<InventoryItem>,
}

impl InventoryIndexTemplate {
    #[must_use]
    pub fn low_stock_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_low()).count()
    }
}

async fn load(api: &ApiClient, query: &InventoryQuery) -> Result<Vec<InventoryItem>> {
    let mut items = api.admin_inventory(Some(query.term())).await?;
    if query.low_only() {
        items.retain(InventoryItem::is_low);
    }
    Ok(items)
}

/// Inventory index page handler.
#[instrument(skip_all)]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<InventoryQuery>,
) -> Result<InventoryIndexTemplate> {
    let (items, toast) = match load(&admin.api, &query).await {
        Ok(items) => (items, None),
        Err(err) => (Vec::new(), Some(inline_failure(err)?)),
    };

    Ok(InventoryIndexTemplate {
        page: Chrome::new(&admin, "Inventory", "/inventory").with_toast(toast),
        debounce_ms: state.config().search_debounce_ms(),
        search: query.term().to_string(),
        low_stock_only: query.low_only(),
        items,
    })
}

/// Table fragment for searches and reloads.
#[instrument(skip_all)]
pub async fn list(
    RequireAdminAuth(admin): RequireAdminAuth,
    Query(query): Query<InventoryQuery>,
) -> Result<InventoryListTemplate> {
    Ok(InventoryListTemplate {
        items: load(&admin.api, &query).await?,
    })
}

/// Set a product's stock (HTMX handler).
#[instrument(skip_all, fields(product_id = %product))]
pub async fn set_stock(
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(product): Path<ProductId>,
    Form(form): Form<StockForm>,
) -> Result<Response> {
    let stock = whole_number("Stock", &form.stock)?;
    admin.api.admin_set_stock(product, stock).await?;
    tracing::info!(stock, "stock updated");

    let toast = Toast::success(format!("Stock set to {stock}"));
    Ok(trigger(with_toast(String::new(), &toast)?, RESOURCE_CHANGED))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(stock: u32) -> InventoryItem {
        serde_json::from_value(serde_json::json!({
            "productId": stock, "name": "Tee", "stock": stock, "lowStockThreshold": 5
        }))
        .unwrap()
    }

    #[test]
    fn test_low_stock_badge_count() {
        let page = InventoryIndexTemplate {
            page: Chrome {
                title: "Inventory".to_string(),
                email: String::new(),
                current_path: "/inventory".to_string(),
                toasts: Vec::new(),
            },
            debounce_ms: 500,
            search: String::new(),
            low_stock_only: false,
            items: vec![item(2), item(40), item(5)],
        };
        assert_eq!(page.low_stock_count(), 2);
        assert_eq!(page.render().unwrap().matches("badge--low").count(), 2);
    }
}
