//! Order list and status changes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Response,
};
use serde::Deserialize;
use tracing::instrument;

use threadline_client::{ApiClient, Order};
use threadline_core::validation::ValidationError;
use threadline_core::{OrderId, OrderStatus};

use super::{RESOURCE_CHANGED, inline_failure};
use crate::components::{FilterOption, TableFilter, Toast};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::middleware::htmx::{trigger, with_toast};
use crate::page::Chrome;
use crate::state::AppState;

/// Query parameters for the orders page.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub search: Option<String>,
    /// Wire status value; empty for all.
    pub status: Option<String>,
}

impl OrdersQuery {
    fn term(&self) -> &str {
        self.search.as_deref().map_or("", str::trim)
    }

    fn status(&self) -> std::result::Result<Option<OrderStatus>, ValidationError> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => OrderStatus::parse(raw)
                .map(Some)
                .ok_or(ValidationError::InvalidChoice { field: "Status" }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// One order as a table row.
#[derive(Debug, Clone)]
pub struct OrderRow {
    pub id: OrderId,
    pub placed: String,
    pub customer: String,
    pub items: u32,
    pub total: String,
    pub status: OrderStatus,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            placed: order
                .created_at
                .map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d %H:%M").to_string()),
            customer: order
                .customer_name
                .clone()
                .or_else(|| order.customer_email.clone())
                .or_else(|| order.shipping_address.as_ref().map(|a| a.full_name.clone()))
                .unwrap_or_else(|| "Guest".to_string()),
            items: order
                .items
                .iter()
                .map(|line| line.quantity.unwrap_or(1))
                .sum(),
            total: order.total.to_string(),
            status: order.status,
        }
    }
}

impl OrderRow {
    #[must_use]
    pub const fn statuses(&self) -> [OrderStatus; 5] {
        OrderStatus::ALL
    }

    #[must_use]
    pub fn is_status(&self, status: &OrderStatus) -> bool {
        self.status == *status
    }
}

/// Orders page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub page: Chrome,
    pub debounce_ms: u128,
    pub search: String,
    pub status_filter: TableFilter,
    pub rows: Vec<OrderRow>,
}

/// Orders table fragment.
#[derive(Template, WebTemplate)]
#[template(path = "orders/list.html")]
pub struct OrdersListTemplate {
    pub rows: Vec<OrderRow>,
}

fn status_filter(selected: Option<OrderStatus>) -> TableFilter {
    let options = OrderStatus::ALL
        .iter()
        .map(|status| FilterOption::new(status.as_str(), status.label()))
        .collect();
    TableFilter::select("status", "Status", options).with_selected(selected.map(OrderStatus::as_str))
}

async fn load(api: &ApiClient, query: &OrdersQuery) -> Result<Vec<OrderRow>> {
    let orders = api.admin_orders(Some(query.term()), query.status()?).await?;
    Ok(orders.iter().map(OrderRow::from).collect())
}

/// Orders index page handler.
#[instrument(skip_all)]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> Result<OrdersIndexTemplate> {
    let (rows, toast) = match load(&admin.api, &query).await {
        Ok(rows) => (rows, None),
        Err(err) => (Vec::new(), Some(inline_failure(err)?)),
    };

    Ok(OrdersIndexTemplate {
        page: Chrome::new(&admin, "Orders", "/orders").with_toast(toast),
        debounce_ms: state.config().search_debounce_ms(),
        search: query.term().to_string(),
        status_filter: status_filter(query.status().ok().flatten()),
        rows,
    })
}

/// Table fragment for searches, filter changes and reloads.
#[instrument(skip_all)]
pub async fn list(
    RequireAdminAuth(admin): RequireAdminAuth,
    Query(query): Query<OrdersQuery>,
) -> Result<OrdersListTemplate> {
    Ok(OrdersListTemplate {
        rows: load(&admin.api, &query).await?,
    })
}

/// Change an order's status (HTMX handler).
#[instrument(skip_all, fields(order_id = %order))]
pub async fn update_status(
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(order): Path<OrderId>,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    let status = OrderStatus::parse(form.status.trim())
        .ok_or(ValidationError::InvalidChoice { field: "Status" })?;
    admin.api.admin_update_order_status(order, status).await?;
    tracing::info!(status = status.as_str(), "order status updated");

    let toast = Toast::success(format!("Order {order} marked {}", status.label()));
    Ok(trigger(with_toast(String::new(), &toast)?, RESOURCE_CHANGED))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_filter_parsing() {
        let all = OrdersQuery {
            search: None,
            status: Some(String::new()),
        };
        assert_eq!(all.status(), Ok(None));

        let shipped = OrdersQuery {
            search: None,
            status: Some("shipped".to_string()),
        };
        assert_eq!(shipped.status(), Ok(Some(OrderStatus::Shipped)));

        let bogus = OrdersQuery {
            search: None,
            status: Some("lost".to_string()),
        };
        assert_eq!(
            bogus.status(),
            Err(ValidationError::InvalidChoice { field: "Status" })
        );
    }

    #[test]
    fn test_order_row_summarizes() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "_id": 31,
            "orderItems": [{"name": "Tee", "quantity": 2, "price": 10}, {"name": "Cap", "price": 5}],
            "totalPrice": 25,
            "status": "processing",
            "shippingAddress": {
                "fullName": "Ada Byron", "address": "1 Loom St", "city": "London",
                "postalCode": "N1", "country": "UK", "phone": "0"
            }
        }))
        .unwrap();

        let row = OrderRow::from(&order);
        assert_eq!(row.items, 3);
        assert_eq!(row.customer, "Ada Byron");
        assert_eq!(row.placed, "-");
        assert!(row.is_status(&OrderStatus::Processing));
    }
}
