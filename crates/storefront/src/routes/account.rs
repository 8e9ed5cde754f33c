//! Account pages (login required).

use askama::Template;
use askama_web::WebTemplate;
use tracing::instrument;

use threadline_client::Order;

use super::Fallbacks;
use crate::components::HeaderProps;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireLogin;
use crate::page::{Chrome, PageContext};

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/orders.html")]
pub struct OrdersTemplate {
    pub page: Chrome,
    pub orders: Vec<Order>,
}

impl OrdersTemplate {
    #[must_use]
    pub fn placed_on(&self, order: &Order) -> String {
        order
            .created_at
            .map_or_else(|| "N/A".to_string(), |at| at.format("%b %-d, %Y").to_string())
    }
}

/// Display the visitor's orders, newest first.
#[instrument(skip_all, fields(visitor = %visitor.id))]
pub async fn orders(RequireLogin(visitor): RequireLogin, ctx: PageContext) -> Result<OrdersTemplate> {
    let mut fallbacks = Fallbacks::default();
    let mut orders = fallbacks.take("orders", visitor.api().my_orders().await);
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let page = ctx
        .chrome_with("Your orders", HeaderProps::default(), fallbacks.into_toasts())
        .await?;
    Ok(OrdersTemplate { page, orders })
}
