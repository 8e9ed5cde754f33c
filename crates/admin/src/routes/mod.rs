//! HTTP route handlers for the admin panel.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                              - Redirect to /products
//! GET    /health                        - Health check
//!
//! # Auth
//! GET    /login                         - Login page
//! POST   /login                         - Login action
//! POST   /logout                        - Logout action
//!
//! # Resources (products, categories, coupons, banners, carousels, sales)
//! GET    /{resource}                    - List page with debounced search
//! GET    /{resource}/list               - Table fragment (search, reload)
//! POST   /{resource}                    - Create
//! GET    /{resource}/new                - Create modal
//! GET    /{resource}/{id}/edit          - Edit modal
//! POST   /{resource}/{id}               - Update
//! DELETE /{resource}/{id}               - Delete
//!
//! # Inventory
//! GET    /inventory                     - Stock levels
//! GET    /inventory/list                - Table fragment
//! POST   /inventory/{product_id}/stock  - Set stock
//!
//! # Orders
//! GET    /orders                        - Orders with search and status filter
//! GET    /orders/list                   - Table fragment
//! POST   /orders/{id}/status            - Change status
//!
//! # Product content
//! GET    /products/{id}/content         - Content block editor
//! POST   /products/{id}/content         - Add a block
//! DELETE /products/{id}/content/{block} - Remove a block
//! ```
//!
//! Mutations answer with an out-of-band toast and `HX-Trigger: resourceChanged`,
//! which makes the visible table reload itself.

pub mod auth;
pub mod catalog;
pub mod content;
pub mod inventory;
pub mod marketing;
pub mod orders;
pub mod resources;

use axum::{
    Router,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{delete, get, post},
};
use serde::Deserialize;

use threadline_client::{
    BannerResource, CarouselResource, CategoryResource, CouponResource, ProductResource,
    SaleResource,
};

use crate::components::Toast;
use crate::error::{AppError, Result};
use crate::middleware::HxRequest;
use crate::middleware::htmx::HX_REDIRECT;
use crate::state::AppState;

pub use resources::{RESOURCE_CHANGED, resource_routes};

/// Search box query shared by the list pages.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

impl SearchQuery {
    #[must_use]
    pub fn term(&self) -> &str {
        self.search.as_deref().map_or("", str::trim)
    }
}

/// Build the full route table.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/products") }))
        .route("/health", get(health))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .merge(resource_routes::<ProductResource>())
        .merge(resource_routes::<CategoryResource>())
        .merge(resource_routes::<CouponResource>())
        .merge(resource_routes::<BannerResource>())
        .merge(resource_routes::<CarouselResource>())
        .merge(resource_routes::<SaleResource>())
        .route("/inventory", get(inventory::index))
        .route("/inventory/list", get(inventory::list))
        .route("/inventory/{product_id}/stock", post(inventory::set_stock))
        .route("/orders", get(orders::index))
        .route("/orders/list", get(orders::list))
        .route("/orders/{id}/status", post(orders::update_status))
        .route(
            "/products/{id}/content",
            get(content::editor).post(content::add_block),
        )
        .route(
            "/products/{id}/content/{block_id}",
            delete(content::remove_block),
        )
}

async fn health() -> &'static str {
    "ok"
}

/// Navigate: `HX-Redirect` for htmx requests, a 303 otherwise.
#[must_use]
pub fn redirect(hx: HxRequest, to: &str) -> Response {
    if hx.0 {
        if let Ok(value) = HeaderValue::from_str(to) {
            return (StatusCode::OK, [(HX_REDIRECT, value)]).into_response();
        }
    }
    Redirect::to(to).into_response()
}

/// Toast for a failure the handler shows inline next to the operator's
/// input. Cancelled calls have nothing to show and stay errors.
///
/// # Errors
///
/// Returns `err` when it carries no message.
pub fn inline_failure(err: AppError) -> Result<Toast> {
    match err.toast_message() {
        Some(message) if !message.is_empty() => {
            tracing::warn!(error = %err, "admin action failed");
            Ok(Toast::error(message))
        }
        _ => Err(err),
    }
}
