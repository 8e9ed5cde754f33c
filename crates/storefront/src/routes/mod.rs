//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page (hero, sale strip, carousels)
//! GET  /health                    - Health check
//!
//! # Products
//! GET  /products                  - Product listing (search, category, page)
//! GET  /products/results          - Listing results fragment (HTMX search)
//! GET  /products/{id}             - Product detail
//! GET  /products/{id}/details     - Detail accordion fragment (HTMX)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                      - Cart page
//! POST /cart/add                  - Add to cart (toast, triggers cartUpdated)
//! POST /cart/update               - Update quantity (cart fragment)
//! POST /cart/remove               - Remove line (cart fragment)
//! POST /cart/coupon               - Check a coupon against the subtotal
//! GET  /checkout                  - Checkout form (login required)
//! POST /checkout                  - Place the order (login required)
//!
//! # Compare
//! GET  /compare                   - Compare page
//! GET  /compare/panel             - Compare variant for the current device
//! POST /compare/add               - Add a product (toast, triggers compareUpdated)
//! POST /compare/remove            - Remove a product (compare fragment)
//!
//! # Account (login required)
//! GET  /account/orders            - Order history
//!
//! # Auth
//! GET  /auth/login                - Login page
//! POST /auth/login                - Login action
//! GET  /auth/register             - Register page
//! POST /auth/register             - Register action
//! POST /auth/logout               - Logout action
//!
//! # UI state
//! POST /ui/viewport               - Report the viewport width
//! GET  /ui/menu                   - Mobile menu drawer fragment
//!
//! # Live regions (server-sent events)
//! GET  /live/home                 - Every home page region
//! GET  /live/header               - Header counts
//! GET  /live/hero                 - Hero rotation
//! GET  /live/sales                - Sale countdowns
//! GET  /live/carousels/{slot}     - One carousel's rotation
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod compare;
pub mod home;
pub mod live;
pub mod products;
pub mod ui;

use axum::{
    Router,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};

use threadline_client::ApiError;

use crate::components::Toast;
use crate::error::degrade;
use crate::events::{EventKind, hx_trigger};
use crate::middleware::HxRequest;
use crate::middleware::htmx::{HX_REDIRECT, HX_TRIGGER};
use crate::middleware::toast_response;
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/results", get(products::results))
        .route("/{id}", get(products::show))
        .route("/{id}/details", get(products::details))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/coupon", post(cart::coupon))
}

/// Create the compare routes router.
pub fn compare_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(compare::show))
        .route("/panel", get(compare::panel))
        .route("/add", post(compare::add))
        .route("/remove", post(compare::remove))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the UI state routes router.
pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/viewport", post(ui::viewport))
        .route("/menu", get(ui::menu))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", get(cart::checkout_page).post(cart::checkout))
        .nest("/compare", compare_routes())
        .route("/account/orders", get(account::orders))
        .nest("/auth", auth_routes())
        .nest("/ui", ui_routes())
        .merge(live::routes())
}

async fn health() -> &'static str {
    "ok"
}

/// Collects toasts for fetches that fell back to defaults.
///
/// A page keeps rendering when one of its fetches fails; the failure shows
/// up as a toast instead. Identical messages are shown once.
#[derive(Debug, Default)]
pub struct Fallbacks {
    toasts: Vec<Toast>,
}

impl Fallbacks {
    /// The fetched value, or the default after recording the failure.
    pub fn take<T: Default>(&mut self, what: &str, result: Result<T, ApiError>) -> T {
        result.unwrap_or_else(|err| {
            if let Some(message) = degrade(what, &err) {
                self.push(Toast::error(message));
            }
            T::default()
        })
    }

    pub fn push(&mut self, toast: Toast) {
        if !self.toasts.iter().any(|t| t.message == toast.message) {
            self.toasts.push(toast);
        }
    }

    #[must_use]
    pub fn into_toasts(self) -> Vec<Toast> {
        self.toasts
    }
}

/// Answer a successful mutation.
///
/// htmx requests get `toast` plus an `HX-Trigger` naming `events`; plain
/// form posts are redirected to `back`.
#[must_use]
pub fn acknowledge(hx: HxRequest, back: &str, toast: &Toast, events: &[EventKind]) -> Response {
    if !hx.0 {
        return Redirect::to(back).into_response();
    }
    let mut response = toast_response(toast);
    if !events.is_empty() {
        response.headers_mut().insert(HX_TRIGGER, hx_trigger(events));
    }
    response
}

/// Attach `HX-Trigger` for `events` to a fragment response.
pub fn with_trigger(response: impl IntoResponse, events: &[EventKind]) -> Response {
    let mut response = response.into_response();
    if !events.is_empty() {
        response.headers_mut().insert(HX_TRIGGER, hx_trigger(events));
    }
    response
}

/// Navigate to `to`: `HX-Redirect` for htmx, a 303 otherwise.
#[must_use]
pub fn redirect(hx: HxRequest, to: &str) -> Response {
    if hx.0 {
        if let Ok(value) = HeaderValue::from_str(to) {
            return (StatusCode::OK, [(HX_REDIRECT, value)]).into_response();
        }
    }
    Redirect::to(to).into_response()
}

/// Only same-site paths are accepted as post-login destinations.
#[must_use]
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fallbacks_show_each_message_once() {
        let mut fallbacks = Fallbacks::default();
        let down = || ApiError::from_response(StatusCode::SERVICE_UNAVAILABLE, r#"{"message":"Down"}"#);
        let banners: Vec<u32> = fallbacks.take("banners", Err(down()));
        let sales: Vec<u32> = fallbacks.take("sales", Err(down()));
        assert!(banners.is_empty() && sales.is_empty());
        assert_eq!(fallbacks.into_toasts().len(), 1);
    }

    #[test]
    fn test_cancelled_fetches_stay_silent() {
        let mut fallbacks = Fallbacks::default();
        let _: Vec<u32> = fallbacks.take("banners", Err(ApiError::Cancelled));
        assert!(fallbacks.into_toasts().is_empty());
    }

    #[test]
    fn test_acknowledge_without_htmx_redirects() {
        let response = acknowledge(HxRequest(false), "/cart", &Toast::success("Added"), &[]);
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[test]
    fn test_acknowledge_with_htmx_triggers_events() {
        let response = acknowledge(
            HxRequest(true),
            "/cart",
            &Toast::success("Added"),
            &[EventKind::CartUpdated],
        );
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[HX_TRIGGER], "cartUpdated");
    }

    #[test]
    fn test_next_must_be_local() {
        assert_eq!(safe_next(Some("/checkout")), "/checkout");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(None), "/");
    }
}
