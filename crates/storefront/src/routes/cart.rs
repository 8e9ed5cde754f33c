//! Cart and checkout handlers.
//!
//! Logged-in visitors use the REST cart; guests keep theirs under
//! `cart_guest` in local storage. Both paths render the same [`CartView`]
//! and publish `CartUpdated` after every change so the header badge follows.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    response::{IntoResponse, Response},
};
use futures::future::join_all;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, instrument};

use threadline_client::{
    ApiError, CartAdd, CartItem, CouponCheck, OrderLineInput, PlaceOrder, Product, ShippingAddress,
};
use threadline_core::guest::GuestCartLine;
use threadline_core::validation::{self, optional, required};
use threadline_core::{CartItemId, ProductId};

use super::{Fallbacks, acknowledge, redirect, with_trigger};
use crate::components::{HeaderProps, Toast};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::events::EventKind;
use crate::filters;
use crate::filters::PLACEHOLDER_IMAGE;
use crate::middleware::{HxRequest, RequireLogin};
use crate::page::{Chrome, PageContext};
use crate::visitor::Visitor;

/// Payment methods offered at checkout, as (form value, label).
pub const PAYMENT_METHODS: [(&str, &str); 2] =
    [("card", "Card"), ("cash_on_delivery", "Cash on delivery")];

/// One cart line as displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineView {
    /// REST cart item id, or the line's index in the guest cart.
    pub key: String,
    pub product_id: Option<ProductId>,
    pub name: String,
    pub image: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub size: Option<String>,
    pub color: Option<String>,
}

impl CartLineView {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }

    fn from_item(item: &CartItem) -> Self {
        let product = item.product.as_ref();
        Self {
            key: item.id.to_string(),
            product_id: item.product_id(),
            name: product.map_or_else(|| "Product".to_string(), |p| p.name.clone()),
            image: product
                .and_then(Product::primary_image)
                .unwrap_or(PLACEHOLDER_IMAGE)
                .to_string(),
            unit_price: item.unit_price(),
            quantity: item.quantity(),
            size: item.size.clone(),
            color: item.color.clone(),
        }
    }

    /// A guest line, preferring live product data over the stored snapshot.
    fn from_guest(index: usize, line: &GuestCartLine, product: Option<&Product>) -> Self {
        Self {
            key: index.to_string(),
            product_id: Some(line.product_id),
            name: product
                .map(|p| p.name.clone())
                .or_else(|| line.name.clone())
                .unwrap_or_else(|| "Product".to_string()),
            image: product
                .and_then(Product::primary_image)
                .or(line.image.as_deref())
                .unwrap_or(PLACEHOLDER_IMAGE)
                .to_string(),
            unit_price: product
                .map(Product::effective_price)
                .or(line.price)
                .unwrap_or(Decimal::ZERO),
            quantity: line.quantity(),
            size: line.size.clone(),
            color: line.color.clone(),
        }
    }
}

/// The visitor's cart, whichever path it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
}

impl CartView {
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLineView::line_total).sum()
    }

    /// Total quantity; matches the header badge.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.lines
            .iter()
            .map(|l| l.quantity)
            .fold(0, u32::saturating_add)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Load the cart for `visitor`.
///
/// Guest lines whose product lookup fails fall back to the snapshot stored
/// with the line.
///
/// # Errors
///
/// Returns the API error when a logged-in visitor's cart cannot be fetched.
pub async fn load_cart(visitor: &Visitor) -> std::result::Result<CartView, ApiError> {
    if visitor.is_logged_in() {
        let items = visitor.api().get_cart().await?;
        return Ok(CartView {
            lines: items.iter().map(CartLineView::from_item).collect(),
        });
    }

    let cart = visitor.storage.guest_cart();
    let products = join_all(
        cart.lines()
            .iter()
            .map(|line| visitor.api().get_product(line.product_id)),
    )
    .await;

    let lines = cart
        .lines()
        .iter()
        .zip(products)
        .enumerate()
        .map(|(index, (line, product))| {
            let product = product
                .inspect_err(|err| debug!(error = %err, product_id = %line.product_id, "using stored cart snapshot"))
                .ok();
            CartLineView::from_guest(index, line, product.as_ref())
        })
        .collect();
    Ok(CartView { lines })
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/cart.html")]
pub struct CartTemplate {
    pub page: Chrome,
    pub cart: CartView,
}

/// Cart lines and totals fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Coupon check result fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/coupon_result.html")]
pub struct CouponResultTemplate {
    pub code: String,
    pub check: CouponCheck,
    pub subtotal: Decimal,
}

impl CouponResultTemplate {
    /// Subtotal after the coupon, never below zero.
    #[must_use]
    pub fn total(&self) -> Decimal {
        let discount = self.check.discount_amount.unwrap_or(Decimal::ZERO);
        (self.subtotal - discount).max(Decimal::ZERO)
    }
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/checkout.html")]
pub struct CheckoutTemplate {
    pub page: Chrome,
    pub cart: CartView,
    pub payment_methods: [(&'static str, &'static str); 2],
}

/// Display cart page.
#[instrument(skip(ctx))]
pub async fn show(ctx: PageContext) -> Result<CartTemplate> {
    let mut fallbacks = Fallbacks::default();
    let cart = fallbacks.take("cart", load_cart(&ctx.visitor).await);
    let page = ctx
        .chrome_with("Cart", HeaderProps::default(), fallbacks.into_toasts())
        .await?;
    Ok(CartTemplate { page, cart })
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
}

fn quantity(raw: Option<&str>) -> Result<u32> {
    let quantity = match optional(raw) {
        Some(q) => validation::whole_number("Quantity", q)?,
        None => 1,
    };
    if quantity == 0 {
        return Err(AppError::BadRequest("Quantity must be at least 1".to_string()));
    }
    Ok(quantity)
}

/// Add item to cart (HTMX).
#[instrument(skip(visitor, hx), fields(visitor = %visitor.id))]
pub async fn add(visitor: Visitor, hx: HxRequest, Form(form): Form<AddToCartForm>) -> Result<Response> {
    let quantity = quantity(form.quantity.as_deref())?;
    let size = optional(form.size.as_deref()).map(str::to_string);
    let color = optional(form.color.as_deref()).map(str::to_string);
    add_breadcrumb("cart", &format!("add product {} x{quantity}", form.product_id));

    if visitor.is_logged_in() {
        visitor
            .api()
            .add_to_cart(&CartAdd {
                product_id: form.product_id,
                quantity,
                size,
                color,
            })
            .await?;
        visitor.notify(EventKind::CartUpdated);
    } else {
        let mut line = GuestCartLine::new(form.product_id, quantity);
        line.size = size;
        line.color = color;
        if let Ok(product) = visitor.api().get_product(form.product_id).await {
            line.name = Some(product.name.clone());
            line.price = Some(product.effective_price());
            line.image = product.primary_image().map(str::to_string);
        }
        let mut cart = visitor.storage.guest_cart();
        cart.add(line);
        visitor.save_guest_cart(&cart)?;
    }

    Ok(acknowledge(
        hx,
        "/cart",
        &Toast::success("Added to cart"),
        &[EventKind::CartUpdated],
    ))
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub key: String,
    pub quantity: String,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub key: String,
}

fn item_id(key: &str) -> Result<CartItemId> {
    key.trim()
        .parse::<i64>()
        .map(CartItemId::new)
        .map_err(|_| AppError::BadRequest("Unknown cart line".to_string()))
}

fn guest_index(key: &str) -> Result<usize> {
    key.trim()
        .parse::<usize>()
        .map_err(|_| AppError::BadRequest("Unknown cart line".to_string()))
}

/// Set a line's quantity; zero removes it.
async fn set_quantity(visitor: &Visitor, key: &str, quantity: u32) -> Result<()> {
    if visitor.is_logged_in() {
        let id = item_id(key)?;
        if quantity == 0 {
            visitor.api().remove_cart_item(id).await?;
        } else {
            visitor.api().update_cart_item(id, quantity).await?;
        }
        visitor.notify(EventKind::CartUpdated);
        return Ok(());
    }

    let mut cart = visitor.storage.guest_cart();
    if !cart.set_quantity(guest_index(key)?, quantity) {
        return Err(AppError::NotFound("Cart line".to_string()));
    }
    visitor.save_guest_cart(&cart)?;
    Ok(())
}

async fn cart_fragment(visitor: &Visitor) -> Result<Response> {
    let cart = load_cart(visitor).await?;
    Ok(with_trigger(CartItemsTemplate { cart }, &[EventKind::CartUpdated]))
}

/// Update item quantity (HTMX).
#[instrument(skip(visitor), fields(visitor = %visitor.id))]
pub async fn update(visitor: Visitor, Form(form): Form<UpdateCartForm>) -> Result<Response> {
    let quantity = validation::whole_number("Quantity", &form.quantity)?;
    set_quantity(&visitor, &form.key, quantity).await?;
    cart_fragment(&visitor).await
}

/// Remove item from cart (HTMX).
#[instrument(skip(visitor), fields(visitor = %visitor.id))]
pub async fn remove(visitor: Visitor, Form(form): Form<RemoveFromCartForm>) -> Result<Response> {
    set_quantity(&visitor, &form.key, 0).await?;
    cart_fragment(&visitor).await
}

#[derive(Debug, Deserialize)]
pub struct CouponForm {
    pub code: String,
}

/// Check a coupon against the current subtotal (HTMX).
#[instrument(skip(visitor), fields(visitor = %visitor.id))]
pub async fn coupon(visitor: Visitor, Form(form): Form<CouponForm>) -> Result<CouponResultTemplate> {
    let code = required("Coupon code", &form.code)?.to_string();
    let subtotal = load_cart(&visitor).await?.subtotal();
    let check = visitor.api().validate_coupon(&code, subtotal).await?;
    Ok(CouponResultTemplate {
        code,
        check,
        subtotal,
    })
}

/// Display the checkout form.
#[instrument(skip_all)]
pub async fn checkout_page(RequireLogin(visitor): RequireLogin, ctx: PageContext) -> Result<Response> {
    let cart = load_cart(&visitor).await?;
    if cart.is_empty() {
        return Ok(axum::response::Redirect::to("/cart").into_response());
    }
    let page = ctx.chrome("Checkout").await?;
    Ok(CheckoutTemplate {
        page,
        cart,
        payment_methods: PAYMENT_METHODS,
    }
    .into_response())
}

/// Checkout form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
    pub coupon_code: Option<String>,
    pub payment_method: String,
}

impl CheckoutForm {
    fn shipping_address(&self) -> Result<ShippingAddress> {
        Ok(ShippingAddress {
            full_name: required("Full name", &self.full_name)?.to_string(),
            address: required("Address", &self.address)?.to_string(),
            city: required("City", &self.city)?.to_string(),
            postal_code: required("Postal code", &self.postal_code)?.to_string(),
            country: required("Country", &self.country)?.to_string(),
            phone: required("Phone", &self.phone)?.to_string(),
        })
    }

    fn payment_method(&self) -> Result<String> {
        let method = required("Payment method", &self.payment_method)?;
        if PAYMENT_METHODS.iter().any(|&(value, _)| value == method) {
            Ok(method.to_string())
        } else {
            Err(validation::ValidationError::InvalidChoice {
                field: "Payment method",
            }
            .into())
        }
    }
}

/// Place the order from the server cart.
#[instrument(skip_all, fields(visitor = %visitor.id))]
pub async fn checkout(
    RequireLogin(visitor): RequireLogin,
    hx: HxRequest,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let shipping_address = form.shipping_address()?;
    let payment_method = form.payment_method()?;

    let items: Vec<OrderLineInput> = visitor
        .api()
        .get_cart()
        .await?
        .iter()
        .filter_map(|item| {
            Some(OrderLineInput {
                product_id: item.product_id()?,
                quantity: item.quantity(),
                size: item.size.clone(),
                color: item.color.clone(),
            })
        })
        .collect();
    if items.is_empty() {
        return Err(AppError::BadRequest("Your cart is empty".to_string()));
    }

    let order = visitor
        .api()
        .place_order(&PlaceOrder {
            items,
            shipping_address,
            coupon_code: optional(form.coupon_code.as_deref()).map(str::to_string),
            payment_method,
        })
        .await?;
    tracing::info!(order_id = %order.id, total = %order.total, "order placed");
    add_breadcrumb("checkout", &format!("order {} placed", order.id));
    visitor.notify(EventKind::CartUpdated);

    Ok(redirect(hx, "/account/orders"))
}
