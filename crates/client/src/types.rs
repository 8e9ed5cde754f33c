//! Wire types for the Threadline REST API.
//!
//! The API speaks camelCase JSON. Records may carry their id as `id` or `_id`,
//! and list endpoints answer either with a bare array or with an object
//! wrapping one; [`Listing`] accepts both.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use threadline_core::ui::Timed;
use threadline_core::ui::countdown::parse_end;
use threadline_core::{
    BannerId, CarouselItemId, CartItemId, CategoryId, ContentBlockId, CouponId, CouponKind,
    OrderId, OrderStatus, ProductId, SaleId, UserId,
};

// =============================================================================
// Listings
// =============================================================================

/// A list response, whatever envelope the endpoint used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    /// Total matching records when the endpoint paginates.
    pub total: Option<u64>,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: None,
        }
    }
}

impl<T> Listing<T> {
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListingRepr<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(
            alias = "data",
            alias = "results",
            alias = "products",
            alias = "categories",
            alias = "orders",
            alias = "coupons",
            alias = "banners",
            alias = "sales",
            alias = "blocks"
        )]
        items: Vec<T>,
        #[serde(default, alias = "count")]
        total: Option<u64>,
    },
    Null(()),
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Listing<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match ListingRepr::deserialize(deserializer)? {
            ListingRepr::Bare(items) => Self { items, total: None },
            ListingRepr::Wrapped { items, total } => Self { items, total },
            ListingRepr::Null(()) => Self::default(),
        })
    }
}

// =============================================================================
// Auth
// =============================================================================

/// Response to a successful login or registration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, alias = "_id")]
    pub id: Option<UserId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub sale_price: Option<Decimal>,
    /// Percentage off list price, 0 to 100.
    #[serde(default)]
    pub discount: Option<Decimal>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
}

impl Product {
    /// Price a shopper pays: an explicit sale price below list wins, then a
    /// percentage discount, then list price.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        match (self.sale_price, self.discount) {
            (Some(sale), _) if sale < self.price => sale,
            (_, Some(pct)) if pct > Decimal::ZERO && pct <= Decimal::ONE_HUNDRED => {
                (self.price * (Decimal::ONE_HUNDRED - pct) / Decimal::ONE_HUNDRED).round_dp(2)
            }
            _ => self.price,
        }
    }

    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.effective_price() < self.price
    }

    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.stock.is_none_or(|s| s > 0)
    }
}

/// Body for creating or updating a product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub sale_price: Option<Decimal>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub discount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub stock: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(alias = "_id")]
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CategoryId>,
}

/// A rich-text block shown on a product detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlock {
    #[serde(alias = "_id")]
    pub id: ContentBlockId,
    #[serde(alias = "title")]
    pub heading: String,
    #[serde(default, alias = "content")]
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentBlockInput {
    pub heading: String,
    pub body: String,
}

// =============================================================================
// Marketing
// =============================================================================

/// Hero banner slide.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    #[serde(alias = "_id")]
    pub id: BannerId,
    #[serde(alias = "imageUrl")]
    pub image: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub button_text: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerInput {
    pub image: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_text: Option<String>,
    pub active: bool,
}

/// A slide in one of the per-category product carousels.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselItem {
    #[serde(alias = "_id")]
    pub id: CarouselItemId,
    #[serde(alias = "imageUrl")]
    pub image: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub product_id: Option<ProductId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselItemInput {
    pub image: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
}

/// Time-boxed promotional strip with a countdown.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleStrip {
    #[serde(alias = "_id")]
    pub id: SaleId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Free-form offer text, e.g. "30% OFF".
    #[serde(default)]
    pub discount_text: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    /// Absent or unparsable means the sale is already running.
    #[serde(default)]
    pub start_date: Option<String>,
    /// Kept raw; a malformed value leaves the countdown unknown.
    #[serde(default)]
    pub end_date: Option<String>,
}

impl Timed for SaleStrip {
    fn ends_at(&self) -> Option<DateTime<Utc>> {
        self.end_date.as_deref().and_then(parse_end)
    }

    fn starts_at(&self) -> Option<DateTime<Utc>> {
        self.start_date.as_deref().and_then(parse_end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleInput {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    #[serde(alias = "_id")]
    pub id: CouponId,
    pub code: String,
    #[serde(rename = "type", default)]
    pub kind: CouponKind,
    pub discount: Decimal,
    #[serde(default)]
    pub max_discount: Option<Decimal>,
    #[serde(default)]
    pub min_order_amount: Option<Decimal>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

/// Body for creating or updating a coupon.
///
/// `discount` is sent as entered. The API owns any range rules beyond
/// non-negativity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponInput {
    pub code: String,
    #[serde(rename = "type")]
    pub kind: CouponKind,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub discount: Decimal,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub max_discount: Option<Decimal>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub min_order_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponCheckRequest<'a> {
    pub code: &'a str,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub subtotal: Decimal,
}

/// Result of validating a coupon against a cart subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponCheck {
    #[serde(default)]
    pub valid: bool,
    #[serde(default, alias = "discount")]
    pub discount_amount: Option<Decimal>,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Cart, compare, orders
// =============================================================================

/// A line in an authenticated visitor's server-side cart.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(alias = "_id")]
    pub id: CartItemId,
    #[serde(default)]
    pub product: Option<Product>,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    /// Missing quantities count as 1.
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl CartItem {
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity.unwrap_or(1)
    }

    #[must_use]
    pub fn product_id(&self) -> Option<ProductId> {
        self.product_id.or_else(|| self.product.as_ref().map(|p| p.id))
    }

    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.product
            .as_ref()
            .map_or(Decimal::ZERO, Product::effective_price)
    }
}

/// Sum of quantities across cart lines.
#[must_use]
pub fn cart_quantity(items: &[CartItem]) -> u32 {
    items
        .iter()
        .map(CartItem::quantity)
        .fold(0, u32::saturating_add)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartAdd {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineInput {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrder {
    pub items: Vec<OrderLineInput>,
    pub shipping_address: ShippingAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    pub payment_method: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(alias = "_id")]
    pub id: OrderId,
    #[serde(default, alias = "orderItems")]
    pub items: Vec<OrderLine>,
    #[serde(alias = "totalPrice")]
    pub total: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub price: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

/// Stock level for one product.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    #[serde(alias = "_id", alias = "id")]
    pub product_id: ProductId,
    #[serde(alias = "productName")]
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    pub stock: u32,
    #[serde(default)]
    pub low_stock_threshold: Option<u32>,
}

impl InventoryItem {
    /// Below the item's threshold, or out entirely when no threshold is set.
    #[must_use]
    pub fn is_low(&self) -> bool {
        self.low_stock_threshold
            .map_or(self.stock == 0, |threshold| self.stock <= threshold)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StockUpdate {
    pub stock: u32,
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_accepts_bare_array() {
        let listing: Listing<Category> =
            serde_json::from_str(r#"[{"id": 1, "name": "Shirts"}, {"_id": 2, "name": "Denim"}]"#)
                .unwrap();
        assert_eq!(listing.items.len(), 2);
        assert_eq!(listing.items[1].id, CategoryId::new(2));
        assert_eq!(listing.total, None);
    }

    #[test]
    fn test_listing_accepts_wrapped_object() {
        let listing: Listing<Category> = serde_json::from_str(
            r#"{"products": [{"id": 3, "name": "Knitwear"}], "total": 40}"#,
        )
        .unwrap();
        assert_eq!(listing.items.len(), 1);
        assert_eq!(listing.total, Some(40));
    }

    #[test]
    fn test_listing_accepts_null() {
        let listing: Listing<Category> = serde_json::from_str("null").unwrap();
        assert!(listing.items.is_empty());
    }

    #[test]
    fn test_product_effective_price() {
        let product: Product = serde_json::from_str(
            r#"{"_id": 9, "name": "Linen Shirt", "price": 59.0, "salePrice": 39.5}"#,
        )
        .unwrap();
        assert!(product.is_on_sale());
        assert_eq!(product.effective_price(), Decimal::new(395, 1));
        assert!(product.in_stock());
        assert_eq!(product.primary_image(), None);

        let discounted: Product =
            serde_json::from_str(r#"{"id": 10, "name": "Chinos", "price": 80, "discount": 25}"#)
                .unwrap();
        assert_eq!(discounted.effective_price(), Decimal::new(60, 0));
    }

    #[test]
    fn test_cart_quantity_defaults_to_one() {
        let items: Vec<CartItem> = serde_json::from_str(
            r#"[{"id": 1, "quantity": 2}, {"id": 2}, {"_id": 3, "quantity": 4}]"#,
        )
        .unwrap();
        assert_eq!(cart_quantity(&items), 7);
    }

    #[test]
    fn test_coupon_input_sends_discount_unchanged() {
        let input = CouponInput {
            code: "WELCOME".to_string(),
            kind: CouponKind::Percentage,
            discount: Decimal::new(150, 0),
            max_discount: None,
            min_order_amount: None,
            expires_at: None,
            active: true,
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["discount"], 150.0);
        assert_eq!(json["type"], "percentage");
        assert!(json.get("maxDiscount").is_none());
    }

    #[test]
    fn test_sale_strip_end_date() {
        let strip: SaleStrip = serde_json::from_str(
            r#"{"id": 1, "title": "Summer", "endDate": "2030-06-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert!(strip.ends_at().is_some());

        let broken: SaleStrip =
            serde_json::from_str(r#"{"id": 2, "title": "Oops", "endDate": "soon"}"#).unwrap();
        assert!(broken.ends_at().is_none());
    }

    #[test]
    fn test_sale_not_started_waits_outside_rotation() {
        use chrono::TimeZone;
        use threadline_core::ui::ActiveSales;

        let strip: SaleStrip = serde_json::from_str(
            r#"{"_id": 1, "title": "Winter", "startDate": "2030-01-01T00:00:00Z", "endDate": "2030-02-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(strip.start_date.as_deref(), Some("2030-01-01T00:00:00Z"));

        let today = Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap();
        let mut sales = ActiveSales::new(vec![strip], today);
        assert!(sales.is_empty());
        assert_eq!(sales.upcoming().len(), 1);

        let opening = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        sales.prune(opening);
        assert_eq!(sales.len(), 1);
    }

    #[test]
    fn test_inventory_low_stock() {
        let item: InventoryItem = serde_json::from_str(
            r#"{"productId": 1, "name": "Tee", "stock": 3, "lowStockThreshold": 5}"#,
        )
        .unwrap();
        assert!(item.is_low());

        let item: InventoryItem =
            serde_json::from_str(r#"{"productId": 1, "name": "Tee", "stock": 3}"#).unwrap();
        assert!(!item.is_low());
    }
}
