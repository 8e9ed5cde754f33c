//! Admin back-office endpoints.
//!
//! The six catalog and marketing resources share one CRUD shape under
//! `/admin/{path}`, so they are driven through [`AdminResource`]. Inventory,
//! orders, and product content have their own endpoints below.

use std::fmt::{Debug, Display};

use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::{instrument, warn};

use threadline_core::{
    BannerId, CarouselItemId, CategoryId, ContentBlockId, CouponId, CouponKind, OrderId,
    OrderStatus, ProductId, SaleId,
};

use crate::ApiClient;
use crate::error::ApiError;
use crate::types::{
    Banner, BannerInput, CarouselItem, CarouselItemInput, Category, CategoryInput, ContentBlock,
    ContentBlockInput, Coupon, CouponInput, InventoryItem, Listing, Order, OrderStatusUpdate,
    Product, ProductInput, SaleInput, SaleStrip, StockUpdate,
};

/// A resource with list/create/update/delete under `/admin/{PATH}`.
pub trait AdminResource: Send + Sync + 'static {
    /// Path segment under `/admin`.
    const PATH: &'static str;
    /// Singular noun used in toasts, e.g. "coupon".
    const NOUN: &'static str;

    type Id: Debug + Display + Copy + Send + Sync;
    type Record: DeserializeOwned + Send;
    type Input: Serialize + Send + Sync;

    /// Observe an outgoing body before it is sent.
    fn inspect(_input: &Self::Input) {}
}

pub struct ProductResource;
pub struct CategoryResource;
pub struct CouponResource;
pub struct BannerResource;
pub struct CarouselResource;
pub struct SaleResource;

impl AdminResource for ProductResource {
    const PATH: &'static str = "products";
    const NOUN: &'static str = "product";
    type Id = ProductId;
    type Record = Product;
    type Input = ProductInput;
}

impl AdminResource for CategoryResource {
    const PATH: &'static str = "categories";
    const NOUN: &'static str = "category";
    type Id = CategoryId;
    type Record = Category;
    type Input = CategoryInput;
}

impl AdminResource for CouponResource {
    const PATH: &'static str = "coupons";
    const NOUN: &'static str = "coupon";
    type Id = CouponId;
    type Record = Coupon;
    type Input = CouponInput;

    fn inspect(input: &CouponInput) {
        // Forwarded unchanged; the API decides whether to reject it.
        if input.kind == CouponKind::Percentage && input.discount > Decimal::ONE_HUNDRED {
            warn!(
                code = %input.code,
                discount = %input.discount,
                "percentage coupon above 100 sent to API"
            );
        }
    }
}

impl AdminResource for BannerResource {
    const PATH: &'static str = "banners";
    const NOUN: &'static str = "banner";
    type Id = BannerId;
    type Record = Banner;
    type Input = BannerInput;
}

impl AdminResource for CarouselResource {
    const PATH: &'static str = "carousels";
    const NOUN: &'static str = "carousel item";
    type Id = CarouselItemId;
    type Record = CarouselItem;
    type Input = CarouselItemInput;
}

impl AdminResource for SaleResource {
    const PATH: &'static str = "sales";
    const NOUN: &'static str = "sale";
    type Id = SaleId;
    type Record = SaleStrip;
    type Input = SaleInput;
}

fn search_pairs(search: Option<&str>) -> Vec<(&'static str, String)> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| vec![("search", s.to_string())])
        .unwrap_or_default()
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(resource = R::PATH))]
    pub async fn admin_list<R: AdminResource>(
        &self,
        search: Option<&str>,
    ) -> Result<Vec<R::Record>, ApiError> {
        self.get::<Listing<R::Record>>(&format!("admin/{}", R::PATH), &search_pairs(search))
            .await
            .map(Listing::into_items)
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects the body.
    #[instrument(skip(self, input), fields(resource = R::PATH))]
    pub async fn admin_create<R: AdminResource>(&self, input: &R::Input) -> Result<(), ApiError> {
        R::inspect(input);
        self.post::<IgnoredAny, _>(&format!("admin/{}", R::PATH), input)
            .await
            .map(|_| ())
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects the body.
    #[instrument(skip(self, input), fields(resource = R::PATH))]
    pub async fn admin_update<R: AdminResource>(
        &self,
        id: R::Id,
        input: &R::Input,
    ) -> Result<(), ApiError> {
        R::inspect(input);
        self.put::<IgnoredAny, _>(&format!("admin/{}/{id}", R::PATH), input)
            .await
            .map(|_| ())
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(resource = R::PATH))]
    pub async fn admin_delete<R: AdminResource>(&self, id: R::Id) -> Result<(), ApiError> {
        self.delete(&format!("admin/{}/{id}", R::PATH)).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn admin_inventory(
        &self,
        search: Option<&str>,
    ) -> Result<Vec<InventoryItem>, ApiError> {
        self.get::<Listing<InventoryItem>>("admin/inventory", &search_pairs(search))
            .await
            .map(Listing::into_items)
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %product))]
    pub async fn admin_set_stock(&self, product: ProductId, stock: u32) -> Result<(), ApiError> {
        self.put::<IgnoredAny, _>(
            &format!("admin/inventory/{product}"),
            &StockUpdate { stock },
        )
        .await
        .map(|_| ())
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn admin_orders(
        &self,
        search: Option<&str>,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, ApiError> {
        let mut query = search_pairs(search);
        if let Some(status) = status {
            query.push(("status", status.as_str().to_string()));
        }
        self.get::<Listing<Order>>("admin/orders", &query)
            .await
            .map(Listing::into_items)
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(order_id = %order))]
    pub async fn admin_update_order_status(
        &self,
        order: OrderId,
        status: OrderStatus,
    ) -> Result<(), ApiError> {
        self.put::<IgnoredAny, _>(
            &format!("admin/orders/{order}/status"),
            &OrderStatusUpdate { status },
        )
        .await
        .map(|_| ())
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %product))]
    pub async fn admin_product_content(
        &self,
        product: ProductId,
    ) -> Result<Vec<ContentBlock>, ApiError> {
        self.get::<Listing<ContentBlock>>(&format!("admin/products/{product}/content"), &[])
            .await
            .map(Listing::into_items)
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, block), fields(product_id = %product))]
    pub async fn admin_add_content_block(
        &self,
        product: ProductId,
        block: &ContentBlockInput,
    ) -> Result<(), ApiError> {
        self.post::<IgnoredAny, _>(&format!("admin/products/{product}/content"), block)
            .await
            .map(|_| ())
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %product, block_id = %block))]
    pub async fn admin_delete_content_block(
        &self,
        product: ProductId,
        block: ContentBlockId,
    ) -> Result<(), ApiError> {
        self.delete(&format!("admin/products/{product}/content/{block}"))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn admin_client(server: &MockServer) -> ApiClient {
        ApiClient::new(&format!("{}/api", server.uri()))
            .unwrap()
            .authorized(SecretString::from("admin-token".to_string()))
    }

    #[tokio::test]
    async fn test_list_passes_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/categories"))
            .and(query_param("search", "denim"))
            .and(header("authorization", "Bearer admin-token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"_id": 4, "name": "Denim"}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = admin_client(&server).await;
        let categories = client
            .admin_list::<CategoryResource>(Some(" denim "))
            .await
            .unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Denim");
    }

    #[tokio::test]
    async fn test_coupon_over_one_hundred_is_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/admin/coupons"))
            .and(body_json(json!({
                "code": "HUGE",
                "type": "percentage",
                "discount": 150.0,
                "active": true
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let input = CouponInput {
            code: "HUGE".to_string(),
            kind: CouponKind::Percentage,
            discount: Decimal::new(150, 0),
            max_discount: None,
            min_order_amount: None,
            expires_at: None,
            active: true,
        };
        admin_client(&server)
            .await
            .admin_create::<CouponResource>(&input)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_and_delete_paths() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/admin/sales/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/admin/products/3/content/12"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = admin_client(&server).await;
        let sale = SaleInput {
            title: "Winter".to_string(),
            description: None,
            discount_text: Some("40% OFF".to_string()),
            link: None,
            start_date: None,
            end_date: "2031-01-01T00:00:00Z".to_string(),
        };
        client
            .admin_update::<SaleResource>(SaleId::new(7), &sale)
            .await
            .unwrap();
        client
            .admin_delete_content_block(ProductId::new(3), ContentBlockId::new(12))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_order_status_filter_and_update() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/orders"))
            .and(query_param("status", "shipped"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "orders": [{"_id": 9, "total": 120.5, "status": "shipped"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/admin/orders/9/status"))
            .and(body_json(json!({"status": "delivered"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = admin_client(&server).await;
        let orders = client
            .admin_orders(None, Some(OrderStatus::Shipped))
            .await
            .unwrap();
        assert_eq!(orders[0].status, OrderStatus::Shipped);
        client
            .admin_update_order_status(OrderId::new(9), OrderStatus::Delivered)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rejected_create_surfaces_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/admin/banners"))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(json!({"message": "Image is required"})),
            )
            .mount(&server)
            .await;

        let input = BannerInput {
            image: String::new(),
            title: "Spring".to_string(),
            subtitle: None,
            link: None,
            button_text: None,
            active: true,
        };
        let err = admin_client(&server)
            .await
            .admin_create::<BannerResource>(&input)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Image is required");
    }
}
