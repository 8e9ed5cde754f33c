//! Banners, carousels, sale strips, and coupon checks.

use rust_decimal::Decimal;
use tracing::instrument;

use crate::ApiClient;
use crate::error::ApiError;
use crate::types::{Banner, CarouselItem, CouponCheck, CouponCheckRequest, Listing, SaleStrip};

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_banners(&self) -> Result<Vec<Banner>, ApiError> {
        self.get::<Listing<Banner>>("banners", &[])
            .await
            .map(Listing::into_items)
    }

    /// Every carousel slide; callers group them by `category`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_carousel_items(&self) -> Result<Vec<CarouselItem>, ApiError> {
        self.get::<Listing<CarouselItem>>("carousels", &[])
            .await
            .map(Listing::into_items)
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_sales(&self) -> Result<Vec<SaleStrip>, ApiError> {
        self.get::<Listing<SaleStrip>>("sales", &[])
            .await
            .map(Listing::into_items)
    }

    /// Ask the API whether `code` applies to a cart of `subtotal`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the code is rejected.
    #[instrument(skip(self))]
    pub async fn validate_coupon(
        &self,
        code: &str,
        subtotal: Decimal,
    ) -> Result<CouponCheck, ApiError> {
        self.post("coupons/validate", &CouponCheckRequest { code, subtotal })
            .await
    }
}
