//! Coupon, banner, carousel and sale pages.
//!
//! Coupon discounts are only checked for being numbers and not negative. A
//! percentage coupon above 100 goes to the API as typed; the client logs it.

use threadline_client::{
    Banner, BannerInput, BannerResource, CarouselItem, CarouselItemInput, CarouselResource,
    Coupon, CouponInput, CouponResource, SaleInput, SaleResource, SaleStrip,
};
use threadline_core::ui::countdown::parse_end;
use threadline_core::validation::{
    ValidationError, decimal, non_negative, optional, optional_decimal, required,
};
use threadline_core::{BannerId, CarouselItemId, CouponId, CouponKind, ProductId, SaleId};

use super::resources::{FormValues, ResourcePage, optional_id};
use crate::components::{DataTableConfig, FilterOption, FormField, TableColumn};
use crate::filters::display_money;

/// Value format of `datetime-local` inputs.
const INPUT_DATETIME: &str = "%Y-%m-%dT%H:%M";

fn owned(value: Option<&str>) -> Option<String> {
    optional(value).map(str::to_string)
}

fn optional_amount(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<rust_decimal::Decimal>, ValidationError> {
    optional_decimal(field, value)?
        .map(|amount| non_negative(field, amount))
        .transpose()
}

/// Normalize a date field to RFC 3339.
fn date(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    parse_end(raw)
        .map(|at| at.to_rfc3339())
        .ok_or_else(|| ValidationError::Invalid {
            field,
            reason: "not a recognizable date".to_string(),
        })
}

/// Stored date as a `datetime-local` value; unparsable dates are shown as is.
fn input_date(raw: &str) -> String {
    parse_end(raw).map_or_else(|| raw.to_string(), |at| at.format(INPUT_DATETIME).to_string())
}

fn yes_no(on: bool) -> String {
    if on { "Yes" } else { "No" }.to_string()
}

// =============================================================================
// Coupons
// =============================================================================

fn coupon_kinds() -> Vec<FilterOption> {
    vec![
        FilterOption::new(CouponKind::Percentage.as_str(), "Percentage"),
        FilterOption::new(CouponKind::Fixed.as_str(), "Fixed amount"),
    ]
}

impl ResourcePage for CouponResource {
    const TITLE: &'static str = "Coupons";

    fn table() -> DataTableConfig {
        DataTableConfig::new("coupons-table")
            .column(TableColumn::new("code", "Code"))
            .column(TableColumn::new("type", "Type"))
            .column(TableColumn::numeric("discount", "Discount"))
            .column(TableColumn::numeric("min_order", "Min. order"))
            .column(TableColumn::new("expires", "Expires"))
            .column(TableColumn::new("active", "Active"))
            .search_placeholder("Search coupons...")
            .empty_state("No coupons yet", None)
    }

    fn id(record: &Coupon) -> CouponId {
        record.id
    }

    fn row(coupon: &Coupon) -> Vec<String> {
        let discount = match coupon.kind {
            CouponKind::Percentage => format!("{}%", coupon.discount.normalize()),
            CouponKind::Fixed => display_money(&coupon.discount.to_string()),
        };
        vec![
            coupon.code.clone(),
            coupon.kind.as_str().to_string(),
            discount,
            coupon
                .min_order_amount
                .map_or_else(|| "-".to_string(), |m| display_money(&m.to_string())),
            coupon.expires_at.clone().unwrap_or_else(|| "Never".to_string()),
            yes_no(coupon.active),
        ]
    }

    fn fields(coupon: Option<&Coupon>) -> Vec<FormField> {
        vec![
            FormField::text("code", "Code")
                .required()
                .maybe(coupon.map(|c| &c.code)),
            FormField::select("type", "Type", coupon_kinds())
                .value(coupon.map_or(CouponKind::default(), |c| c.kind).as_str()),
            FormField::number("discount", "Discount")
                .required()
                .hint("Percent for percentage coupons, dollars for fixed")
                .maybe(coupon.map(|c| c.discount)),
            FormField::number("max_discount", "Maximum discount")
                .maybe(coupon.and_then(|c| c.max_discount)),
            FormField::number("min_order_amount", "Minimum order")
                .maybe(coupon.and_then(|c| c.min_order_amount)),
            FormField::datetime("expires_at", "Expires at")
                .maybe(coupon.and_then(|c| c.expires_at.as_deref()).map(input_date)),
            FormField::checkbox("active", "Active").checked(coupon.is_none_or(|c| c.active)),
        ]
    }

    fn parse(form: &FormValues) -> Result<CouponInput, ValidationError> {
        let code = required("Code", form.get("code"))?.to_uppercase();
        let kind = CouponKind::parse(form.get("type"))
            .ok_or(ValidationError::InvalidChoice { field: "Type" })?;
        let discount = non_negative("Discount", decimal("Discount", form.get("discount"))?)?;

        Ok(CouponInput {
            code,
            kind,
            discount,
            max_discount: optional_amount("Maximum discount", form.opt("max_discount"))?,
            min_order_amount: optional_amount("Minimum order", form.opt("min_order_amount"))?,
            expires_at: form
                .opt("expires_at")
                .map(|raw| date("Expires at", raw))
                .transpose()?,
            active: form.flag("active"),
        })
    }
}

// =============================================================================
// Banners
// =============================================================================

impl ResourcePage for BannerResource {
    const TITLE: &'static str = "Banners";

    fn table() -> DataTableConfig {
        DataTableConfig::new("banners-table")
            .column(TableColumn::new("title", "Title"))
            .column(TableColumn::new("subtitle", "Subtitle"))
            .column(TableColumn::new("link", "Link"))
            .column(TableColumn::new("active", "Active"))
            .search_placeholder("Search banners...")
            .empty_state("No banners yet", Some("The home page hero stays empty until one is added."))
    }

    fn id(record: &Banner) -> BannerId {
        record.id
    }

    fn row(banner: &Banner) -> Vec<String> {
        vec![
            banner.title.clone(),
            banner.subtitle.clone().unwrap_or_default(),
            banner.link.clone().unwrap_or_default(),
            yes_no(banner.active),
        ]
    }

    fn fields(banner: Option<&Banner>) -> Vec<FormField> {
        vec![
            FormField::url("image", "Image URL")
                .required()
                .maybe(banner.map(|b| &b.image)),
            FormField::text("title", "Title")
                .required()
                .maybe(banner.map(|b| &b.title)),
            FormField::text("subtitle", "Subtitle").maybe(banner.and_then(|b| b.subtitle.as_ref())),
            FormField::url("link", "Link").maybe(banner.and_then(|b| b.link.as_ref())),
            FormField::text("button_text", "Button text")
                .maybe(banner.and_then(|b| b.button_text.as_ref())),
            FormField::checkbox("active", "Active").checked(banner.is_none_or(|b| b.active)),
        ]
    }

    fn parse(form: &FormValues) -> Result<BannerInput, ValidationError> {
        Ok(BannerInput {
            image: required("Image URL", form.get("image"))?.to_string(),
            title: required("Title", form.get("title"))?.to_string(),
            subtitle: owned(form.opt("subtitle")),
            link: owned(form.opt("link")),
            button_text: owned(form.opt("button_text")),
            active: form.flag("active"),
        })
    }
}

// =============================================================================
// Carousels
// =============================================================================

impl ResourcePage for CarouselResource {
    const TITLE: &'static str = "Carousels";

    fn table() -> DataTableConfig {
        DataTableConfig::new("carousels-table")
            .column(TableColumn::new("title", "Title"))
            .column(TableColumn::new("category", "Category"))
            .column(TableColumn::numeric("price", "Price"))
            .column(TableColumn::new("product", "Product"))
            .search_placeholder("Search carousel items...")
            .empty_state("No carousel items yet", None)
    }

    fn id(record: &CarouselItem) -> CarouselItemId {
        record.id
    }

    fn row(item: &CarouselItem) -> Vec<String> {
        vec![
            item.title.clone(),
            item.category.clone().unwrap_or_else(|| "-".to_string()),
            item.price
                .map_or_else(|| "N/A".to_string(), |p| display_money(&p.to_string())),
            item.product_id
                .map_or_else(|| "-".to_string(), |id| id.to_string()),
        ]
    }

    fn fields(item: Option<&CarouselItem>) -> Vec<FormField> {
        vec![
            FormField::url("image", "Image URL")
                .required()
                .maybe(item.map(|i| &i.image)),
            FormField::text("title", "Title")
                .required()
                .maybe(item.map(|i| &i.title)),
            FormField::textarea("description", "Description")
                .maybe(item.and_then(|i| i.description.as_ref())),
            FormField::number("price", "Price").maybe(item.and_then(|i| i.price)),
            FormField::url("link", "Link").maybe(item.and_then(|i| i.link.as_ref())),
            FormField::text("category", "Category")
                .hint("Carousel slot this item appears in")
                .maybe(item.and_then(|i| i.category.as_ref())),
            FormField::number("product_id", "Product id").maybe(item.and_then(|i| i.product_id)),
        ]
    }

    fn parse(form: &FormValues) -> Result<CarouselItemInput, ValidationError> {
        let product_id: Option<ProductId> = optional_id("Product", form.opt("product_id"))?;
        Ok(CarouselItemInput {
            image: required("Image URL", form.get("image"))?.to_string(),
            title: required("Title", form.get("title"))?.to_string(),
            description: owned(form.opt("description")),
            price: optional_amount("Price", form.opt("price"))?,
            link: owned(form.opt("link")),
            category: owned(form.opt("category")),
            product_id,
        })
    }
}

// =============================================================================
// Sales
// =============================================================================

impl ResourcePage for SaleResource {
    const TITLE: &'static str = "Sales";

    fn table() -> DataTableConfig {
        DataTableConfig::new("sales-table")
            .column(TableColumn::new("title", "Title"))
            .column(TableColumn::new("discount", "Discount"))
            .column(TableColumn::new("starts", "Starts"))
            .column(TableColumn::new("ends", "Ends"))
            .search_placeholder("Search sales...")
            .empty_state("No sales yet", Some("Sale strips count down to their end date."))
    }

    fn id(record: &SaleStrip) -> SaleId {
        record.id
    }

    fn row(sale: &SaleStrip) -> Vec<String> {
        vec![
            sale.title.clone(),
            sale.discount_text.clone().unwrap_or_default(),
            sale.start_date.clone().unwrap_or_else(|| "-".to_string()),
            sale.end_date.clone().unwrap_or_else(|| "-".to_string()),
        ]
    }

    fn fields(sale: Option<&SaleStrip>) -> Vec<FormField> {
        vec![
            FormField::text("title", "Title")
                .required()
                .maybe(sale.map(|s| &s.title)),
            FormField::textarea("description", "Description")
                .maybe(sale.and_then(|s| s.description.as_ref())),
            FormField::text("discount_text", "Discount text")
                .hint("Shown as is, e.g. \"Up to 40% off\"")
                .maybe(sale.and_then(|s| s.discount_text.as_ref())),
            FormField::url("link", "Link").maybe(sale.and_then(|s| s.link.as_ref())),
            FormField::datetime("start_date", "Starts at")
                .hint("Leave empty to start right away")
                .maybe(sale.and_then(|s| s.start_date.as_deref()).map(input_date)),
            FormField::datetime("end_date", "Ends at")
                .required()
                .maybe(sale.and_then(|s| s.end_date.as_deref()).map(input_date)),
        ]
    }

    fn parse(form: &FormValues) -> Result<SaleInput, ValidationError> {
        let title = required("Title", form.get("title"))?.to_string();
        let start_date = form
            .opt("start_date")
            .map(|raw| date("Starts at", raw))
            .transpose()?;
        let end_date = date("Ends at", required("Ends at", form.get("end_date"))?)?;
        if start_date.as_deref().and_then(parse_end) >= parse_end(&end_date) {
            return Err(ValidationError::Invalid {
                field: "Starts at",
                reason: "must be before the end".to_string(),
            });
        }
        Ok(SaleInput {
            title,
            description: owned(form.opt("description")),
            discount_text: owned(form.opt("discount_text")),
            link: owned(form.opt("link")),
            start_date,
            end_date,
        })
    }
}
