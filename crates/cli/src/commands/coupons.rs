//! Coupon management through the admin endpoints.
//!
//! Discounts go out exactly as typed. A percentage above 100 is logged by the
//! client and left for the API to accept or refuse.

use std::io::Write;

use rust_decimal::Decimal;

use threadline_client::{ApiClient, Coupon, CouponInput, CouponResource};
use threadline_core::validation::{ValidationError, non_negative, required};
use threadline_core::{CouponId, CouponKind, Price};

use super::CliError;

/// Arguments for `coupons create`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCoupon {
    pub code: String,
    pub kind: String,
    pub discount: Decimal,
    pub max_discount: Option<Decimal>,
    pub min_order_amount: Option<Decimal>,
    pub expires_at: Option<String>,
    pub inactive: bool,
}

impl NewCoupon {
    /// Validate into the request body.
    ///
    /// # Errors
    ///
    /// Returns an error for a blank code, an unknown type, or a negative amount.
    pub fn into_input(self) -> Result<CouponInput, ValidationError> {
        let code = required("Code", &self.code)?.to_uppercase();
        let kind = CouponKind::parse(self.kind.trim())
            .ok_or(ValidationError::InvalidChoice { field: "Type" })?;
        Ok(CouponInput {
            code,
            kind,
            discount: non_negative("Discount", self.discount)?,
            max_discount: self
                .max_discount
                .map(|value| non_negative("Max discount", value))
                .transpose()?,
            min_order_amount: self
                .min_order_amount
                .map(|value| non_negative("Minimum order", value))
                .transpose()?,
            expires_at: self.expires_at.filter(|at| !at.trim().is_empty()),
            active: !self.inactive,
        })
    }
}

fn amount(kind: CouponKind, value: Decimal) -> String {
    match kind {
        CouponKind::Percentage => format!("{}%", value.normalize()),
        CouponKind::Fixed => Price::usd(value).display(),
    }
}

fn coupon_line(coupon: &Coupon) -> String {
    let mut line = format!(
        "{:>6}  {:<16}  {:<10}  {}",
        coupon.id.to_string(),
        coupon.code,
        coupon.kind.as_str(),
        amount(coupon.kind, coupon.discount)
    );
    if let Some(max) = coupon.max_discount {
        line.push_str(&format!("  max {}", Price::usd(max).display()));
    }
    if let Some(expires) = &coupon.expires_at {
        line.push_str(&format!("  until {expires}"));
    }
    if !coupon.active {
        line.push_str("  [inactive]");
    }
    line
}

/// Print every coupon, optionally filtered by code.
///
/// # Errors
///
/// Returns an error if the request fails or output cannot be written.
pub async fn list(api: &ApiClient, search: Option<&str>, out: &mut impl Write) -> Result<(), CliError> {
    let coupons = api.admin_list::<CouponResource>(search).await?;
    if coupons.is_empty() {
        writeln!(out, "No coupons")?;
    }
    for coupon in &coupons {
        writeln!(out, "{}", coupon_line(coupon))?;
    }
    Ok(())
}

/// Create a coupon.
///
/// # Errors
///
/// Returns an error if validation fails, the API refuses the coupon, or
/// output cannot be written.
pub async fn create(api: &ApiClient, coupon: NewCoupon, out: &mut impl Write) -> Result<(), CliError> {
    let input = coupon.into_input()?;
    api.admin_create::<CouponResource>(&input).await?;
    tracing::info!(code = %input.code, "coupon created");
    writeln!(
        out,
        "Created {} ({} off)",
        input.code,
        amount(input.kind, input.discount)
    )?;
    Ok(())
}

/// Delete a coupon by id.
///
/// # Errors
///
/// Returns an error if the request fails or output cannot be written.
pub async fn delete(api: &ApiClient, id: CouponId, out: &mut impl Write) -> Result<(), CliError> {
    api.admin_delete::<CouponResource>(id).await?;
    tracing::info!(coupon_id = %id, "coupon deleted");
    writeln!(out, "Deleted coupon {id}")?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn new_coupon(discount: i64) -> NewCoupon {
        NewCoupon {
            code: "big150".to_string(),
            kind: "percentage".to_string(),
            discount: Decimal::from(discount),
            max_discount: None,
            min_order_amount: None,
            expires_at: None,
            inactive: false,
        }
    }

    fn admin(server: &MockServer) -> ApiClient {
        ApiClient::new(&format!("{}/api", server.uri()))
            .unwrap()
            .authorized(SecretString::from("ops-token"))
    }

    #[tokio::test]
    async fn test_percentage_above_100_is_sent_unchanged() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/admin/coupons"))
            .and(header("authorization", "Bearer ops-token"))
            .and(body_json(json!({
                "code": "BIG150",
                "type": "percentage",
                "discount": 150.0,
                "active": true
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"_id": 3})))
            .expect(1)
            .mount(&server)
            .await;

        let mut out = Vec::new();
        create(&admin(&server), new_coupon(150), &mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Created BIG150 (150% off)\n");
    }

    #[test]
    fn test_validation_rejects_before_sending() {
        assert_eq!(
            new_coupon(-1).into_input(),
            Err(ValidationError::Negative { field: "Discount" })
        );

        let unknown = NewCoupon {
            kind: "bogo".to_string(),
            ..new_coupon(10)
        };
        assert_eq!(
            unknown.into_input(),
            Err(ValidationError::InvalidChoice { field: "Type" })
        );
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/coupons"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"_id": 3, "code": "SPRING", "type": "percentage", "discount": 15, "active": false},
                {"_id": 4, "code": "TENOFF", "type": "fixed", "discount": 10, "maxDiscount": 10}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/admin/coupons/3"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let api = admin(&server);
        let mut out = Vec::new();
        list(&api, None, &mut out).await.unwrap();
        delete(&api, CouponId::new(3), &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("SPRING"));
        assert!(text.contains("15%  [inactive]"));
        assert!(text.contains("$10.00  max $10.00"));
        assert!(text.ends_with("Deleted coupon 3\n"));
    }
}
