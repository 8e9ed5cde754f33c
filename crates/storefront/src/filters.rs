//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;
use std::str::FromStr;

use rust_decimal::Decimal;
use threadline_core::Price;

/// Image shown when a product or banner has none.
pub const PLACEHOLDER_IMAGE: &str = "/static/images/placeholder.svg";

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Content hash of main.css, computed at build time.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

/// Content hash of app.js, computed at build time.
#[askama::filter_fn]
pub fn js_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("JS_HASH"))
}

/// Format a decimal amount as dollars: `{{ product.price|money }}` gives `$19.90`.
///
/// Anything that is not a number renders as `N/A`.
#[askama::filter_fn]
pub fn money(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(Decimal::from_str(&value.to_string())
        .map_or_else(|_| "N/A".to_string(), |amount| Price::usd(amount).display()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use askama::Template;
    use rust_decimal::Decimal;

    use crate::filters;

    #[derive(Template)]
    #[template(source = "{{ amount|money }}", ext = "txt")]
    struct Amount {
        amount: Decimal,
    }

    #[derive(Template)]
    #[template(source = "{{ amount|money }}", ext = "txt")]
    struct Missing {
        amount: &'static str,
    }

    #[test]
    fn test_money_rounds_to_cents() {
        let rendered = Amount {
            amount: Decimal::new(199, 1),
        }
        .render()
        .unwrap();
        assert_eq!(rendered, "$19.90");
    }

    #[test]
    fn test_money_placeholder() {
        assert_eq!(Missing { amount: "" }.render().unwrap(), "N/A");
    }
}
