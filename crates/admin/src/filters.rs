//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;
use std::str::FromStr;

use rust_decimal::Decimal;
use threadline_core::Price;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Format a decimal amount as dollars; anything else renders as `N/A`.
#[askama::filter_fn]
pub fn money(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(display_money(&value.to_string()))
}

/// Dollar display shared by the filter and table cells.
#[must_use]
pub fn display_money(raw: &str) -> String {
    Decimal::from_str(raw.trim())
        .map_or_else(|_| "N/A".to_string(), |amount| Price::usd(amount).display())
}
