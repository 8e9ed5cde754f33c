//! Form field checks run before any request is sent.
//!
//! Validation is deliberately shallow: required fields must be present and a
//! handful of numeric fields must fall in range. Anything deeper is the REST
//! API's job.

use rust_decimal::Decimal;
use thiserror::Error;

/// A single failed field check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be a number")]
    NotANumber { field: &'static str },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: Decimal,
        max: Decimal,
    },

    #[error("{field} cannot be negative")]
    Negative { field: &'static str },

    #[error("{field} is not a valid choice")]
    InvalidChoice { field: &'static str },

    #[error("{field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

/// Result alias for field checks.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Require a non-blank string, returning it trimmed.
///
/// # Errors
///
/// Returns [`ValidationError::Required`] when the value is empty after trimming.
pub fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Required { field })
    } else {
        Ok(trimmed)
    }
}

/// Treat blank strings as absent.
#[must_use]
pub fn optional(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parse a required decimal field.
///
/// # Errors
///
/// Returns [`ValidationError::Required`] when blank and
/// [`ValidationError::NotANumber`] when it does not parse.
pub fn decimal(field: &'static str, value: &str) -> Result<Decimal> {
    required(field, value)?
        .parse::<Decimal>()
        .map_err(|_| ValidationError::NotANumber { field })
}

/// Parse an optional decimal field; blank means `None`.
///
/// # Errors
///
/// Returns [`ValidationError::NotANumber`] when present but unparsable.
pub fn optional_decimal(field: &'static str, value: Option<&str>) -> Result<Option<Decimal>> {
    optional(value)
        .map(|v| {
            v.parse::<Decimal>()
                .map_err(|_| ValidationError::NotANumber { field })
        })
        .transpose()
}

/// Parse a required whole number.
///
/// # Errors
///
/// Returns [`ValidationError::Required`] when blank and
/// [`ValidationError::NotANumber`] when it is not a non-negative integer.
pub fn whole_number(field: &'static str, value: &str) -> Result<u32> {
    required(field, value)?
        .parse::<u32>()
        .map_err(|_| ValidationError::NotANumber { field })
}

/// Require `value >= 0`.
///
/// # Errors
///
/// Returns [`ValidationError::Negative`] for negative values.
pub fn non_negative(field: &'static str, value: Decimal) -> Result<Decimal> {
    if value.is_sign_negative() && !value.is_zero() {
        Err(ValidationError::Negative { field })
    } else {
        Ok(value)
    }
}

/// Require `min <= value <= max`.
///
/// # Errors
///
/// Returns [`ValidationError::OutOfRange`] outside the inclusive range.
pub fn in_range(field: &'static str, value: Decimal, min: Decimal, max: Decimal) -> Result<Decimal> {
    if value < min || value > max {
        Err(ValidationError::OutOfRange { field, min, max })
    } else {
        Ok(value)
    }
}

/// Require a percentage in `0..=100`.
///
/// # Errors
///
/// Returns [`ValidationError::OutOfRange`] outside the range.
pub fn percentage(field: &'static str, value: Decimal) -> Result<Decimal> {
    in_range(field, value, Decimal::ZERO, Decimal::ONE_HUNDRED)
}

/// Split a comma-separated list into trimmed, non-empty entries.
#[must_use]
pub fn comma_list(value: Option<&str>) -> Vec<String> {
    optional(value)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims() {
        assert_eq!(required("name", "  Linen Shirt ").unwrap(), "Linen Shirt");
        assert_eq!(
            required("name", "   "),
            Err(ValidationError::Required { field: "name" })
        );
    }

    #[test]
    fn test_decimal_parsing() {
        assert_eq!(decimal("price", "19.99").unwrap(), Decimal::new(1999, 2));
        assert_eq!(
            decimal("price", "cheap"),
            Err(ValidationError::NotANumber { field: "price" })
        );
        assert_eq!(optional_decimal("max", Some("  ")).unwrap(), None);
        assert_eq!(
            optional_decimal("max", Some("25")).unwrap(),
            Some(Decimal::new(25, 0))
        );
    }

    #[test]
    fn test_percentage_bounds() {
        assert!(percentage("discount", Decimal::ZERO).is_ok());
        assert!(percentage("discount", Decimal::ONE_HUNDRED).is_ok());
        assert!(matches!(
            percentage("discount", Decimal::new(101, 0)),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(percentage("discount", Decimal::new(-1, 0)).is_err());
    }

    #[test]
    fn test_non_negative() {
        assert!(non_negative("stock", Decimal::ZERO).is_ok());
        assert_eq!(
            non_negative("stock", Decimal::new(-5, 1)),
            Err(ValidationError::Negative { field: "stock" })
        );
    }

    #[test]
    fn test_comma_list() {
        assert_eq!(comma_list(Some("S, M ,,L")), vec!["S", "M", "L"]);
        assert!(comma_list(None).is_empty());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ValidationError::Required { field: "code" }.to_string(),
            "code is required"
        );
        assert_eq!(
            ValidationError::OutOfRange {
                field: "discount",
                min: Decimal::ZERO,
                max: Decimal::ONE_HUNDRED
            }
            .to_string(),
            "discount must be between 0 and 100"
        );
    }
}
