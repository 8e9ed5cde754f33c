//! Sign-in address for shopper and administrator accounts.
//!
//! Only the shape is checked here; whether the account exists is the API's
//! call. The domain is lowercased so the same address typed twice with
//! different casing reaches the API identically.

use core::fmt;

use crate::validation::ValidationError;

/// Why an address was refused.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("enter an email address")]
    Empty,
    #[error("use at most {max} characters")]
    TooLong { max: usize },
    #[error("an email address needs exactly one @")]
    AtCount,
    #[error("add the part before the @")]
    EmptyLocalPart,
    #[error("add the domain after the @")]
    EmptyDomain,
    #[error("remove the spaces")]
    Whitespace,
}

impl From<EmailError> for ValidationError {
    fn from(err: EmailError) -> Self {
        match err {
            EmailError::Empty => Self::Required { field: "Email" },
            other => Self::Invalid {
                field: "Email",
                reason: other.to_string(),
            },
        }
    }
}

/// A trimmed address with exactly one `@` and a lowercase domain.
///
/// ```
/// use threadline_core::Email;
///
/// let email = Email::parse(" Ada@Threadline.TEST ").unwrap();
/// assert_eq!(email.as_str(), "Ada@threadline.test");
/// assert!(Email::parse("ada@@threadline.test").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// # Errors
    ///
    /// Returns an [`EmailError`] naming the first problem found.
    pub fn parse(raw: &str) -> Result<Self, EmailError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(EmailError::Empty);
        }
        if raw.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(EmailError::Whitespace);
        }

        let (local, domain) = raw.split_once('@').ok_or(EmailError::AtCount)?;
        if domain.contains('@') {
            return Err(EmailError::AtCount);
        }
        if local.is_empty() {
            return Err(EmailError::EmptyLocalPart);
        }
        if domain.is_empty() {
            return Err(EmailError::EmptyDomain);
        }

        Ok(Self(format!("{local}@{}", domain.to_lowercase())))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First character of the local part, then the domain: `a***@threadline.test`.
    /// Used in logs instead of the full address.
    #[must_use]
    pub fn masked(&self) -> String {
        let (local, domain) = self.0.split_once('@').unwrap_or((self.0.as_str(), ""));
        let first = local.chars().next().unwrap_or('*');
        format!("{first}***@{domain}")
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_is_lowercased_local_part_kept() {
        let email = Email::parse("  Shopper.Name@Threadline.TEST \n").unwrap();
        assert_eq!(email.as_str(), "Shopper.Name@threadline.test");
        assert_eq!(email.masked(), "S***@threadline.test");
    }

    #[test]
    fn test_each_shape_problem_is_named() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
        assert_eq!(Email::parse("no-at-symbol"), Err(EmailError::AtCount));
        assert_eq!(Email::parse("a@b@threadline.test"), Err(EmailError::AtCount));
        assert_eq!(Email::parse("@threadline.test"), Err(EmailError::EmptyLocalPart));
        assert_eq!(Email::parse("shopper@"), Err(EmailError::EmptyDomain));
        assert_eq!(Email::parse("shop per@threadline.test"), Err(EmailError::Whitespace));

        let long = format!("{}@threadline.test", "a".repeat(250));
        assert_eq!(
            Email::parse(&long),
            Err(EmailError::TooLong { max: Email::MAX_LENGTH })
        );
    }

    #[test]
    fn test_errors_become_form_messages() {
        assert_eq!(
            ValidationError::from(EmailError::Empty),
            ValidationError::Required { field: "Email" }
        );
        assert_eq!(
            ValidationError::from(EmailError::EmptyDomain).to_string(),
            "Email: add the domain after the @"
        );
    }
}
