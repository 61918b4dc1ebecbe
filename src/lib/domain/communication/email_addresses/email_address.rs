//! Email Address

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[a-z0-9_.-]+@[0-9a-z.-]+\.[a-z.]{2,6}$").unwrap();
}

use std::fmt;

use thiserror::Error;

use EmailAddressError::*;

/// An error that can occur when creating an email address
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmailAddressError {
    /// The email address is empty
    #[error("email is empty")]
    EmptyEmailAddress,

    /// The email address is invalid
    #[error("email is invalid")]
    InvalidEmailAddress,

    /// The email address does not belong to the required domain
    #[error("email must use the {domain} domain")]
    WrongDomain {
        /// The required domain
        domain: String,
    },
}

/// An email address
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new email address
    pub fn new(raw: &str) -> Result<Self, EmailAddressError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(EmptyEmailAddress);
        }

        if !EMAIL_REGEX.is_match(trimmed) {
            return Err(EmailAddressError::InvalidEmailAddress);
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Create a new email address that must end in `@domain`
    pub fn with_domain(raw: &str, domain: &str) -> Result<Self, EmailAddressError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(EmptyEmailAddress);
        }

        let pattern = Regex::new(&format!(r"^[a-z0-9_.-]+@{}$", regex::escape(domain)))
            .map_err(|_| InvalidEmailAddress)?;

        if !pattern.is_match(trimmed) {
            return Err(WrongDomain {
                domain: domain.to_string(),
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Create a new email address, restricted to `domain` when one is given
    pub fn parse(raw: &str, domain: Option<&str>) -> Result<Self, EmailAddressError> {
        match domain {
            Some(domain) => Self::with_domain(raw, domain),
            None => Self::new(raw),
        }
    }

    /// The address as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(email: EmailAddress) -> Self {
        email.0
    }
}
