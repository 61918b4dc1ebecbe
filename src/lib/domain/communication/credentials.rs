//! Login credentials for the SMTP relay

use std::fmt;

use thiserror::Error;

use super::email_addresses::EmailAddress;

/// Password error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    /// Password is empty
    #[error("Your password cannot be empty.")]
    Empty,
}

/// Password
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Create a new password
    pub fn new(raw: &str) -> Result<Self, PasswordError> {
        if raw.is_empty() {
            return Err(PasswordError::Empty);
        }

        Ok(Self(raw.to_string()))
    }

    /// Get the password as a string slice
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

/// The account used to log in to the relay
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginCredentials {
    /// The account name, which is the sender's address
    pub username: EmailAddress,

    /// The account password
    pub password: Password,
}

impl LoginCredentials {
    /// Creates new credentials
    pub fn new(username: EmailAddress, password: Password) -> Self {
        Self { username, password }
    }
}
