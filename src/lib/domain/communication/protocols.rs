//! SMTP protocols and their relays

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Host of the public relay used by [`Protocol::Ssl`] and [`Protocol::Tls`]
pub const GMAIL_HOST: &str = "smtp.gmail.com";

/// Host of the local debugging relay
pub const LOCALHOST: &str = "localhost";

/// The answer is not one of the supported protocols
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown protocol \"{0}\"")]
pub struct UnknownProtocol(pub String);

/// How the connection to the relay is secured
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Protocol {
    /// TLS from the first byte
    Ssl,

    /// Plaintext connection upgraded with STARTTLS
    Tls,

    /// Unencrypted connection to a local debugging relay
    Localhost,
}

/// A relay host and port
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Endpoint {
    /// The relay host
    pub host: &'static str,

    /// The relay port
    pub port: u16,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl Protocol {
    /// The relay this protocol always talks to
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::Ssl => Endpoint {
                host: GMAIL_HOST,
                port: 465,
            },
            Self::Tls => Endpoint {
                host: GMAIL_HOST,
                port: 587,
            },
            Self::Localhost => Endpoint {
                host: LOCALHOST,
                port: 1025,
            },
        }
    }

    /// Whether the relay expects a login before accepting mail
    pub fn requires_credentials(&self) -> bool {
        !matches!(self, Self::Localhost)
    }

    /// Whether a failed delivery aborts the program instead of being reported
    pub fn propagates_delivery_errors(&self) -> bool {
        matches!(self, Self::Ssl)
    }
}

impl FromStr for Protocol {
    type Err = UnknownProtocol;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "ssl" => Ok(Self::Ssl),
            "tls" => Ok(Self::Tls),
            "localhost" => Ok(Self::Localhost),
            _ => Err(UnknownProtocol(raw.to_string())),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ssl => write!(f, "SSL"),
            Self::Tls => write!(f, "TLS"),
            Self::Localhost => write!(f, "localhost"),
        }
    }
}
