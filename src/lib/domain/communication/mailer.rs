//! Mailer port

#[cfg(test)]
use mockall::mock;

mod errors;
mod message;

pub use errors::{AttachmentError, MailerError};
pub use message::{Attachment, OutgoingMessage};

use super::{credentials::LoginCredentials, protocols::Protocol};

/// How a message travels to its relay
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveryRoute {
    /// The protocol, which also fixes the relay endpoint
    pub protocol: Protocol,

    /// Login for relays that require one
    pub credentials: Option<LoginCredentials>,
}

impl DeliveryRoute {
    /// Creates a new delivery route
    pub fn new(protocol: Protocol, credentials: Option<LoginCredentials>) -> Self {
        Self {
            protocol,
            credentials,
        }
    }
}

/// What the relay told us after accepting a message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Whether the session logged in before sending
    pub authenticated: bool,

    /// The reply code to the message data
    pub code: String,
}

/// Sends email
pub trait Mailer {
    /// Deliver a message
    ///
    /// # Arguments
    /// * `route` - The [`DeliveryRoute`] to send the message over.
    /// * `message` - The [`OutgoingMessage`] to send.
    ///
    /// # Returns
    /// A [`DeliveryReceipt`] once the relay accepted the message, or a [`MailerError`]
    /// describing the step that failed. The connection is closed in both cases.
    fn deliver(
        &self,
        route: &DeliveryRoute,
        message: &OutgoingMessage,
    ) -> Result<DeliveryReceipt, MailerError>;
}

#[cfg(test)]
mock! {
    pub Mailer {}

    impl Mailer for Mailer {
        fn deliver(&self, route: &DeliveryRoute, message: &OutgoingMessage) -> Result<DeliveryReceipt, MailerError>;
    }
}
