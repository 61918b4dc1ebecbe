//! Everything needed to compose and deliver a single email

pub mod credentials;
pub mod email_addresses;
pub mod emails;
pub mod mailer;
pub mod protocols;
pub mod session;
