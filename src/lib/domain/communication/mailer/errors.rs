//! Mailer errors

use std::{io, path::PathBuf};

use lettre::{address::AddressError, error::Error as BuildError, transport::smtp};
use thiserror::Error;

/// Mailer errors
#[derive(Debug, Error)]
pub enum MailerError {
    /// Could not reach the relay or complete the greeting
    #[error("could not connect to the mail server: {0}")]
    ConnectionFailed(#[source] smtp::Error),

    /// The TLS client could not be configured
    #[error("could not set up TLS: {0}")]
    TlsSetupFailed(#[source] smtp::Error),

    /// The STARTTLS upgrade failed
    #[error("could not secure the connection: {0}")]
    TlsUpgradeFailed(#[source] smtp::Error),

    /// The relay refused the login
    #[error("could not log in: {0}")]
    AuthenticationFailed(#[source] smtp::Error),

    /// The relay refused the message
    #[error("could not send the email: {0}")]
    SendFailed(#[source] smtp::Error),

    /// Invalid email address
    #[error("Invalid email address")]
    InvalidEmail,

    /// The message could not be built
    #[error("could not build the email: {0}")]
    InvalidMessage(#[source] BuildError),

    /// Unknown error
    #[error(transparent)]
    UnknownError(anyhow::Error),
}

impl MailerError {
    /// Whether the failure happened after the relay accepted the login
    pub fn passed_login(&self) -> bool {
        matches!(self, Self::SendFailed(_))
    }
}

impl From<anyhow::Error> for MailerError {
    fn from(err: anyhow::Error) -> Self {
        MailerError::UnknownError(err)
    }
}

impl From<AddressError> for MailerError {
    fn from(_err: AddressError) -> Self {
        MailerError::InvalidEmail
    }
}

impl From<BuildError> for MailerError {
    fn from(err: BuildError) -> Self {
        MailerError::InvalidMessage(err)
    }
}

/// Errors that can occur when reading an attachment
#[derive(Debug, Error)]
pub enum AttachmentError {
    /// The path does not end in a file name
    #[error("\"{0}\" does not name a file")]
    MissingFileName(PathBuf),

    /// The file could not be read
    #[error("could not read \"{path}\": {source}")]
    Unreadable {
        /// The attachment path
        path: PathBuf,

        /// The underlying error
        #[source]
        source: io::Error,
    },
}
