//! Email message

use std::{fs, path::Path};

use crate::domain::communication::email_addresses::EmailAddress;

use super::AttachmentError;

/// A file sent along with the message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    /// The name the recipient sees
    pub filename: String,

    /// The raw file contents
    pub content: Vec<u8>,
}

impl Attachment {
    /// Creates a new attachment
    pub fn new(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content,
        }
    }

    /// Reads the file at `path`, keeping only its base name
    pub fn from_path(path: &Path) -> Result<Self, AttachmentError> {
        let filename = path
            .file_name()
            .ok_or_else(|| AttachmentError::MissingFileName(path.to_path_buf()))?
            .to_string_lossy()
            .into_owned();

        let content = fs::read(path).map_err(|source| AttachmentError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self { filename, content })
    }
}

/// Email message
#[derive(Clone, Debug)]
pub struct OutgoingMessage {
    /// The sender of the email
    pub from: EmailAddress,

    /// The recipient of the email
    pub to: EmailAddress,

    /// The subject of the email
    pub subject: String,

    /// The plain text body of the email
    pub plain_body: String,

    /// The HTML body of the email
    pub html_body: String,

    /// An optional file attachment
    pub attachment: Option<Attachment>,
}

impl OutgoingMessage {
    /// Creates a message with both a plain text and an HTML body
    pub fn new(
        from: EmailAddress,
        to: EmailAddress,
        subject: impl Into<String>,
        plain_body: impl Into<String>,
        html_body: impl Into<String>,
    ) -> Self {
        Self {
            from,
            to,
            subject: subject.into(),
            plain_body: plain_body.into(),
            html_body: html_body.into(),
            attachment: None,
        }
    }

    /// Attaches a file to the message
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}
