//! MIME rendering of outgoing messages

use lettre::{
    message::{
        header::{ContentTransferEncoding, ContentType},
        Attachment as AttachmentPart, Body, Mailbox, MultiPart, SinglePart,
    },
    Message,
};

use crate::domain::communication::mailer::{Attachment, MailerError, OutgoingMessage};

const OCTET_STREAM: &str = "application/octet-stream";

/// Builds the MIME message for `message`
///
/// The plain text and HTML bodies form a `multipart/alternative`. An attachment wraps
/// that in a `multipart/mixed` next to a base64 `application/octet-stream` part.
pub fn build_message(message: &OutgoingMessage) -> Result<Message, MailerError> {
    let from: Mailbox = message.from.as_str().parse()?;
    let to: Mailbox = message.to.as_str().parse()?;

    let alternative = MultiPart::alternative_plain_html(
        message.plain_body.clone(),
        message.html_body.clone(),
    );

    let body = match &message.attachment {
        Some(attachment) => MultiPart::mixed()
            .multipart(alternative)
            .singlepart(attachment_part(attachment)?),
        None => alternative,
    };

    Ok(Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.clone())
        .multipart(body)?)
}

/// Serializes `message` to the text handed to the relay
pub fn to_wire(message: &OutgoingMessage) -> Result<String, MailerError> {
    let email = build_message(message)?;

    Ok(String::from_utf8_lossy(&email.formatted()).into_owned())
}

fn attachment_part(attachment: &Attachment) -> Result<SinglePart, MailerError> {
    let content_type = ContentType::parse(OCTET_STREAM)
        .map_err(|e| anyhow::anyhow!("invalid attachment content type: {e}"))?;

    let body = Body::new_with_encoding(attachment.content.clone(), ContentTransferEncoding::Base64)
        .unwrap_or_else(Body::new);

    Ok(AttachmentPart::new(attachment.filename.clone()).body(body, content_type))
}
