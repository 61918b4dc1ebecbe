//! Interactive mail session
//!
//! A session runs once, top to bottom: choose a protocol, collect the addresses and the
//! password, compose the message and hand it to a [`Mailer`].

use std::{io, path::PathBuf};

use thiserror::Error;
use tracing::{debug, error, info};

use crate::domain::{
    communication::{
        credentials::{LoginCredentials, Password},
        email_addresses::{EmailAddress, EmailAddressError},
        emails::GreetingTemplate,
        mailer::{
            Attachment, AttachmentError, DeliveryReceipt, DeliveryRoute, Mailer, MailerError,
            OutgoingMessage,
        },
        protocols::Protocol,
    },
    console::Console,
};

/// Subject used when none is configured
pub const DEFAULT_SUBJECT: &str = "MIME test";

const PROTOCOL_PROMPT: &str = "Which protocol do you want to use? (SSL, TLS, localhost): ";
const PASSWORD_PROMPT: &str = "Email password: ";
const LOGGED_IN: &str = "You have successfully logged in!";

/// Settings that shape a session without being asked for
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionOptions {
    /// Sender address; prompted for when missing
    pub sender: Option<String>,

    /// Domain the sender address must belong to
    pub sender_domain: Option<String>,

    /// Domain the recipient address must belong to
    pub recipient_domain: Option<String>,

    /// The subject of the email
    pub subject: String,

    /// File to attach
    pub attachment: Option<PathBuf>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            sender: None,
            sender_domain: None,
            recipient_domain: None,
            subject: DEFAULT_SUBJECT.to_string(),
            attachment: None,
        }
    }
}

/// Errors that end a session
#[derive(Debug, Error)]
pub enum SessionError {
    /// The console could not be read
    #[error("could not read from the console: {0}")]
    Console(#[from] io::Error),

    /// The configured sender is not a valid address
    #[error("invalid sender address \"{address}\": {source}")]
    InvalidSender {
        /// The configured address
        address: String,

        /// Why it was rejected
        #[source]
        source: EmailAddressError,
    },

    /// The attachment could not be read
    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    /// Delivery failed on a protocol that does not tolerate failures
    #[error(transparent)]
    Delivery(#[from] MailerError),

    /// Unknown error
    #[error(transparent)]
    UnknownError(#[from] anyhow::Error),
}

/// How a completed session ended
#[derive(Debug)]
pub enum DeliveryOutcome {
    /// The relay accepted the message
    Sent {
        /// The recipient
        recipient: EmailAddress,

        /// The relay's receipt
        receipt: DeliveryReceipt,
    },

    /// Delivery failed and the failure was reported to the user
    Failed {
        /// The recipient
        recipient: EmailAddress,

        /// What went wrong
        error: MailerError,
    },
}

/// One interactive send
#[derive(Debug)]
pub struct MailSession<C, M>
where
    C: Console,
    M: Mailer,
{
    console: C,
    mailer: M,
    options: SessionOptions,
}

impl<C, M> MailSession<C, M>
where
    C: Console,
    M: Mailer,
{
    /// Creates a new session
    pub fn new(console: C, mailer: M, options: SessionOptions) -> Self {
        Self {
            console,
            mailer,
            options,
        }
    }

    /// Runs the whole session
    pub fn run(&self) -> Result<DeliveryOutcome, SessionError> {
        let protocol = self.select_protocol()?;
        let sender = self.sender()?;
        let recipient =
            self.prompt_email_address("receiver", self.options.recipient_domain.as_deref())?;
        let credentials = self.collect_credentials(protocol, &sender)?;

        let message = self.compose(sender, recipient)?;

        self.dispatch(&DeliveryRoute::new(protocol, credentials), message)
    }

    /// Asks for a protocol until a supported one is given
    pub fn select_protocol(&self) -> Result<Protocol, SessionError> {
        loop {
            let answer = self.console.read_line(PROTOCOL_PROMPT)?;

            match answer.parse::<Protocol>() {
                Ok(protocol) => {
                    if protocol == Protocol::Localhost {
                        self.console.say(&format!(
                            "Remember to run a local debugging SMTP server on {}.",
                            protocol.endpoint()
                        ));
                    }

                    debug!(%protocol, "protocol selected");

                    return Ok(protocol);
                }
                Err(_) => self.console.say("Sorry, this is not a valid answer."),
            }
        }
    }

    /// Asks for an email address until a valid one is given
    ///
    /// # Arguments
    /// * `who` - Whose address is asked for, e.g. "sender" or "receiver".
    /// * `domain` - When set, the address must belong to this domain.
    pub fn prompt_email_address(
        &self,
        who: &str,
        domain: Option<&str>,
    ) -> Result<EmailAddress, SessionError> {
        let prompt = format!("Enter {who} email: ");

        loop {
            let answer = self.console.read_line(&prompt)?;

            match EmailAddress::parse(&answer, domain) {
                Ok(email) => return Ok(email),
                Err(_) => match domain {
                    Some(domain) => self.console.say(&format!(
                        "Sorry, this is not a valid email address. Remember to use the {domain} domain."
                    )),
                    None => self.console.say("Sorry, this is not a valid email address."),
                },
            }
        }
    }

    /// Collects the login for protocols that need one
    pub fn collect_credentials(
        &self,
        protocol: Protocol,
        sender: &EmailAddress,
    ) -> Result<Option<LoginCredentials>, SessionError> {
        if !protocol.requires_credentials() {
            return Ok(None);
        }

        loop {
            let answer = self.console.read_password(PASSWORD_PROMPT)?;

            match Password::new(&answer) {
                Ok(password) => {
                    return Ok(Some(LoginCredentials::new(sender.clone(), password)));
                }
                Err(err) => self.console.say(&err.to_string()),
            }
        }
    }

    /// Builds the message sent from `from` to `to`
    pub fn compose(
        &self,
        from: EmailAddress,
        to: EmailAddress,
    ) -> Result<OutgoingMessage, SessionError> {
        let template = GreetingTemplate::default();

        let message = OutgoingMessage::new(
            from,
            to,
            self.options.subject.clone(),
            template.render_plain()?,
            template.render_html()?,
        );

        match &self.options.attachment {
            Some(path) => {
                let attachment = Attachment::from_path(path)?;

                debug!(
                    filename = %attachment.filename,
                    bytes = attachment.content.len(),
                    "attachment loaded"
                );

                Ok(message.with_attachment(attachment))
            }
            None => Ok(message),
        }
    }

    /// Hands the message to the mailer and reports the result
    pub fn dispatch(
        &self,
        route: &DeliveryRoute,
        message: OutgoingMessage,
    ) -> Result<DeliveryOutcome, SessionError> {
        let recipient = message.to.clone();

        match self.mailer.deliver(route, &message) {
            Ok(receipt) => {
                if receipt.authenticated {
                    self.console.say(LOGGED_IN);
                }

                self.console
                    .say(&format!("You just sent an email to {recipient}."));

                info!(%recipient, code = %receipt.code, "email sent");

                Ok(DeliveryOutcome::Sent { recipient, receipt })
            }
            Err(err) => {
                error!(%recipient, protocol = %route.protocol, "delivery failed: {err}");

                if route.credentials.is_some() && err.passed_login() {
                    self.console.say(LOGGED_IN);
                }

                if route.protocol.propagates_delivery_errors() {
                    return Err(SessionError::Delivery(err));
                }

                self.console.say(&err.to_string());

                Ok(DeliveryOutcome::Failed {
                    recipient,
                    error: err,
                })
            }
        }
    }

    fn sender(&self) -> Result<EmailAddress, SessionError> {
        let domain = self.options.sender_domain.as_deref();

        match &self.options.sender {
            Some(address) => EmailAddress::parse(address, domain).map_err(|source| {
                SessionError::InvalidSender {
                    address: address.clone(),
                    source,
                }
            }),
            None => self.prompt_email_address("sender", domain),
        }
    }
}
