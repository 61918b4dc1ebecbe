#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! Interactive command-line mailer

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use mime_mailer::{
    domain::communication::session::{
        DeliveryOutcome, MailSession, SessionOptions, DEFAULT_SUBJECT,
    },
    infrastructure::{
        console::TerminalConsole,
        email::smtp::{SmtpConfig, SmtpMailer},
    },
};
use tracing_subscriber::EnvFilter;

/// Options for the message being sent
#[derive(Debug, Parser)]
pub struct MessageArgs {
    /// The sender email address; prompted for when missing
    #[clap(long, env = "MAILER_SENDER")]
    pub sender: Option<String>,

    /// Only accept sender addresses in this domain
    #[clap(long, env = "MAILER_SENDER_DOMAIN")]
    pub sender_domain: Option<String>,

    /// Only accept recipient addresses in this domain
    #[clap(long, env = "MAILER_RECIPIENT_DOMAIN")]
    pub recipient_domain: Option<String>,

    /// The email subject
    #[clap(long, env = "MAILER_SUBJECT", default_value = DEFAULT_SUBJECT)]
    pub subject: String,

    /// File to attach
    #[clap(long, env = "MAILER_ATTACHMENT")]
    pub attachment: Option<PathBuf>,
}

impl From<MessageArgs> for SessionOptions {
    fn from(args: MessageArgs) -> Self {
        Self {
            sender: args.sender,
            sender_domain: args.sender_domain,
            recipient_domain: args.recipient_domain,
            subject: args.subject,
            attachment: args.attachment,
        }
    }
}

/// Command-line arguments / environment variables
#[derive(Debug, Parser)]
#[clap(version, about)]
pub struct Args {
    /// The message options
    #[clap(flatten)]
    pub message: MessageArgs,

    /// The SMTP client configuration
    #[clap(flatten)]
    pub smtp: SmtpConfig,
}

#[mutants::skip]
fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let session = MailSession::new(
        TerminalConsole::new(),
        SmtpMailer::new(args.smtp),
        args.message.into(),
    );

    match session.run()? {
        DeliveryOutcome::Sent { recipient, .. } => {
            tracing::debug!(%recipient, "session finished");
        }
        DeliveryOutcome::Failed { recipient, error } => {
            tracing::debug!(%recipient, "session finished without delivery: {error}");
        }
    }

    Ok(())
}
