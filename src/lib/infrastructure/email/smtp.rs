//! SMTP email service implementation

use std::time::Duration;

use clap::Parser;
use lettre::{
    transport::smtp::{
        authentication::{Credentials, DEFAULT_MECHANISMS},
        client::{SmtpConnection, TlsParameters},
        extension::ClientId,
    },
    Message,
};
use tracing::{debug, info, warn};

use crate::domain::communication::{
    mailer::{DeliveryReceipt, DeliveryRoute, Mailer, MailerError, OutgoingMessage},
    protocols::{Endpoint, Protocol},
};

use super::mime::build_message;

/// SMTP configuration
#[derive(Clone, Debug, PartialEq, Eq, Parser)]
pub struct SmtpConfig {
    /// Socket timeout in seconds
    #[clap(long = "smtp-timeout", env = "SMTP_TIMEOUT", default_value = "60")]
    pub timeout_secs: u64,

    /// Verify the TLS certificate
    #[clap(
        long = "smtp-verify-tls",
        env = "SMTP_VERIFY_TLS",
        default_value = "true",
        action = clap::ArgAction::Set
    )]
    pub verify_tls: bool,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            verify_tls: true,
        }
    }
}

impl SmtpConfig {
    /// The socket timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// SMTP mailer
#[derive(Debug, Default, Clone)]
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    /// Create a new SMTP mailer
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// TLS settings for `host`
    pub fn tls_parameters(&self, host: &str) -> Result<TlsParameters, MailerError> {
        TlsParameters::builder(host.to_string())
            .dangerous_accept_invalid_certs(!self.config.verify_tls)
            .build()
            .map_err(MailerError::TlsSetupFailed)
    }

    fn deliver_to(
        &self,
        endpoint: Endpoint,
        route: &DeliveryRoute,
        message: &OutgoingMessage,
    ) -> Result<DeliveryReceipt, MailerError> {
        let email = build_message(message)?;
        let hello_name = ClientId::default();

        let tls = match route.protocol {
            Protocol::Ssl | Protocol::Tls => Some(self.tls_parameters(endpoint.host)?),
            Protocol::Localhost => None,
        };

        let implicit_tls = match route.protocol {
            Protocol::Ssl => tls.as_ref(),
            Protocol::Tls | Protocol::Localhost => None,
        };

        debug!(%endpoint, protocol = %route.protocol, "connecting");

        let mut connection = SmtpConnection::connect(
            (endpoint.host, endpoint.port),
            Some(self.config.timeout()),
            &hello_name,
            implicit_tls,
            None,
        )
        .map_err(MailerError::ConnectionFailed)?;

        let result = self.transact(&mut connection, &hello_name, tls.as_ref(), route, &email);

        close(&mut connection);

        result
    }

    fn transact(
        &self,
        connection: &mut SmtpConnection,
        hello_name: &ClientId,
        tls: Option<&TlsParameters>,
        route: &DeliveryRoute,
        email: &Message,
    ) -> Result<DeliveryReceipt, MailerError> {
        if let (Protocol::Tls, Some(tls)) = (route.protocol, tls) {
            connection
                .starttls(tls, hello_name)
                .map_err(MailerError::TlsUpgradeFailed)?;

            debug!("connection upgraded with STARTTLS");
        }

        if let Some(credentials) = &route.credentials {
            let login = Credentials::new(
                credentials.username.to_string(),
                credentials.password.expose().to_string(),
            );

            connection
                .auth(DEFAULT_MECHANISMS, &login)
                .map_err(MailerError::AuthenticationFailed)?;

            info!(username = %credentials.username, "logged in");
        }

        let response = connection
            .send(email.envelope(), &email.formatted())
            .map_err(MailerError::SendFailed)?;

        Ok(DeliveryReceipt {
            authenticated: route.credentials.is_some(),
            code: response.code().to_string(),
        })
    }
}

/// Sends QUIT unless the client already gave up on the connection.
///
/// Returns whether QUIT was sent by this call.
fn close(connection: &mut SmtpConnection) -> bool {
    if connection.has_broken() {
        debug!("connection already closed");
        return false;
    }

    if let Err(e) = connection.quit() {
        warn!("could not close the connection cleanly: {e}");
    }

    true
}

impl Mailer for SmtpMailer {
    fn deliver(
        &self,
        route: &DeliveryRoute,
        message: &OutgoingMessage,
    ) -> Result<DeliveryReceipt, MailerError> {
        self.deliver_to(route.protocol.endpoint(), route, message)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{BufRead, BufReader, Write},
        net::TcpListener,
        thread::{self, JoinHandle},
    };

    use testresult::TestResult;

    use crate::domain::communication::{
        credentials::{LoginCredentials, Password},
        email_addresses::{EmailAddress, EmailAddressError},
    };

    use super::*;

    /// What a fake relay saw during one session
    #[derive(Debug, Default)]
    struct Transcript {
        commands: Vec<String>,
        data: String,
    }

    /// Replies a fake relay gives to the commands that can fail
    #[derive(Clone, Copy, Debug)]
    struct Replies {
        ehlo: &'static str,
        auth: &'static str,
        rcpt: &'static str,
    }

    impl Default for Replies {
        fn default() -> Self {
            Self {
                ehlo: "250 fake\r\n",
                auth: "502 not implemented\r\n",
                rcpt: "250 ok\r\n",
            }
        }
    }

    /// Serves a single SMTP session on an ephemeral port
    fn fake_relay(replies: Replies) -> std::io::Result<(u16, JoinHandle<Transcript>)> {
        let listener = TcpListener::bind(("127.0.0.1", 0))?;
        let port = listener.local_addr()?.port();

        let handle = thread::spawn(move || {
            let mut transcript = Transcript::default();

            let Ok((stream, _)) = listener.accept() else {
                return transcript;
            };
            let mut writer = stream.try_clone().expect("clone stream");
            let mut reader = BufReader::new(stream);

            writer.write_all(b"220 fake ESMTP\r\n").ok();

            let mut line = String::new();
            while reader.read_line(&mut line).unwrap_or(0) > 0 {
                let command = line.trim_end().to_string();
                line.clear();

                let verb = command
                    .split_whitespace()
                    .next()
                    .unwrap_or_default()
                    .to_uppercase();
                transcript.commands.push(verb.clone());

                let reply = match verb.as_str() {
                    "EHLO" => replies.ehlo,
                    "AUTH" => replies.auth,
                    "MAIL" => "250 ok\r\n",
                    "RCPT" => replies.rcpt,
                    "DATA" => {
                        writer.write_all(b"354 go ahead\r\n").ok();

                        while reader.read_line(&mut line).unwrap_or(0) > 0 {
                            if line == ".\r\n" {
                                line.clear();
                                break;
                            }
                            transcript.data.push_str(&line);
                            line.clear();
                        }

                        "250 queued\r\n"
                    }
                    "QUIT" => {
                        writer.write_all(b"221 bye\r\n").ok();
                        break;
                    }
                    _ => "502 not implemented\r\n",
                };

                writer.write_all(reply.as_bytes()).ok();
            }

            transcript
        });

        Ok((port, handle))
    }

    fn local(port: u16) -> Endpoint {
        Endpoint {
            host: "127.0.0.1",
            port,
        }
    }

    fn message() -> Result<OutgoingMessage, EmailAddressError> {
        Ok(OutgoingMessage::new(
            EmailAddress::new("sender@example.com")?,
            EmailAddress::new("receiver@example.com")?,
            "MIME test",
            "plain body",
            "<p>html body</p>",
        ))
    }

    fn local_route() -> DeliveryRoute {
        DeliveryRoute::new(Protocol::Localhost, None)
    }

    fn login_route() -> TestResult<DeliveryRoute> {
        let credentials = LoginCredentials::new(
            EmailAddress::new("sender@example.com")?,
            Password::new("secret")?,
        );

        Ok(DeliveryRoute::new(Protocol::Localhost, Some(credentials)))
    }

    const AUTH_EHLO: &str = "250-fake\r\n250 AUTH PLAIN LOGIN\r\n";

    #[test]
    fn test_default_config() {
        let config = SmtpConfig::default();

        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert!(config.verify_tls);
    }

    #[test]
    fn test_config_from_args() -> TestResult {
        let config =
            SmtpConfig::try_parse_from(["mailer", "--smtp-timeout", "5", "--smtp-verify-tls", "false"])?;

        assert_eq!(config.timeout_secs, 5);
        assert!(!config.verify_tls);

        Ok(())
    }

    #[test]
    fn test_tls_parameters_for_host() -> TestResult {
        let params = SmtpMailer::default().tls_parameters("smtp.gmail.com")?;

        assert_eq!(params.domain(), "smtp.gmail.com");

        Ok(())
    }

    #[test]
    fn test_tls_parameters_for_ip_address() -> TestResult {
        let params = SmtpMailer::default().tls_parameters("127.0.0.1")?;

        assert_eq!(params.domain(), "127.0.0.1");

        Ok(())
    }

    #[test]
    fn test_deliver_to_local_relay() -> TestResult {
        let (port, relay) = fake_relay(Replies::default())?;

        let receipt = SmtpMailer::default().deliver_to(local(port), &local_route(), &message()?)?;
        let transcript = relay.join().expect("relay panicked");

        assert_eq!(receipt.code, "250");
        assert!(!receipt.authenticated);
        assert_eq!(transcript.commands, vec!["EHLO", "MAIL", "RCPT", "DATA", "QUIT"]);
        assert!(transcript.data.contains("Content-Type: text/plain"));
        assert!(transcript.data.contains("Content-Type: text/html"));

        Ok(())
    }

    #[test]
    fn test_rejected_recipient_still_quits() -> TestResult {
        let (port, relay) = fake_relay(Replies {
            rcpt: "550 no such user\r\n",
            ..Replies::default()
        })?;

        let result = SmtpMailer::default().deliver_to(local(port), &local_route(), &message()?);
        let transcript = relay.join().expect("relay panicked");

        assert!(matches!(result, Err(MailerError::SendFailed(_))));
        assert_eq!(transcript.commands, vec!["EHLO", "MAIL", "RCPT", "QUIT"]);

        Ok(())
    }

    #[test]
    fn test_starttls_without_server_support_fails_and_quits() -> TestResult {
        let (port, relay) = fake_relay(Replies::default())?;
        let route = DeliveryRoute::new(Protocol::Tls, None);

        let result = SmtpMailer::default().deliver_to(local(port), &route, &message()?);
        let transcript = relay.join().expect("relay panicked");

        assert!(matches!(result, Err(MailerError::TlsUpgradeFailed(_))));
        assert_eq!(transcript.commands, vec!["EHLO", "QUIT"]);

        Ok(())
    }

    #[test]
    fn test_refused_login_fails_and_quits() -> TestResult {
        let (port, relay) = fake_relay(Replies {
            ehlo: AUTH_EHLO,
            auth: "535 authentication failed\r\n",
            ..Replies::default()
        })?;

        let result = SmtpMailer::default().deliver_to(local(port), &login_route()?, &message()?);
        let transcript = relay.join().expect("relay panicked");

        assert!(matches!(result, Err(MailerError::AuthenticationFailed(_))));
        assert_eq!(transcript.commands.first().map(String::as_str), Some("EHLO"));
        assert!(transcript.commands.contains(&"AUTH".to_string()));
        assert!(!transcript.commands.contains(&"MAIL".to_string()));
        assert_eq!(transcript.commands.last().map(String::as_str), Some("QUIT"));

        Ok(())
    }

    #[test]
    fn test_accepted_login_then_delivers() -> TestResult {
        let (port, relay) = fake_relay(Replies {
            ehlo: AUTH_EHLO,
            auth: "235 accepted\r\n",
            ..Replies::default()
        })?;

        let receipt = SmtpMailer::default().deliver_to(local(port), &login_route()?, &message()?)?;
        let transcript = relay.join().expect("relay panicked");

        assert!(receipt.authenticated);
        assert_eq!(
            transcript.commands,
            vec!["EHLO", "AUTH", "MAIL", "RCPT", "DATA", "QUIT"]
        );

        Ok(())
    }

    #[test]
    fn test_close_sends_quit_on_open_connection() -> TestResult {
        let (port, relay) = fake_relay(Replies::default())?;
        let mut connection = SmtpConnection::connect(
            ("127.0.0.1", port),
            Some(Duration::from_secs(5)),
            &ClientId::default(),
            None,
            None,
        )?;

        assert!(close(&mut connection));

        let transcript = relay.join().expect("relay panicked");
        assert_eq!(transcript.commands, vec!["EHLO", "QUIT"]);

        Ok(())
    }

    #[test]
    fn test_close_skips_aborted_connection() -> TestResult {
        let (port, relay) = fake_relay(Replies::default())?;
        let mut connection = SmtpConnection::connect(
            ("127.0.0.1", port),
            Some(Duration::from_secs(5)),
            &ClientId::default(),
            None,
            None,
        )?;

        connection.abort();

        assert!(!close(&mut connection));

        let transcript = relay.join().expect("relay panicked");
        assert_eq!(transcript.commands, vec!["EHLO", "QUIT"]);

        Ok(())
    }

    #[test]
    fn test_unreachable_relay_fails_to_connect() -> TestResult {
        let port = {
            let listener = TcpListener::bind(("127.0.0.1", 0))?;
            listener.local_addr()?.port()
        };

        let result = SmtpMailer::default().deliver_to(local(port), &local_route(), &message()?);

        assert!(matches!(result, Err(MailerError::ConnectionFailed(_))));

        Ok(())
    }
}
