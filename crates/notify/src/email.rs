//! SMTP mail transport via `lettre` with TLS support.
//!
//! Delivers reminders through an SMTP relay. Supports STARTTLS, implicit
//! TLS (port 465) and plaintext connections.

use crate::traits::{MailTransport, NotifyError, ReminderEmail};
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

/// Sends reminder emails via SMTP.
#[derive(Debug)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl SmtpMailer {
    /// Build an `SmtpMailer` from SMTP configuration.
    ///
    /// - `smtp_host`: SMTP server hostname.
    /// - `smtp_port`: Optional port (defaults to 25). Port 465 always uses
    ///   implicit TLS.
    /// - `tls`: STARTTLS on any other port when `true`; plaintext otherwise.
    /// - `credentials`: optional `(username, password)` pair.
    pub fn from_config(
        smtp_host: &str,
        smtp_port: Option<u16>,
        tls: bool,
        credentials: Option<(String, String)>,
    ) -> Result<Self, NotifyError> {
        if smtp_host.trim().is_empty() {
            return Err(NotifyError::Config("SMTP host is required".to_string()));
        }

        let port = smtp_port.unwrap_or(25);

        let mut builder = if port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(smtp_host)
                .map_err(|e| NotifyError::Config(e.to_string()))?
                .port(port)
        } else if tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(smtp_host)
                .map_err(|e| NotifyError::Config(e.to_string()))?
                .port(port)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(smtp_host).port(port)
        };

        if let Some((username, password)) = credentials {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            transport: builder.build(),
            host: smtp_host.to_string(),
        })
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .parse()
        .map_err(|e: lettre::address::AddressError| NotifyError::Address {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

/// Convert a rendered reminder into a plain-text MIME message.
pub fn build_message(email: &ReminderEmail) -> Result<Message, NotifyError> {
    let mut builder = Message::builder()
        .from(parse_mailbox(&email.from)?)
        .to(parse_mailbox(&email.to)?)
        .date_now()
        .subject(email.subject.as_str())
        .header(ContentType::TEXT_PLAIN);

    if let Some(reply_to) = &email.reply_to {
        builder = builder.reply_to(parse_mailbox(reply_to)?);
    }

    builder
        .body(email.body.clone())
        .map_err(|e| NotifyError::Smtp(e.to_string()))
}

#[async_trait::async_trait]
impl MailTransport for SmtpMailer {
    async fn deliver(&self, email: &ReminderEmail) -> Result<(), NotifyError> {
        let message = build_message(email)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Smtp(e.to_string()))?;

        tracing::info!(
            transport = "smtp",
            relay = %self.host,
            to = %email.to,
            subject = %email.subject,
            "reminder delivered"
        );

        Ok(())
    }

    fn transport_name(&self) -> &str {
        "smtp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_email() -> ReminderEmail {
        ReminderEmail {
            from: "jenkins@example.com".to_string(),
            to: "bob@co.com".to_string(),
            reply_to: Some("helpdesk@example.com".to_string()),
            subject: "Node still offline".to_string(),
            body: "build-07 is still offline".to_string(),
        }
    }

    #[test]
    fn parse_email_with_display_name() {
        let mb = parse_mailbox("Alice <alice@example.com>").unwrap();
        assert_eq!(mb.email.to_string(), "alice@example.com");
    }

    #[test]
    fn message_carries_envelope_and_headers() {
        let message = build_message(&sample_email()).unwrap();

        let to: Vec<String> = message.envelope().to().iter().map(|a| a.to_string()).collect();
        assert_eq!(to, vec!["bob@co.com".to_string()]);

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Node still offline"), "got: {raw}");
        assert!(raw.contains("Reply-To: helpdesk@example.com"), "got: {raw}");
        assert!(raw.contains("Date: "), "got: {raw}");
        assert!(raw.contains("build-07 is still offline"), "got: {raw}");
    }

    #[test]
    fn message_without_reply_to() {
        let mut email = sample_email();
        email.reply_to = None;
        let raw = String::from_utf8(build_message(&email).unwrap().formatted()).unwrap();
        assert!(!raw.contains("Reply-To"), "got: {raw}");
    }

    #[test]
    fn invalid_recipient_is_an_address_error() {
        let mut email = sample_email();
        email.to = "bob".to_string();
        match build_message(&email) {
            Err(NotifyError::Address { address, .. }) => assert_eq!(address, "bob"),
            other => panic!("expected address error, got: {other:?}"),
        }
    }

    #[test]
    fn from_config_plaintext() {
        let mailer = SmtpMailer::from_config("smtp.example.com", Some(25), false, None);
        assert!(mailer.is_ok());
        assert_eq!(mailer.unwrap().transport_name(), "smtp");
    }

    #[test]
    fn from_config_starttls_with_credentials() {
        let mailer = SmtpMailer::from_config(
            "smtp.example.com",
            Some(587),
            true,
            Some(("user".to_string(), "secret".to_string())),
        );
        assert!(mailer.is_ok());
    }

    #[test]
    fn from_config_implicit_tls_port() {
        assert!(SmtpMailer::from_config("smtp.example.com", Some(465), false, None).is_ok());
    }

    #[test]
    fn from_config_blank_host() {
        let err = SmtpMailer::from_config(" ", None, false, None).unwrap_err().to_string();
        assert!(err.contains("Configuration error"), "got: {err}");
    }
}
