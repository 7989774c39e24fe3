//! Transport that logs reminders instead of sending them.

use crate::traits::{MailTransport, NotifyError, ReminderEmail};

/// Logs each reminder at `info` and reports success.
#[derive(Debug, Default)]
pub struct LogTransport;

#[async_trait::async_trait]
impl MailTransport for LogTransport {
    async fn deliver(&self, email: &ReminderEmail) -> Result<(), NotifyError> {
        tracing::info!(
            transport = "log",
            from = %email.from,
            to = %email.to,
            reply_to = email.reply_to.as_deref().unwrap_or(""),
            subject = %email.subject,
            body_len = email.body.len(),
            "dry run: reminder not sent"
        );
        tracing::debug!(body = %email.body, "dry run reminder body");
        Ok(())
    }

    fn transport_name(&self) -> &str {
        "log"
    }
}
