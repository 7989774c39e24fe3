//! Mail transport trait definition and shared error types.

/// Errors that can occur while building or delivering a reminder.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("SMTP delivery failed: {0}")]
    Smtp(String),

    #[error("Invalid address '{address}': {reason}")]
    Address { address: String, reason: String },

    #[error("Template rendering failed: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// A fully rendered reminder, built per send and dropped afterwards.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ReminderEmail {
    pub from: String,
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub body: String,
}

/// Delivery backend for reminder emails.
#[async_trait::async_trait]
pub trait MailTransport: Send + Sync {
    /// Hand the email over for delivery. Failures are returned, never retried.
    async fn deliver(&self, email: &ReminderEmail) -> Result<(), NotifyError>;

    /// Human-readable name for logs (e.g., "smtp").
    fn transport_name(&self) -> &str;
}
