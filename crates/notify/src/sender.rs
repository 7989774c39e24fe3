//! Builds reminder emails and hands them to a [`MailTransport`].

use std::sync::Arc;

use crate::templating::ReminderTemplates;
use crate::traits::{MailTransport, NotifyError, ReminderEmail};

/// Envelope settings shared by every reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    /// Sender address.
    pub admin_address: String,
    /// Optional `Reply-To`; blank values are ignored.
    pub reply_to: Option<String>,
    /// Appended to recipient addresses without an '@' (must itself contain '@').
    pub default_suffix: Option<String>,
}

impl MailSettings {
    pub fn new(admin_address: impl Into<String>) -> Self {
        Self {
            admin_address: admin_address.into(),
            reply_to: None,
            default_suffix: None,
        }
    }
}

/// Complete a bare user name into a deliverable address.
///
/// The suffix is appended only when `address` has no '@' and the suffix
/// itself contains one; otherwise `address` is returned unchanged.
pub fn normalize_recipient(address: &str, default_suffix: Option<&str>) -> String {
    match default_suffix {
        Some(suffix) if !address.contains('@') && suffix.contains('@') => {
            format!("{address}{suffix}")
        }
        _ => address.to_string(),
    }
}

/// Stateless reminder formatter in front of a mail transport.
pub struct NotificationSender {
    transport: Arc<dyn MailTransport>,
    settings: MailSettings,
    templates: ReminderTemplates,
}

impl NotificationSender {
    pub fn new(
        transport: Arc<dyn MailTransport>,
        settings: MailSettings,
        templates: ReminderTemplates,
    ) -> Self {
        Self {
            transport,
            settings,
            templates,
        }
    }

    /// Render the reminder for `node_name` addressed to `operator_address`.
    pub fn compose(
        &self,
        operator_address: &str,
        node_name: &str,
    ) -> Result<ReminderEmail, NotifyError> {
        let reply_to = self
            .settings
            .reply_to
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        Ok(ReminderEmail {
            from: self.settings.admin_address.clone(),
            to: normalize_recipient(operator_address, self.settings.default_suffix.as_deref()),
            reply_to,
            subject: self.templates.render_subject()?,
            body: self.templates.render_body(node_name)?,
        })
    }

    /// Send a reminder that `node_name` is still offline.
    ///
    /// Transport failures are returned to the caller unchanged.
    pub async fn send(&self, operator_address: &str, node_name: &str) -> Result<(), NotifyError> {
        let email = self.compose(operator_address, node_name)?;
        tracing::debug!(
            transport = self.transport.transport_name(),
            to = %email.to,
            node = node_name,
            "sending offline reminder"
        );
        self.transport.deliver(&email).await
    }
}
