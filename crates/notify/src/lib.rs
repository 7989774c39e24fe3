//! Reminder email construction and delivery.
//!
//! This crate provides:
//! - `MailTransport` trait for pluggable delivery backends
//! - SMTP transport via `lettre`, plus a log-only transport for dry runs
//! - Minijinja templates for the localized subject and body fragments
//! - `NotificationSender`, which turns (operator address, node name) into a
//!   delivered reminder

pub mod dry_run;
pub mod email;
pub mod sender;
pub mod templating;
pub mod traits;

pub use dry_run::LogTransport;
pub use email::SmtpMailer;
pub use sender::{normalize_recipient, MailSettings, NotificationSender};
pub use templating::ReminderTemplates;
pub use traits::{MailTransport, NotifyError, ReminderEmail};
