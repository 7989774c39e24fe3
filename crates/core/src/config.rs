use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key).map(|v| v.to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

/// Default time between reminder cycles.
pub const DEFAULT_REMINDER_INTERVAL_SECS: u64 = 2 * 60 * 60;

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub smtp: SmtpConfig,
    pub mail: MailConfig,
    pub cluster: ClusterConfig,
    pub reminder: ReminderConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `NODENAG_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("NODENAG_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            smtp: SmtpConfig::from_env_profiled(p),
            mail: MailConfig::from_env_profiled(p),
            cluster: ClusterConfig::from_env_profiled(p),
            reminder: ReminderConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Reject settings the worker cannot run with.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.mail.admin_address.trim().is_empty() {
            return Err(CoreError::Config(
                "MAIL_ADMIN_ADDRESS must not be blank".to_string(),
            ));
        }
        if self.reminder.interval_secs == 0 {
            return Err(CoreError::Config(
                "REMINDER_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }
        if let Some(suffix) = &self.mail.default_suffix {
            if !suffix.contains('@') {
                tracing::warn!(
                    suffix = %suffix,
                    "MAIL_DEFAULT_SUFFIX has no '@' and will be ignored"
                );
            }
        }
        Ok(())
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  smtp:      host={}, port={}, tls={}, auth={}",
            self.smtp.host,
            self.smtp.port,
            self.smtp.tls,
            self.smtp.has_credentials()
        );
        tracing::info!(
            "  mail:      from={}, reply_to={}, suffix={}",
            self.mail.admin_address,
            self.mail.reply_to.as_deref().unwrap_or("(none)"),
            self.mail.default_suffix.as_deref().unwrap_or("(none)")
        );
        tracing::info!(
            "  cluster:   url={}, auth={}, timeout={}s",
            self.cluster.url,
            self.cluster.has_credentials(),
            self.cluster.timeout_secs
        );
        tracing::info!(
            "  reminder:  interval={}s, operators_file={}",
            self.reminder.interval_secs,
            self.reminder
                .operators_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(cluster directory)".to_string())
        );
    }

    /// Return a redacted view safe for logging as JSON (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "smtp": {
                "host": self.smtp.host,
                "port": self.smtp.port,
                "tls": self.smtp.tls,
                "auth": self.smtp.has_credentials(),
            },
            "mail": {
                "admin_address": self.mail.admin_address,
                "reply_to": self.mail.reply_to,
                "default_suffix": self.mail.default_suffix,
            },
            "cluster": {
                "url": self.cluster.url,
                "auth": self.cluster.has_credentials(),
                "timeout_secs": self.cluster.timeout_secs,
            },
            "reminder": {
                "interval_secs": self.reminder.interval_secs,
            },
        })
    }
}

// ── SMTP ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// STARTTLS on non-465 ports. Port 465 always uses implicit TLS.
    pub tls: bool,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

impl SmtpConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "SMTP_HOST", "localhost"),
            port: profiled_env_u16(p, "SMTP_PORT", 25),
            tls: profiled_env_bool(p, "SMTP_TLS", false),
            username: profiled_env_opt(p, "SMTP_USERNAME"),
            password: profiled_env_opt(p, "SMTP_PASSWORD"),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}

// ── Mail envelope ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Sender address for every reminder.
    pub admin_address: String,
    pub reply_to: Option<String>,
    /// Appended to recipient addresses that have no '@', e.g. `@example.com`.
    pub default_suffix: Option<String>,
    /// YAML file with localized subject/body templates.
    pub templates_file: Option<PathBuf>,
}

impl MailConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            admin_address: profiled_env_or(p, "MAIL_ADMIN_ADDRESS", "nodenag@localhost"),
            reply_to: profiled_env_opt(p, "MAIL_REPLY_TO"),
            default_suffix: profiled_env_opt(p, "MAIL_DEFAULT_SUFFIX"),
            templates_file: profiled_env_opt(p, "MAIL_TEMPLATES").map(PathBuf::from),
        }
    }
}

// ── Cluster API ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub url: String,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    pub timeout_secs: u64,
}

impl ClusterConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            url: profiled_env_or(p, "CLUSTER_URL", "http://localhost:8080"),
            username: profiled_env_opt(p, "CLUSTER_USERNAME"),
            api_token: profiled_env_opt(p, "CLUSTER_API_TOKEN"),
            timeout_secs: profiled_env_u64(p, "CLUSTER_TIMEOUT_SECS", 30),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.username.is_some() && self.api_token.is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ── Reminder cycle ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    pub interval_secs: u64,
    /// Static operator directory; when unset the cluster API is queried.
    pub operators_file: Option<PathBuf>,
}

impl ReminderConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            interval_secs: profiled_env_u64(
                p,
                "REMINDER_INTERVAL_SECS",
                DEFAULT_REMINDER_INTERVAL_SECS,
            ),
            operators_file: profiled_env_opt(p, "OPERATORS_FILE").map(PathBuf::from),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own profile prefix so parallel tests never share keys.

    #[test]
    fn profiled_keys_take_precedence() {
        env::set_var("CFGTESTA_SMTP_HOST", "mail.internal");
        env::set_var("CFGTESTA_SMTP_PORT", "465");
        env::set_var("CFGTESTA_MAIL_DEFAULT_SUFFIX", "@example.com");
        env::set_var("CFGTESTA_REMINDER_INTERVAL_SECS", "600");

        let cfg = Config::for_profile("cfgtesta");
        assert_eq!(cfg.profile_label(), "CFGTESTA");
        assert_eq!(cfg.smtp.host, "mail.internal");
        assert_eq!(cfg.smtp.port, 465);
        assert_eq!(cfg.mail.default_suffix.as_deref(), Some("@example.com"));
        assert_eq!(cfg.reminder.interval(), Duration::from_secs(600));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn bool_parsing_accepts_common_spellings() {
        env::set_var("CFGTESTB_SMTP_TLS", "Yes");
        assert!(profiled_env_bool("CFGTESTB", "SMTP_TLS", false));
        env::set_var("CFGTESTB_SMTP_TLS", "off");
        assert!(!profiled_env_bool("CFGTESTB", "SMTP_TLS", true));
        env::set_var("CFGTESTB_SMTP_TLS", "maybe");
        assert!(profiled_env_bool("CFGTESTB", "SMTP_TLS", true));
    }

    #[test]
    fn zero_interval_is_rejected() {
        env::set_var("CFGTESTC_REMINDER_INTERVAL_SECS", "0");
        let cfg = Config::for_profile("CFGTESTC");
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("REMINDER_INTERVAL_SECS"), "got: {err}");
    }

    #[test]
    fn blank_admin_address_is_rejected() {
        let mut cfg = Config::for_profile("CFGTESTD");
        cfg.mail.admin_address = "  ".to_string();
        assert!(matches!(cfg.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn redacted_summary_omits_secrets() {
        env::set_var("CFGTESTE_SMTP_PASSWORD", "hunter2");
        env::set_var("CFGTESTE_CLUSTER_API_TOKEN", "tok-123");
        let cfg = Config::for_profile("CFGTESTE");
        let summary = cfg.redacted_summary().to_string();
        assert!(!summary.contains("hunter2"));
        assert!(!summary.contains("tok-123"));
    }
}
