//! reminder-worker: mails operators about nodes they left offline.
//!
//! Every cycle (default two hours) it lists the cluster's nodes, finds the
//! ones an operator disconnected by hand and sends that operator a reminder.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::watch;
use tracing::info;

use nodenag_core::config::{load_dotenv, Config};
use nodenag_notify::{
    LogTransport, MailSettings, MailTransport, NotificationSender, ReminderTemplates, SmtpMailer,
};
use nodenag_reminder::{
    run_cycle, run_periodic, ClusterApiClient, FileDirectory, ReminderScheduler, UserDirectory,
};

// ── CLI ─────────────────────────────────────────────────────────────

/// Offline node reminder worker.
#[derive(Parser, Debug)]
#[command(name = "reminder-worker", version, about)]
struct Cli {
    /// Seconds between reminder cycles (overrides REMINDER_INTERVAL_SECS).
    #[arg(long)]
    interval_secs: Option<u64>,

    /// Run a single cycle and exit.
    #[arg(long)]
    once: bool,

    /// Log reminders instead of sending them.
    #[arg(long)]
    dry_run: bool,

    /// YAML operator directory (overrides OPERATORS_FILE).
    #[arg(long)]
    operators_file: Option<PathBuf>,

    /// YAML subject/body templates (overrides MAIL_TEMPLATES).
    #[arg(long)]
    templates: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(secs) = self.interval_secs {
            config.reminder.interval_secs = secs;
        }
        if let Some(path) = &self.operators_file {
            config.reminder.operators_file = Some(path.clone());
        }
        if let Some(path) = &self.templates {
            config.mail.templates_file = Some(path.clone());
        }
    }
}

// ── wiring ──────────────────────────────────────────────────────────

fn build_sender(config: &Config, dry_run: bool) -> anyhow::Result<NotificationSender> {
    let transport: Arc<dyn MailTransport> = if dry_run {
        info!("dry run: reminders will be logged, not sent");
        Arc::new(LogTransport)
    } else {
        let credentials = match (&config.smtp.username, &config.smtp.password) {
            (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
            _ => None,
        };
        Arc::new(SmtpMailer::from_config(
            &config.smtp.host,
            Some(config.smtp.port),
            config.smtp.tls,
            credentials,
        )?)
    };

    let templates = match &config.mail.templates_file {
        Some(path) => ReminderTemplates::from_yaml_file(path)?,
        None => ReminderTemplates::english(),
    };

    let settings = MailSettings {
        admin_address: config.mail.admin_address.clone(),
        reply_to: config.mail.reply_to.clone(),
        default_suffix: config.mail.default_suffix.clone(),
    };

    Ok(NotificationSender::new(transport, settings, templates))
}

fn build_scheduler(config: &Config, dry_run: bool) -> anyhow::Result<ReminderScheduler> {
    let cluster = Arc::new(ClusterApiClient::from_config(&config.cluster)?);

    let directory: Arc<dyn UserDirectory> = match &config.reminder.operators_file {
        Some(path) => Arc::new(FileDirectory::load(path)?),
        None => cluster.clone(),
    };

    let sender = build_sender(config, dry_run)?;
    Ok(ReminderScheduler::new(cluster, directory, sender))
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    cli.apply(&mut config);
    config.validate()?;
    config.log_summary();
    tracing::debug!(config = %config.redacted_summary(), "effective configuration");

    let scheduler = Arc::new(build_scheduler(&config, cli.dry_run)?);

    if cli.once {
        run_cycle(&scheduler).await?;
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let reminder_loop = tokio::spawn(run_periodic(
        scheduler,
        config.reminder.interval(),
        shutdown_rx,
    ));

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");
    let _ = shutdown_tx.send(true);
    reminder_loop.await?;

    info!("reminder-worker exited cleanly");
    Ok(())
}
