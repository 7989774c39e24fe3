//! [`ReminderScheduler`]: one scan-and-notify pass over the cluster.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use nodenag_core::{Node, OfflineCause, Operator};
use nodenag_notify::NotificationSender;
use tracing::{debug, info, warn};

use crate::cluster::{NodeLister, UserDirectory};
use crate::error::ReminderError;

use super::report::CycleReport;
use super::state::{ScanGuard, SchedulerState};

/// Default time between cycles.
pub const RECURRENCE_PERIOD: Duration =
    Duration::from_secs(nodenag_core::config::DEFAULT_REMINDER_INTERVAL_SECS);

/// Scans nodes and reminds operators about the ones they left offline.
pub struct ReminderScheduler {
    nodes: Arc<dyn NodeLister>,
    directory: Arc<dyn UserDirectory>,
    sender: NotificationSender,
    scanning: AtomicBool,
}

impl ReminderScheduler {
    pub fn new(
        nodes: Arc<dyn NodeLister>,
        directory: Arc<dyn UserDirectory>,
        sender: NotificationSender,
    ) -> Self {
        Self {
            nodes,
            directory,
            sender,
            scanning: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> SchedulerState {
        if self.scanning.load(Ordering::Acquire) {
            SchedulerState::Scanning
        } else {
            SchedulerState::Idle
        }
    }

    /// Run one reminder cycle.
    ///
    /// Nodes are processed sequentially in listing order. Unattributable
    /// nodes and operators without an address are skipped. The first failed
    /// delivery ends the cycle with [`ReminderError::Delivery`]; nodes after
    /// it are not attempted until the next cycle.
    pub async fn execute(&self) -> Result<CycleReport, ReminderError> {
        let _scan = ScanGuard::acquire(&self.scanning).ok_or(ReminderError::Busy)?;

        let nodes = self
            .nodes
            .list_nodes()
            .await
            .map_err(ReminderError::Listing)?;

        let mut report = CycleReport {
            scanned: nodes.len(),
            ..CycleReport::default()
        };

        for node in &nodes {
            if !node.is_offline() {
                continue;
            }
            report.offline += 1;

            let Some(cause) = node.offline_cause().filter(|c| c.is_manual()) else {
                continue;
            };
            report.manual += 1;

            let Some(operator) = self.taken_offline_by(node, cause).await else {
                report.unattributed += 1;
                continue;
            };

            let Some(address) = operator.email_address() else {
                debug!(
                    node = node.display_name(),
                    operator = %operator.id,
                    "operator has no email address, skipping"
                );
                report.no_address += 1;
                continue;
            };

            if let Err(source) = self.sender.send(address, node.display_name()).await {
                warn!(
                    node = node.display_name(),
                    operator = %operator.id,
                    error = %source,
                    "reminder delivery failed, aborting cycle"
                );
                return Err(ReminderError::Delivery {
                    node: node.display_name().to_string(),
                    operator: operator.id,
                    sent: report.sent,
                    source,
                });
            }

            info!(
                node = node.display_name(),
                operator = %operator.id,
                "offline reminder sent"
            );
            report.sent += 1;
        }

        Ok(report)
    }

    /// Resolve the operator who manually disconnected `node`.
    ///
    /// Directory failures are treated like an unknown operator: the node is
    /// skipped for this cycle.
    async fn taken_offline_by(&self, node: &Node, cause: &OfflineCause) -> Option<Operator> {
        let Some(id) = cause.caused_by() else {
            debug!(
                node = node.display_name(),
                "offline reason does not name an operator, skipping"
            );
            return None;
        };

        match self.directory.resolve_user(&id, false).await {
            Ok(Some(operator)) => Some(operator),
            Ok(None) => {
                debug!(node = node.display_name(), operator = %id, "unknown operator, skipping");
                None
            }
            Err(e) => {
                warn!(
                    node = node.display_name(),
                    operator = %id,
                    error = %e,
                    "operator lookup failed, skipping"
                );
                None
            }
        }
    }
}
