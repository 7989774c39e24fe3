//! Periodic driver for the reminder cycle.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::error::ReminderError;
use crate::scheduler::{CycleReport, ReminderScheduler};

/// Run one cycle and log its outcome the way the host task log expects.
pub async fn run_cycle(scheduler: &ReminderScheduler) -> Result<CycleReport, ReminderError> {
    let start = Instant::now();
    let result = scheduler.execute().await;
    let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    match &result {
        Ok(report) => info!(
            scanned = report.scanned,
            offline = report.offline,
            manual = report.manual,
            unattributed = report.unattributed,
            no_address = report.no_address,
            sent = report.sent,
            duration_ms,
            "reminder cycle completed"
        ),
        Err(e) => error!(error = %e, duration_ms, "reminder cycle failed"),
    }

    result
}

/// Drive `scheduler` every `period` until `shutdown` turns `true`.
///
/// The first cycle starts immediately. Cycles never overlap: a slow cycle
/// pushes the following tick back rather than queueing extra ones. A failed
/// cycle is logged and the loop waits for the next tick. A running cycle is
/// never cancelled; shutdown is observed between cycles.
pub async fn run_periodic(
    scheduler: Arc<ReminderScheduler>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    if *shutdown.borrow() {
        return;
    }
    info!(period_secs = period.as_secs(), "reminder loop starting");

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // Shutdown wins over a tick that became ready during a slow cycle.
        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    info!("reminder loop shutting down");
                    break;
                }
            }
            _ = ticker.tick() => {
                let _ = run_cycle(&scheduler).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use nodenag_core::{Node, Operator, OperatorId};
    use nodenag_notify::{LogTransport, MailSettings, NotificationSender, ReminderTemplates};

    use crate::cluster::{NodeLister, UserDirectory};
    use crate::error::ClusterError;

    /// Counts listings; fails the first `fail_first` of them.
    struct CountingNodes {
        calls: AtomicUsize,
        fail_first: usize,
    }

    #[async_trait::async_trait]
    impl NodeLister for CountingNodes {
        async fn list_nodes(&self) -> Result<Vec<Node>, ClusterError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_first {
                return Err(ClusterError::Config("unreachable".to_string()));
            }
            Ok(vec![Node::online("build-01")])
        }
    }

    struct NoUsers;

    #[async_trait::async_trait]
    impl UserDirectory for NoUsers {
        async fn resolve_user(
            &self,
            _id: &OperatorId,
            _create_if_missing: bool,
        ) -> Result<Option<Operator>, ClusterError> {
            Ok(None)
        }
    }

    fn scheduler(nodes: Arc<CountingNodes>) -> Arc<ReminderScheduler> {
        let sender = NotificationSender::new(
            Arc::new(LogTransport),
            MailSettings::new("jenkins@example.com"),
            ReminderTemplates::english(),
        );
        Arc::new(ReminderScheduler::new(nodes, Arc::new(NoUsers), sender))
    }

    const PERIOD: Duration = Duration::from_secs(2 * 60 * 60);

    #[tokio::test(start_paused = true)]
    async fn runs_immediately_then_every_period() {
        let nodes = Arc::new(CountingNodes {
            calls: AtomicUsize::new(0),
            fail_first: 0,
        });
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(run_periodic(scheduler(nodes.clone()), PERIOD, rx));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(nodes.calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(PERIOD).await;
        assert_eq!(nodes.calls.load(Ordering::SeqCst), 2);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn failed_cycle_does_not_stop_the_loop() {
        let nodes = Arc::new(CountingNodes {
            calls: AtomicUsize::new(0),
            fail_first: 1,
        });
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(run_periodic(scheduler(nodes.clone()), PERIOD, rx));

        tokio::time::sleep(PERIOD + Duration::from_secs(1)).await;
        assert_eq!(nodes.calls.load(Ordering::SeqCst), 2);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_shutdown_sender_stops_the_loop() {
        let nodes = Arc::new(CountingNodes {
            calls: AtomicUsize::new(0),
            fail_first: 0,
        });
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(run_periodic(scheduler(nodes), PERIOD, rx));
        drop(tx);
        handle.await.unwrap();
    }

    /// Lister whose cycle outlasts the period.
    struct SlowNodes {
        calls: AtomicUsize,
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl NodeLister for SlowNodes {
        async fn list_nodes(&self) -> Result<Vec<Node>, ClusterError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(Vec::new())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_during_slow_cycle_starts_no_further_cycle() {
        for _ in 0..40 {
            let nodes = Arc::new(SlowNodes {
                calls: AtomicUsize::new(0),
                delay: PERIOD * 2,
            });
            let sender = NotificationSender::new(
                Arc::new(LogTransport),
                MailSettings::new("jenkins@example.com"),
                ReminderTemplates::english(),
            );
            let sched = Arc::new(ReminderScheduler::new(nodes.clone(), Arc::new(NoUsers), sender));

            let (tx, rx) = watch::channel(false);
            let handle = tokio::spawn(run_periodic(sched, PERIOD, rx));

            tokio::time::sleep(PERIOD).await;
            tx.send(true).unwrap();
            handle.await.unwrap();

            assert_eq!(nodes.calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn run_cycle_returns_the_report() {
        let nodes = Arc::new(CountingNodes {
            calls: AtomicUsize::new(0),
            fail_first: 0,
        });
        let report = run_cycle(&scheduler(nodes)).await.unwrap();
        assert_eq!(report.scanned, 1);
        assert_eq!(report.sent, 0);
    }
}
