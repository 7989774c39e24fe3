use serde::Serialize;

/// Counters for one completed reminder cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Nodes returned by the cluster.
    pub scanned: usize,
    /// Nodes currently offline.
    pub offline: usize,
    /// Offline nodes with a manual-disconnect cause.
    pub manual: usize,
    /// Manual disconnects whose operator could not be determined or found.
    pub unattributed: usize,
    /// Resolved operators without an email address.
    pub no_address: usize,
    /// Reminders handed to the mail transport.
    pub sent: usize,
}
