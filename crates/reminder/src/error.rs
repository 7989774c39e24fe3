use nodenag_core::OperatorId;
use nodenag_notify::NotifyError;

/// Errors raised by the cluster and directory collaborators.
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Directory error: {0}")]
    Directory(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Reasons a reminder cycle did not complete.
#[derive(Debug, thiserror::Error)]
pub enum ReminderError {
    #[error("unable to list cluster nodes")]
    Listing(#[source] ClusterError),

    /// A reminder could not be delivered; the rest of the cycle was skipped.
    #[error("unable to send an email reminder for node '{node}' to '{operator}'")]
    Delivery {
        node: String,
        operator: OperatorId,
        /// Reminders delivered earlier in the same cycle.
        sent: usize,
        #[source]
        source: NotifyError,
    },

    #[error("a reminder cycle is already running")]
    Busy,
}
