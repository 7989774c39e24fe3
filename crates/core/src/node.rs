//! Cluster node model and offline-cause attribution.
//!
//! Nodes are read-only snapshots handed over by the cluster collaborator.
//! The only thing derived from them here is *who* took a node offline,
//! which is recovered from the free-text reason of a manual disconnect.

use serde::{Deserialize, Serialize};

/// Leading phrase of a manual-disconnect reason, e.g.
/// `"Disconnected by alice : going on break"`.
///
/// This is an English, non-localized phrase written by the cluster manager.
/// Reasons recorded under another locale will not be attributed.
pub const DISCONNECTED_BY_PREFIX: &str = "Disconnected by ";

/// Identifier of an operator in the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatorId(String);

impl OperatorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for OperatorId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OperatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a node is offline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OfflineCause {
    /// An operator disconnected the node by hand.
    Manual { reason: String },
    /// The cluster took the node offline itself (channel loss, health check,
    /// launch failure, idle shutdown...).
    Automated {
        kind: String,
        description: Option<String>,
    },
    /// A cause was recorded but its kind is not known.
    Unknown,
}

impl OfflineCause {
    /// The operator responsible for this cause, if one can be attributed.
    ///
    /// Only manual disconnects are attributable; automated and unknown causes
    /// always return `None`.
    pub fn caused_by(&self) -> Option<OperatorId> {
        match self {
            OfflineCause::Manual { reason } => parse_operator_id(reason),
            OfflineCause::Automated { .. } | OfflineCause::Unknown => None,
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, OfflineCause::Manual { .. })
    }
}

/// Extract the operator id from a manual-disconnect reason.
///
/// The reason must start with [`DISCONNECTED_BY_PREFIX`]; the id is the token
/// that follows it, up to the next whitespace character. Returns `None` when
/// the prefix is missing or the token is empty.
pub fn parse_operator_id(reason: &str) -> Option<OperatorId> {
    let rest = reason.strip_prefix(DISCONNECTED_BY_PREFIX)?;
    let token = rest.split(char::is_whitespace).next().unwrap_or("");
    if token.is_empty() {
        return None;
    }
    Some(OperatorId::new(token))
}

/// A cluster worker as seen at scan time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub display_name: String,
    pub offline: bool,
    pub offline_cause: Option<OfflineCause>,
}

impl Node {
    pub fn online(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            offline: false,
            offline_cause: None,
        }
    }

    pub fn offline(display_name: impl Into<String>, cause: Option<OfflineCause>) -> Self {
        Self {
            display_name: display_name.into(),
            offline: true,
            offline_cause: cause,
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    pub fn offline_cause(&self) -> Option<&OfflineCause> {
        self.offline_cause.as_ref()
    }
}
