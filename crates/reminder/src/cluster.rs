//! Capabilities the reminder cycle consumes from its environment.

use nodenag_core::{Node, Operator, OperatorId};

use crate::error::ClusterError;

/// Enumerates the cluster's worker nodes.
#[async_trait::async_trait]
pub trait NodeLister: Send + Sync {
    /// Snapshot of all currently known nodes, in cluster order.
    async fn list_nodes(&self) -> Result<Vec<Node>, ClusterError>;
}

/// Looks operators up in the identity directory.
#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve `id` to an operator, or `None` if the directory has no such
    /// user. Entries are only created when `create_if_missing` is set and the
    /// directory supports it; the reminder cycle always passes `false`.
    async fn resolve_user(
        &self,
        id: &OperatorId,
        create_if_missing: bool,
    ) -> Result<Option<Operator>, ClusterError>;
}
