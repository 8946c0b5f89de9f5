//! Aggregate outcome of a fan-out

use crate::error::{ChannelError, Result, TransportError};
use crate::registry::NodeId;

/// A node whose push failed, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFailure {
    pub node: NodeId,
    pub error: TransportError,
}

/// Per-node outcome of one broadcast or multi-push
///
/// Delivery is best effort: a failure on one node never stops the others,
/// so a report can hold both delivered and failed nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Nodes that accepted the push
    pub delivered: Vec<NodeId>,
    /// Nodes whose push failed
    pub failed: Vec<NodeFailure>,
}

impl DispatchReport {
    /// Total number of nodes a push was issued to
    pub fn node_count(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }

    /// True if no node failed
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.failed.iter().map(|f| &f.node)
    }

    /// Turn the report into the aggregate outcome of the call
    ///
    /// Any failed node makes the whole call fail with
    /// [`ChannelError::NodeUnreachable`], carrying this report.
    pub fn into_result(self) -> Result<DispatchReport> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ChannelError::NodeUnreachable(self))
        }
    }
}
