//! Error types
//!
//! Errors surfaced by channel, service and dispatch operations.

use crate::dispatch::DispatchReport;
use crate::registry::ActorId;

/// Result type for channel operations
pub type Result<T> = std::result::Result<T, ChannelError>;

/// Error type for channel and service operations
#[derive(Debug, Clone)]
pub enum ChannelError {
    /// Actor has no known session on any node
    NotConnected(ActorId),
    /// Actor is not a member of the channel
    NotAMember(ActorId),
    /// A channel with this name is already registered
    ChannelAlreadyExists(String),
    /// Channel was destroyed; the handle is stale
    ChannelDestroyed(String),
    /// At least one per-node dispatch failed
    ///
    /// The report lists the nodes that did receive the push as well as the
    /// ones that failed. Successful deliveries are not rolled back.
    NodeUnreachable(DispatchReport),
}

impl std::fmt::Display for ChannelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelError::NotConnected(actor_id) => {
                write!(f, "Actor not connected: {}", actor_id)
            }
            ChannelError::NotAMember(actor_id) => {
                write!(f, "Actor is not a channel member: {}", actor_id)
            }
            ChannelError::ChannelAlreadyExists(name) => {
                write!(f, "Channel already exists: {}", name)
            }
            ChannelError::ChannelDestroyed(name) => write!(f, "Channel destroyed: {}", name),
            ChannelError::NodeUnreachable(report) => write!(
                f,
                "Delivery failed on {} of {} nodes",
                report.failed.len(),
                report.node_count()
            ),
        }
    }
}

impl std::error::Error for ChannelError {}

/// Error returned by a [`Transport`](crate::cluster::Transport) for one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Node could not be reached
    Unreachable(String),
    /// Node was reached but refused the push
    Rejected(String),
    /// Push did not complete within the dispatch timeout
    Timeout,
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Unreachable(reason) => write!(f, "Node unreachable: {}", reason),
            TransportError::Rejected(reason) => write!(f, "Push rejected: {}", reason),
            TransportError::Timeout => write!(f, "Push timed out"),
        }
    }
}

impl std::error::Error for TransportError {}
