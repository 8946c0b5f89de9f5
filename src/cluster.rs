//! Cluster collaborators
//!
//! The channel layer does not own sockets, transports or service discovery.
//! It reaches them through the traits in this module:
//!
//! - [`SessionLookup`] tells which frontend node an actor is connected to
//! - [`Transport`] carries a push to a frontend node
//! - [`NodeDirectory`] lists the live frontend nodes of a server type
//!
//! In-memory implementations of the lookup and directory traits are provided
//! for single-process deployments and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::TransportError;
use crate::registry::{ActorId, NodeId, PushRequest, Recipients};

/// Resolves the frontend node an actor's session lives on
#[async_trait]
pub trait SessionLookup: Send + Sync {
    /// Returns `None` if the actor is not connected anywhere
    async fn resolve_node(&self, actor_id: ActorId) -> Option<NodeId>;
}

/// Delivers a push to the sessions on one frontend node
#[async_trait]
pub trait Transport: Send + Sync {
    async fn push_to_node(
        &self,
        node: &NodeId,
        recipients: Recipients,
        request: &PushRequest,
    ) -> Result<(), TransportError>;
}

/// Lists live frontend nodes by server type
#[async_trait]
pub trait NodeDirectory: Send + Sync {
    async fn nodes_of_type(&self, server_type: &str) -> Vec<NodeId>;
}

/// Session table kept in process memory
///
/// The session layer calls [`connect`](Self::connect) and
/// [`disconnect`](Self::disconnect) as clients come and go.
#[derive(Debug, Default)]
pub struct LocalSessions {
    sessions: RwLock<HashMap<ActorId, NodeId>>,
}

impl LocalSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that an actor is connected to a node
    ///
    /// Returns the node it was previously connected to, if any.
    pub fn connect(&self, actor_id: ActorId, node: impl Into<NodeId>) -> Option<NodeId> {
        let node = node.into();
        tracing::trace!(actor_id = actor_id, node = %node, "Session connected");
        self.sessions.write().insert(actor_id, node)
    }

    /// Forget an actor's session
    pub fn disconnect(&self, actor_id: ActorId) -> bool {
        self.sessions.write().remove(&actor_id).is_some()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }
}

#[async_trait]
impl SessionLookup for LocalSessions {
    async fn resolve_node(&self, actor_id: ActorId) -> Option<NodeId> {
        self.sessions.read().get(&actor_id).cloned()
    }
}

/// Node directory with a fixed (but replaceable) node list per server type
#[derive(Debug, Default)]
pub struct StaticDirectory {
    nodes: RwLock<HashMap<String, Vec<NodeId>>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set_nodes`](Self::set_nodes)
    pub fn with_nodes<I, N>(self, server_type: impl Into<String>, nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<NodeId>,
    {
        self.set_nodes(server_type, nodes);
        self
    }

    /// Replace the node list for a server type
    pub fn set_nodes<I, N>(&self, server_type: impl Into<String>, nodes: I)
    where
        I: IntoIterator<Item = N>,
        N: Into<NodeId>,
    {
        let nodes = nodes.into_iter().map(Into::into).collect();
        self.nodes.write().insert(server_type.into(), nodes);
    }
}

#[async_trait]
impl NodeDirectory for StaticDirectory {
    async fn nodes_of_type(&self, server_type: &str) -> Vec<NodeId> {
        self.nodes
            .read()
            .get(server_type)
            .cloned()
            .unwrap_or_default()
    }
}
