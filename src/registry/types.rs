//! Identifier and payload types for channel routing
//!
//! This module defines how actors and frontend nodes are identified, and the
//! payloads that are pushed to them.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde_json::{Map, Value};

/// Identifier of a connected client entity
pub type ActorId = u64;

/// Identifier of a frontend node holding client sockets
///
/// Cheap to clone; every member record pointing at the same node can share
/// the allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Arc<str>);

impl NodeId {
    /// Create a new node id
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One channel member: an actor and the node it is connected to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberRecord {
    pub actor_id: ActorId,
    pub node_id: NodeId,
}

impl MemberRecord {
    pub fn new(actor_id: ActorId, node_id: impl Into<NodeId>) -> Self {
        Self {
            actor_id,
            node_id: node_id.into(),
        }
    }
}

/// Channel broadcast payload
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Handled by the client's default channel handler
    Default(Bytes),
    /// Handled by the named client-side route
    Routed { route: String, body: Bytes },
}

impl Message {
    /// Create a routed message
    pub fn routed(route: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Message::Routed {
            route: route.into(),
            body: body.into(),
        }
    }

    /// Create a message for the default handler
    pub fn default_route(body: impl Into<Bytes>) -> Self {
        Message::Default(body.into())
    }
}

/// User-defined push options
///
/// Only `binded` and `filter_param` have a meaning to the receiving node;
/// everything in `extra` is carried to the transport untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PushOptions {
    /// Push only to bound (authenticated) sessions
    pub binded: bool,
    /// Parameters for the receiving node's broadcast filter
    pub filter_param: Option<Value>,
    /// Options this layer does not interpret
    pub extra: Map<String, Value>,
}

impl PushOptions {
    /// Restrict delivery to bound sessions
    pub fn binded(mut self) -> Self {
        self.binded = true;
        self
    }

    /// Set the broadcast filter parameters
    pub fn filter_param(mut self, param: Value) -> Self {
        self.filter_param = Some(param);
        self
    }

    /// Attach an option for the transport
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// The immutable payload shared by every per-node dispatch of one call
///
/// This is cheap to clone since `body` is reference counted.
#[derive(Debug, Clone, PartialEq)]
pub struct PushRequest {
    /// Client route, `None` for the default channel handler
    pub route: Option<String>,
    /// Opaque application payload
    pub body: Bytes,
    /// Push options
    pub opts: PushOptions,
}

impl PushRequest {
    /// Create a routed push request
    pub fn new(route: impl Into<String>, body: impl Into<Bytes>, opts: PushOptions) -> Self {
        Self {
            route: Some(route.into()),
            body: body.into(),
            opts,
        }
    }

    /// Build a push request from a broadcast message
    pub fn from_message(message: Message, opts: PushOptions) -> Self {
        match message {
            Message::Default(body) => Self {
                route: None,
                body,
                opts,
            },
            Message::Routed { route, body } => Self {
                route: Some(route),
                body,
                opts,
            },
        }
    }
}

/// Who a node should deliver a push to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipients {
    /// These actors' sessions on the node
    Actors(Vec<ActorId>),
    /// Every session on the node (bound only if `opts.binded`)
    AllSessions,
}

impl Recipients {
    /// Number of explicitly addressed actors, `None` for all sessions
    pub fn actor_count(&self) -> Option<usize> {
        match self {
            Recipients::Actors(actors) => Some(actors.len()),
            Recipients::AllSessions => None,
        }
    }
}
