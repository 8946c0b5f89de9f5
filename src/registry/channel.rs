//! Channel implementation
//!
//! A channel is a named group of actors used as a broadcast target. It
//! tracks which frontend node each member is connected to so a push can be
//! grouped into one transport call per node.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use bytes::Bytes;
use parking_lot::{RwLock, RwLockReadGuard};

use crate::cluster::SessionLookup;
use crate::config::ChannelConfig;
use crate::dispatch::{BroadcastTarget, DispatchReport, Dispatcher};
use crate::error::{ChannelError, Result};

use super::members::MemberTable;
use super::types::{ActorId, MemberRecord, Message, PushOptions, PushRequest, Recipients};

/// Name to channel index owned by a [`ChannelService`](super::ChannelService)
pub(super) type ChannelIndex = RwLock<HashMap<String, Arc<Channel>>>;

/// Lifecycle state of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Accepting membership changes and pushes
    Active,
    /// Destroyed; terminal
    Destroyed,
}

/// Statistics for a channel
#[derive(Debug, Clone)]
pub struct ChannelStats {
    /// Number of members
    pub member_count: usize,
    /// Number of distinct nodes members are connected to
    pub node_count: usize,
    /// Current channel state
    pub state: ChannelState,
    /// Time since the channel was created
    pub age: Duration,
}

struct ChannelInner {
    state: ChannelState,
    members: MemberTable,
}

/// A named group of actors
///
/// Obtained from [`ChannelService::create_channel`](super::ChannelService::create_channel)
/// or [`ChannelService::get_channel`](super::ChannelService::get_channel).
/// Once destroyed, every handle to the channel is stale: pushes and `add`
/// fail with [`ChannelError::ChannelDestroyed`], queries return nothing.
pub struct Channel {
    name: String,
    inner: RwLock<ChannelInner>,
    sessions: Arc<dyn SessionLookup>,
    dispatcher: Arc<Dispatcher>,
    index: Weak<ChannelIndex>,
    heavy_query_threshold: usize,
    created_at: Instant,
}

impl Channel {
    pub(super) fn new(
        name: String,
        sessions: Arc<dyn SessionLookup>,
        dispatcher: Arc<Dispatcher>,
        index: Weak<ChannelIndex>,
        config: &ChannelConfig,
    ) -> Self {
        Self {
            name,
            inner: RwLock::new(ChannelInner {
                state: ChannelState::Active,
                members: MemberTable::new(),
            }),
            sessions,
            dispatcher,
            index,
            heavy_query_threshold: config.heavy_query_threshold,
            created_at: Instant::now(),
        }
    }

    /// Channel name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ChannelState {
        self.inner.read().state
    }

    pub fn is_destroyed(&self) -> bool {
        self.state() == ChannelState::Destroyed
    }

    /// Add an actor to the channel
    ///
    /// The actor's node is resolved through the session lookup. Returns
    /// `Ok(true)` if the actor was added or moved to a different node, and
    /// `Ok(false)` if it was already a member on the same node.
    pub async fn add(&self, actor_id: ActorId) -> Result<bool> {
        if self.is_destroyed() {
            return Err(self.destroyed());
        }

        let node_id = self
            .sessions
            .resolve_node(actor_id)
            .await
            .ok_or(ChannelError::NotConnected(actor_id))?;

        let previous = {
            let mut inner = self.inner.write();
            if inner.state == ChannelState::Destroyed {
                return Err(self.destroyed());
            }
            if inner.members.get(actor_id) == Some(&node_id) {
                return Ok(false);
            }
            inner.members.put(actor_id, node_id.clone())
        };

        match previous {
            Some(old) => tracing::debug!(
                channel = %self.name,
                actor_id = actor_id,
                from = %old,
                to = %node_id,
                "Member moved to new node"
            ),
            None => tracing::debug!(
                channel = %self.name,
                actor_id = actor_id,
                node = %node_id,
                "Member added"
            ),
        }

        Ok(true)
    }

    /// Remove an actor from the channel
    ///
    /// Returns `false` if the actor was not a member.
    pub fn leave(&self, actor_id: ActorId) -> bool {
        let removed = self.inner.write().members.remove(actor_id);
        if removed {
            tracing::debug!(channel = %self.name, actor_id = actor_id, "Member left");
        }
        removed
    }

    /// Look up one member
    pub fn get_member(&self, actor_id: ActorId) -> Option<MemberRecord> {
        let inner = self.inner.read();
        inner.members.get(actor_id).map(|node_id| MemberRecord {
            actor_id,
            node_id: node_id.clone(),
        })
    }

    /// Look up several members; ids that are not members are omitted
    ///
    /// Repeated ids yield a single record.
    ///
    /// Heavy for large requests: callers on hot paths should prefer
    /// [`get_member`](Self::get_member).
    pub fn get_members(&self, actor_ids: &[ActorId]) -> Vec<MemberRecord> {
        if actor_ids.len() > self.heavy_query_threshold {
            tracing::debug!(
                channel = %self.name,
                requested = actor_ids.len(),
                "Heavy member query"
            );
        }

        let mut seen = HashSet::with_capacity(actor_ids.len());
        let inner = self.inner.read();
        actor_ids
            .iter()
            .filter(|&&actor_id| seen.insert(actor_id))
            .filter_map(|&actor_id| {
                inner.members.get(actor_id).map(|node_id| MemberRecord {
                    actor_id,
                    node_id: node_id.clone(),
                })
            })
            .collect()
    }

    /// Snapshot of every member
    pub fn members(&self) -> Vec<MemberRecord> {
        self.inner.read().members.entries()
    }

    pub fn member_count(&self) -> usize {
        self.inner.read().members.len()
    }

    /// Get channel statistics
    pub fn stats(&self) -> ChannelStats {
        let inner = self.inner.read();
        let node_count = inner
            .members
            .entries()
            .into_iter()
            .collect::<BroadcastTarget>()
            .node_count();

        ChannelStats {
            member_count: inner.members.len(),
            node_count,
            state: inner.state,
            age: self.created_at.elapsed(),
        }
    }

    /// Destroy the channel
    ///
    /// Drops all members and removes the channel from its service. Calling
    /// this again is a no-op.
    pub fn destroy(&self) {
        let Some(index) = self.index.upgrade() else {
            self.mark_destroyed();
            return;
        };

        // Index first, then membership: a lookup must never find this
        // channel in the index once it is marked destroyed.
        let mut channels = index.write();
        if !self.mark_destroyed() {
            return;
        }
        let is_self = channels
            .get(&self.name)
            .is_some_and(|entry| std::ptr::eq(Arc::as_ptr(entry), self));
        if is_self {
            channels.remove(&self.name);
        }
    }

    /// Flip to `Destroyed` and clear members without touching the index
    ///
    /// Returns `false` if the channel was already destroyed.
    pub(super) fn mark_destroyed(&self) -> bool {
        let members = {
            let mut inner = self.inner.write();
            if inner.state == ChannelState::Destroyed {
                return false;
            }
            inner.state = ChannelState::Destroyed;
            let members = inner.members.len();
            inner.members.clear();
            members
        };

        tracing::info!(channel = %self.name, members = members, "Channel destroyed");
        true
    }

    /// Push a message to every member
    ///
    /// Members are grouped by node and each node receives a single push.
    /// Fails with [`ChannelError::NodeUnreachable`] if any node failed; the
    /// other nodes still receive the message.
    pub async fn broadcast(&self, message: Message, opts: PushOptions) -> Result<DispatchReport> {
        let request = PushRequest::from_message(message, opts);
        let target: BroadcastTarget = {
            let inner = self.read_active()?;
            inner.members.entries().into_iter().collect()
        };

        self.send(target, &request).await
    }

    /// Push a message to one member
    pub async fn push_message(
        &self,
        actor_id: ActorId,
        route: impl Into<String>,
        body: impl Into<Bytes>,
        opts: PushOptions,
    ) -> Result<DispatchReport> {
        let node_id = {
            let inner = self.read_active()?;
            inner
                .members
                .get(actor_id)
                .cloned()
                .ok_or(ChannelError::NotAMember(actor_id))?
        };

        let request = PushRequest::new(route, body, opts);
        self.dispatcher
            .dispatch(vec![(node_id, Recipients::Actors(vec![actor_id]))], &request)
            .await
            .into_result()
    }

    /// Push a message to a subset of members
    ///
    /// Ids that are not members are skipped.
    pub async fn push_messages(
        &self,
        actor_ids: &[ActorId],
        route: impl Into<String>,
        body: impl Into<Bytes>,
        opts: PushOptions,
    ) -> Result<DispatchReport> {
        let target: BroadcastTarget = {
            let inner = self.read_active()?;
            actor_ids
                .iter()
                .filter_map(|&actor_id| {
                    inner
                        .members
                        .get(actor_id)
                        .map(|node_id| MemberRecord::new(actor_id, node_id.clone()))
                })
                .collect()
        };

        let request = PushRequest::new(route, body, opts);
        self.send(target, &request).await
    }

    async fn send(&self, target: BroadcastTarget, request: &PushRequest) -> Result<DispatchReport> {
        tracing::debug!(
            channel = %self.name,
            route = ?request.route,
            nodes = target.node_count(),
            actors = target.actor_count(),
            "Channel push"
        );

        self.dispatcher
            .dispatch(target.into_targets(), request)
            .await
            .into_result()
    }

    fn read_active(&self) -> Result<RwLockReadGuard<'_, ChannelInner>> {
        let inner = self.inner.read();
        if inner.state == ChannelState::Destroyed {
            return Err(self.destroyed());
        }
        Ok(inner)
    }

    fn destroyed(&self) -> ChannelError {
        ChannelError::ChannelDestroyed(self.name.clone())
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("members", &self.member_count())
            .finish()
    }
}
