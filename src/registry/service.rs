//! Channel service implementation
//!
//! The per-server registry of named channels, plus pushes that do not go
//! through a channel: service-wide broadcast to every frontend node of a
//! type, and pushes to an explicit list of member records.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::RwLock;

use crate::cluster::{NodeDirectory, SessionLookup, Transport};
use crate::config::ChannelConfig;
use crate::dispatch::{BroadcastTarget, DispatchReport, Dispatcher};
use crate::error::{ChannelError, Result};

use super::channel::{Channel, ChannelIndex};
use super::types::{MemberRecord, PushOptions, PushRequest, Recipients};

/// Registry of all channels on one server
///
/// Construct one at server start and share it by `Arc`; there is no global
/// instance. Channels are owned by the service until they are destroyed.
pub struct ChannelService {
    /// Map of channel name to channel
    channels: Arc<ChannelIndex>,

    sessions: Arc<dyn SessionLookup>,
    directory: Arc<dyn NodeDirectory>,
    dispatcher: Arc<Dispatcher>,

    /// Configuration
    config: ChannelConfig,
}

impl ChannelService {
    /// Create a new channel service with default configuration
    pub fn new(
        sessions: Arc<dyn SessionLookup>,
        transport: Arc<dyn Transport>,
        directory: Arc<dyn NodeDirectory>,
    ) -> Self {
        Self::with_config(sessions, transport, directory, ChannelConfig::default())
    }

    /// Create a new channel service with custom configuration
    pub fn with_config(
        sessions: Arc<dyn SessionLookup>,
        transport: Arc<dyn Transport>,
        directory: Arc<dyn NodeDirectory>,
        config: ChannelConfig,
    ) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            sessions,
            directory,
            dispatcher: Arc::new(Dispatcher::new(transport, &config)),
            config,
        }
    }

    /// Get the service configuration
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Create a channel
    ///
    /// Returns an error if a channel with this name already exists.
    pub fn create_channel(&self, name: impl Into<String>) -> Result<Arc<Channel>> {
        let name = name.into();
        let mut channels = self.channels.write();

        if channels.contains_key(&name) {
            return Err(ChannelError::ChannelAlreadyExists(name));
        }

        let channel = self.new_channel(name.clone());
        channels.insert(name.clone(), Arc::clone(&channel));
        tracing::info!(channel = %name, "Channel created");

        Ok(channel)
    }

    /// Get a channel by name, optionally creating it
    ///
    /// Returns `None` if the channel does not exist and `create` is false.
    pub fn get_channel(&self, name: &str, create: bool) -> Option<Arc<Channel>> {
        if let Some(channel) = self.channels.read().get(name) {
            return Some(Arc::clone(channel));
        }
        if !create {
            return None;
        }

        let mut channels = self.channels.write();
        // Another caller may have created it between the two locks
        if let Some(channel) = channels.get(name) {
            return Some(Arc::clone(channel));
        }

        let channel = self.new_channel(name.to_string());
        channels.insert(name.to_string(), Arc::clone(&channel));
        tracing::info!(channel = %name, "Channel created on lookup");

        Some(channel)
    }

    /// Destroy a channel by name
    ///
    /// Destroying a channel that does not exist is a no-op.
    pub fn destroy_channel(&self, name: &str) {
        let mut channels = self.channels.write();
        if let Some(channel) = channels.remove(name) {
            channel.mark_destroyed();
        }
    }

    /// Get total number of channels
    pub fn channel_count(&self) -> usize {
        self.channels.read().len()
    }

    /// Names of all channels, in no particular order
    pub fn channel_names(&self) -> Vec<String> {
        self.channels.read().keys().cloned().collect()
    }

    /// Destroy every channel
    ///
    /// Called at server teardown. Handles still held elsewhere become stale.
    pub fn shutdown(&self) {
        let mut channels = self.channels.write();
        tracing::info!(channels = channels.len(), "Channel service shutting down");
        for (_, channel) in channels.drain() {
            channel.mark_destroyed();
        }
    }

    /// Broadcast to every connected session on every node of a server type
    ///
    /// Channel membership is not consulted. Each node delivers to all of its
    /// sessions, or only bound ones if `opts.binded` is set, after applying
    /// `opts.filter_param` locally.
    pub async fn broadcast(
        &self,
        server_type: &str,
        route: impl Into<String>,
        body: impl Into<Bytes>,
        opts: PushOptions,
    ) -> Result<DispatchReport> {
        let nodes = self.directory.nodes_of_type(server_type).await;
        if nodes.is_empty() {
            tracing::debug!(server_type = server_type, "No nodes to broadcast to");
            return Ok(DispatchReport::default());
        }

        let request = PushRequest::new(route, body, opts);
        tracing::debug!(
            server_type = server_type,
            route = ?request.route,
            nodes = nodes.len(),
            binded = request.opts.binded,
            "Service broadcast"
        );

        let targets = nodes
            .into_iter()
            .map(|node| (node, Recipients::AllSessions))
            .collect();

        self.dispatcher.dispatch(targets, &request).await.into_result()
    }

    /// Push to an explicit list of member records, grouped by node
    ///
    /// Used when the caller already knows where each actor lives and does
    /// not want to maintain a channel for a one-off push.
    pub async fn push_message_by_records(
        &self,
        route: impl Into<String>,
        body: impl Into<Bytes>,
        records: &[MemberRecord],
        opts: PushOptions,
    ) -> Result<DispatchReport> {
        let target: BroadcastTarget = records.iter().cloned().collect();
        let request = PushRequest::new(route, body, opts);

        tracing::debug!(
            route = ?request.route,
            nodes = target.node_count(),
            actors = target.actor_count(),
            "Push by records"
        );

        self.dispatcher
            .dispatch(target.into_targets(), &request)
            .await
            .into_result()
    }

    fn new_channel(&self, name: String) -> Arc<Channel> {
        Arc::new(Channel::new(
            name,
            Arc::clone(&self.sessions),
            Arc::clone(&self.dispatcher),
            Arc::downgrade(&self.channels),
            &self.config,
        ))
    }
}

impl Drop for ChannelService {
    fn drop(&mut self) {
        self.shutdown();
    }
}
