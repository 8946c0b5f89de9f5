//! # channel-rs
//!
//! Named channels and node-grouped broadcast for multi-process real-time
//! servers.
//!
//! Clients connect to one of many frontend nodes; game logic runs
//! elsewhere. Backend code addresses a named group of actors (a
//! [`Channel`]) without knowing which frontend each actor's socket lives on.
//! A push is grouped by owning node and sent as one transport call per node,
//! concurrently, with per-node failures isolated.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use channel_rs::cluster::{LocalSessions, StaticDirectory, Transport};
//! use channel_rs::{ChannelService, Message, PushOptions};
//!
//! # async fn run(transport: Arc<dyn Transport>) -> channel_rs::Result<()> {
//! let sessions = Arc::new(LocalSessions::new());
//! let directory = Arc::new(StaticDirectory::new().with_nodes("connector", ["fe-1"]));
//! let service = ChannelService::new(sessions.clone(), transport, directory);
//!
//! sessions.connect(101, "fe-1");
//! let room = service.get_channel("room1", true).expect("created");
//! room.add(101).await?;
//! room.broadcast(Message::routed("onChat", &b"hi"[..]), PushOptions::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! The crate emits `tracing` events and never installs a subscriber.

pub mod cluster;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod registry;

#[cfg(test)]
mod test_support;

pub use cluster::{NodeDirectory, SessionLookup, Transport};
pub use config::ChannelConfig;
pub use dispatch::{DispatchReport, NodeFailure};
pub use error::{ChannelError, Result, TransportError};
pub use registry::{
    ActorId, Channel, ChannelService, ChannelState, MemberRecord, Message, NodeId, PushOptions,
    PushRequest, Recipients,
};
