//! Channel registry
//!
//! The registry owns named channels and tracks, for every member actor, the
//! frontend node its session lives on. Pushes are grouped by node and handed
//! to the [`Dispatcher`](crate::dispatch::Dispatcher), so a broadcast costs
//! one transport call per node rather than one per member.
//!
//! # Architecture
//!
//! ```text
//!                          Arc<ChannelService>
//!                     ┌─────────────────────────┐
//!                     │ channels: HashMap<Name, │
//!                     │   Arc<Channel {         │
//!                     │     members: actor→node │
//!                     │   }>                    │
//!                     │ >                       │
//!                     └───────────┬─────────────┘
//!                                 │
//!         ┌───────────────────────┼───────────────────────┐
//!         │                       │                       │
//!         ▼                       ▼                       ▼
//!   channel.add()          channel.broadcast()     service.broadcast()
//!   SessionLookup          snapshot → group        NodeDirectory
//!         │                       │                       │
//!         └──► MemberTable        └──► Dispatcher ◄───────┘
//!                                        │
//!                                        ▼
//!                            Transport::push_to_node (per node)
//! ```
//!
//! # Locking
//!
//! Membership and the channel index sit behind short-lived
//! `parking_lot::RwLock`s. A broadcast snapshots membership and releases the
//! lock before awaiting any remote call, so adds and leaves never wait on a
//! slow node.
//!
//! Lock order is index, then membership. A channel is marked destroyed
//! while the index write lock is held, so lookups never see a dead channel.

pub mod channel;
pub mod members;
pub mod service;
pub mod types;

pub use channel::{Channel, ChannelState, ChannelStats};
pub use members::MemberTable;
pub use service::ChannelService;
pub use types::{
    ActorId, MemberRecord, Message, NodeId, PushOptions, PushRequest, Recipients,
};
