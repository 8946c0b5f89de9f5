//! Node-grouped push dispatch
//!
//! Channel members are spread over many frontend nodes. A push to a set of
//! actors is grouped by owning node and sent as a single transport call per
//! node:
//!
//! ```text
//!   members snapshot           BroadcastTarget               Transport
//!  ┌────────────────┐      ┌─────────────────────┐
//!  │ 101 -> fe-1    │      │ fe-1: [101, 103]    │ ──► push_to_node(fe-1, ..)
//!  │ 102 -> fe-2    │ ───► │ fe-2: [102]         │ ──► push_to_node(fe-2, ..)
//!  │ 103 -> fe-1    │      └─────────────────────┘
//!  └────────────────┘             Dispatcher: concurrent, joined
//! ```
//!
//! The payload is a `bytes::Bytes` buffer, so every per-node call shares the
//! same allocation.

pub mod dispatcher;
pub mod report;
pub mod target;

pub use dispatcher::Dispatcher;
pub use report::{DispatchReport, NodeFailure};
pub use target::BroadcastTarget;
