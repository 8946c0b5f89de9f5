//! Transport double shared by unit tests

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::cluster::Transport;
use crate::error::TransportError;
use crate::registry::{ActorId, NodeId, PushRequest, Recipients};

/// A push observed by [`RecordingTransport`]
#[derive(Debug, Clone, PartialEq)]
pub struct PushCall {
    pub node: NodeId,
    pub recipients: Recipients,
    pub request: PushRequest,
}

impl PushCall {
    /// Addressed actors, sorted for order-independent assertions
    pub fn sorted_actors(&self) -> Vec<ActorId> {
        match &self.recipients {
            Recipients::Actors(actors) => {
                let mut actors = actors.clone();
                actors.sort_unstable();
                actors
            }
            Recipients::AllSessions => Vec::new(),
        }
    }
}

/// Records every push; selected nodes fail or stall
#[derive(Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<PushCall>>,
    failing: Mutex<HashSet<NodeId>>,
    stalled: Mutex<HashSet<NodeId>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every push for `delay` before answering
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn fail_node(&self, node: &str) {
        self.failing.lock().insert(NodeId::from(node));
    }

    /// Pushes to this node never complete
    pub fn stall_node(&self, node: &str) {
        self.stalled.lock().insert(NodeId::from(node));
    }

    pub fn calls(&self) -> Vec<PushCall> {
        self.calls.lock().clone()
    }

    pub fn call_to(&self, node: &str) -> Option<PushCall> {
        let node = NodeId::from(node);
        self.calls.lock().iter().find(|c| c.node == node).cloned()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

/// Decrements the in-flight count even when the push future is dropped
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn push_to_node(
        &self,
        node: &NodeId,
        recipients: Recipients,
        request: &PushRequest,
    ) -> Result<(), TransportError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _in_flight = InFlight(&self.in_flight);

        self.calls.lock().push(PushCall {
            node: node.clone(),
            recipients,
            request: request.clone(),
        });

        let stalled = self.stalled.lock().contains(node);
        if stalled {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let failing = self.failing.lock().contains(node);
        if failing {
            Err(TransportError::Unreachable(format!("{} is down", node)))
        } else {
            Ok(())
        }
    }
}
