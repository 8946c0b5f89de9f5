//! Per-node push fan-out
//!
//! One broadcast becomes one transport call per involved node. Calls run
//! concurrently and are joined before the broadcast completes; a failing
//! node is recorded and never aborts the others.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};

use crate::cluster::Transport;
use crate::config::ChannelConfig;
use crate::error::TransportError;
use crate::registry::{NodeId, PushRequest, Recipients};

use super::report::{DispatchReport, NodeFailure};

/// Issues per-node pushes through a [`Transport`]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    timeout: Duration,
    max_concurrent: usize,
}

impl Dispatcher {
    /// Create a dispatcher using the timeout and concurrency limit of `config`
    pub fn new(transport: Arc<dyn Transport>, config: &ChannelConfig) -> Self {
        Self {
            transport,
            timeout: config.dispatch_timeout,
            max_concurrent: config.max_concurrent_dispatches,
        }
    }

    /// Push `request` to every target node and wait for all of them
    ///
    /// No retries: a node that fails or times out is reported in
    /// [`DispatchReport::failed`]. A timed-out push is only abandoned here;
    /// the transport may still complete it on the node.
    pub async fn dispatch(
        &self,
        targets: Vec<(NodeId, Recipients)>,
        request: &PushRequest,
    ) -> DispatchReport {
        if targets.is_empty() {
            return DispatchReport::default();
        }

        let limit = match self.max_concurrent {
            0 => targets.len(),
            n => n,
        };

        let outcomes: Vec<(NodeId, Result<(), TransportError>)> = stream::iter(targets)
            .map(|(node, recipients)| async move {
                let result = self.push_one(&node, recipients, request).await;
                (node, result)
            })
            .buffer_unordered(limit)
            .collect()
            .await;

        let mut report = DispatchReport::default();
        for (node, result) in outcomes {
            match result {
                Ok(()) => report.delivered.push(node),
                Err(error) => {
                    tracing::warn!(node = %node, error = %error, "Push to node failed");
                    report.failed.push(NodeFailure { node, error });
                }
            }
        }

        report
    }

    async fn push_one(
        &self,
        node: &NodeId,
        recipients: Recipients,
        request: &PushRequest,
    ) -> Result<(), TransportError> {
        tracing::debug!(
            node = %node,
            route = ?request.route,
            actors = ?recipients.actor_count(),
            "Pushing to node"
        );

        let push = self.transport.push_to_node(node, recipients, request);
        if self.timeout.is_zero() {
            return push.await;
        }

        match tokio::time::timeout(self.timeout, push).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::registry::PushOptions;
    use crate::test_support::RecordingTransport;

    fn request() -> PushRequest {
        PushRequest::new("onChat", Bytes::from_static(b"hi"), PushOptions::default())
    }

    fn targets(nodes: &[&str]) -> Vec<(NodeId, Recipients)> {
        nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId::from(*node), Recipients::Actors(vec![i as u64])))
            .collect()
    }

    #[tokio::test]
    async fn test_one_call_per_target() {
        let transport = Arc::new(RecordingTransport::new());
        let dispatcher = Dispatcher::new(transport.clone(), &ChannelConfig::default());

        let report = dispatcher
            .dispatch(targets(&["fe-1", "fe-2", "fe-3"]), &request())
            .await;

        assert!(report.is_success());
        assert_eq!(report.delivered.len(), 3);
        assert_eq!(transport.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_targets_issue_no_calls() {
        let transport = Arc::new(RecordingTransport::new());
        let dispatcher = Dispatcher::new(transport.clone(), &ChannelConfig::default());

        let report = dispatcher.dispatch(Vec::new(), &request()).await;

        assert_eq!(report, DispatchReport::default());
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let transport = Arc::new(RecordingTransport::new());
        transport.fail_node("fe-2");
        let dispatcher = Dispatcher::new(transport.clone(), &ChannelConfig::default());

        let report = dispatcher
            .dispatch(targets(&["fe-1", "fe-2", "fe-3"]), &request())
            .await;

        assert_eq!(report.delivered.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].node, NodeId::from("fe-2"));
        assert_eq!(transport.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_stalled_node_times_out() {
        let transport = Arc::new(RecordingTransport::new());
        transport.stall_node("fe-1");
        let config = ChannelConfig::default().dispatch_timeout(Duration::from_millis(50));
        let dispatcher = Dispatcher::new(transport.clone(), &config);

        let report = dispatcher
            .dispatch(targets(&["fe-1", "fe-2"]), &request())
            .await;

        assert_eq!(report.delivered, vec![NodeId::from("fe-2")]);
        assert_eq!(report.failed[0].error, TransportError::Timeout);
        assert_eq!(transport.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_zero_timeout_waits_for_transport() {
        let transport = Arc::new(RecordingTransport::with_delay(Duration::from_millis(40)));
        let config = ChannelConfig::default().dispatch_timeout(Duration::ZERO);
        let dispatcher = Dispatcher::new(transport.clone(), &config);

        let report = dispatcher
            .dispatch(targets(&["fe-1", "fe-2"]), &request())
            .await;

        assert!(report.is_success());
        assert_eq!(report.delivered.len(), 2);
    }

    #[tokio::test]
    async fn test_pushes_run_concurrently() {
        let transport = Arc::new(RecordingTransport::with_delay(Duration::from_millis(30)));
        let dispatcher = Dispatcher::new(transport.clone(), &ChannelConfig::default());

        dispatcher
            .dispatch(targets(&["fe-1", "fe-2", "fe-3"]), &request())
            .await;

        assert_eq!(transport.max_in_flight(), 3);
    }

    #[tokio::test]
    async fn test_concurrency_limit() {
        let transport = Arc::new(RecordingTransport::with_delay(Duration::from_millis(10)));
        let config = ChannelConfig::default().max_concurrent_dispatches(1);
        let dispatcher = Dispatcher::new(transport.clone(), &config);

        let report = dispatcher
            .dispatch(targets(&["fe-1", "fe-2", "fe-3"]), &request())
            .await;

        assert!(report.is_success());
        assert_eq!(transport.max_in_flight(), 1);
    }
}
