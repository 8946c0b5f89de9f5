//! Channel service configuration

use std::time::Duration;

/// Default upper bound for a single per-node push
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Default request size above which member queries are logged as heavy
pub const DEFAULT_HEAVY_QUERY_THRESHOLD: usize = 1000;

/// Channel service configuration options
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Time allowed for one per-node push before it counts as failed
    ///
    /// Elapsing stops waiting for the node, it does not recall the push: a
    /// node reported as timed out may still deliver. `Duration::ZERO` waits
    /// for the transport indefinitely.
    pub dispatch_timeout: Duration,

    /// Maximum per-node pushes in flight for one broadcast (0 = unlimited)
    pub max_concurrent_dispatches: usize,

    /// Member lookups asking for more ids than this are logged
    pub heavy_query_threshold: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            dispatch_timeout: DEFAULT_DISPATCH_TIMEOUT,
            max_concurrent_dispatches: 0, // Unlimited
            heavy_query_threshold: DEFAULT_HEAVY_QUERY_THRESHOLD,
        }
    }
}

impl ChannelConfig {
    /// Set the per-node dispatch timeout (`Duration::ZERO` disables it)
    pub fn dispatch_timeout(mut self, timeout: Duration) -> Self {
        self.dispatch_timeout = timeout;
        self
    }

    /// Set the per-broadcast concurrency limit
    pub fn max_concurrent_dispatches(mut self, max: usize) -> Self {
        self.max_concurrent_dispatches = max;
        self
    }

    /// Set the heavy member query threshold
    pub fn heavy_query_threshold(mut self, threshold: usize) -> Self {
        self.heavy_query_threshold = threshold;
        self
    }
}
