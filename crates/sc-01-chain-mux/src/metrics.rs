//! Lock-free router counters.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated on every dispatch.
#[derive(Debug, Default)]
pub struct MuxMetrics {
    /// Calls handed to a registered chain instance
    pub dispatched: AtomicU64,
    /// Calls naming a database id with no registered instance
    pub routing_failures: AtomicU64,
    /// Dispatched calls the instance rejected
    pub chain_rejections: AtomicU64,
}

/// Point-in-time copy of [`MuxMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuxMetricsSnapshot {
    pub dispatched: u64,
    pub routing_failures: u64,
    pub chain_rejections: u64,
    pub registered_chains: u64,
}

impl MuxMetrics {
    pub(crate) fn record_dispatch(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_routing_failure(&self) {
        self.routing_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejection(&self) {
        self.chain_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, registered_chains: usize) -> MuxMetricsSnapshot {
        MuxMetricsSnapshot {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            routing_failures: self.routing_failures.load(Ordering::Relaxed),
            chain_rejections: self.chain_rejections.load(Ordering::Relaxed),
            registered_chains: registered_chains as u64,
        }
    }
}
