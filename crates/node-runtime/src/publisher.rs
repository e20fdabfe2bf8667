//! Periodic export of in-process counters to Prometheus.
//!
//! The mux and the chains keep plain atomic counters. Each tick the
//! publisher snapshots them and adds the difference since the previous tick
//! to the Prometheus counters, and sets the gauges outright.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

use sc_01_chain_mux::MuxMetricsSnapshot;
use sc_02_sqlchain::ChainStatsSnapshot;
use shared_types::DatabaseId;
use sqlchain_telemetry::metrics::{
    CHAIN_BINLOG_OFFSET, CHAIN_EVENTS, CHAIN_HEIGHT, MUX_CHAIN_REJECTIONS, MUX_DISPATCHED,
    MUX_REGISTERED_CHAINS, MUX_ROUTING_FAILURES,
};

use crate::dbms::Dbms;

/// Remembers the last published snapshots.
#[derive(Debug, Default)]
pub struct MetricsPublisher {
    mux: MuxMetricsSnapshot,
    chains: HashMap<DatabaseId, ChainStatsSnapshot>,
}

impl MetricsPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, mux: MuxMetricsSnapshot, chains: &[(DatabaseId, ChainStatsSnapshot)]) {
        MUX_DISPATCHED.inc_by(mux.dispatched.saturating_sub(self.mux.dispatched));
        MUX_ROUTING_FAILURES.inc_by(mux.routing_failures.saturating_sub(self.mux.routing_failures));
        MUX_CHAIN_REJECTIONS.inc_by(mux.chain_rejections.saturating_sub(self.mux.chain_rejections));
        MUX_REGISTERED_CHAINS.set(mux.registered_chains as i64);
        self.mux = mux;

        for (database_id, stats) in chains {
            let previous = self.chains.get(database_id).copied().unwrap_or_default();
            let database = database_id.as_str();

            CHAIN_HEIGHT
                .with_label_values(&[database])
                .set(stats.height as i64);
            CHAIN_BINLOG_OFFSET
                .with_label_values(&[database])
                .set(stats.binlog_offset as i64);

            let events = [
                ("block_accepted", stats.blocks_accepted, previous.blocks_accepted),
                ("block_rejected", stats.blocks_rejected, previous.blocks_rejected),
                ("query_committed", stats.queries_committed, previous.queries_committed),
                ("query_rejected", stats.queries_rejected, previous.queries_rejected),
                ("billing_signed", stats.billing_signed, previous.billing_signed),
            ];
            for (event, now, before) in events {
                let delta = now.saturating_sub(before);
                if delta > 0 {
                    CHAIN_EVENTS
                        .with_label_values(&[database, event])
                        .inc_by(delta);
                }
            }
        }

        // Dropped databases fall out here
        self.chains = chains.iter().cloned().collect();
    }
}

/// Publish every `interval` until `shutdown` flips.
pub async fn run(dbms: Arc<Dbms>, interval: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut publisher = MetricsPublisher::new();
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let chains = dbms.snapshots();
                publisher.publish(dbms.mux().metrics(), &chains);
                debug!(chains = chains.len(), "[Metrics] Published snapshot");
            }
            _ = shutdown.changed() => {
                info!("[Metrics] Shutdown signal received");
                break;
            }
        }
    }
}
