//! # Database Lifecycle
//!
//! Opens and drops chain instances against the node's shared mux.
//!
//! Dropping a database unregisters it first, so new calls fail with a
//! routing error, then waits until no in-flight call still holds the
//! instance. The wait is bounded by `drain_timeout`.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::warn;

use sc_01_chain_mux::MuxService;
use sc_02_sqlchain::{
    ChainConfig, ChainStatsSnapshot, InMemoryPolicyStore, SignatureVerifier, Signer, SqlChain,
    SqlChainApi,
};
use shared_types::DatabaseId;
use sqlchain_telemetry::metrics::DRAIN_DURATION;
use sqlchain_telemetry::{forget_database, log_chain_event, time_histogram};

use crate::container::NodeConfig;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(5);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DbmsError {
    #[error("Database {database_id} already exists")]
    AlreadyExists { database_id: DatabaseId },

    #[error("Database {database_id} not found")]
    NotFound { database_id: DatabaseId },

    #[error("Database {database_id} still has {in_flight} in-flight calls after drain timeout")]
    DrainTimeout {
        database_id: DatabaseId,
        in_flight: usize,
    },
}

/// The databases this node hosts.
pub struct Dbms {
    mux: Arc<MuxService>,
    signer: Arc<dyn Signer>,
    verifier: Arc<dyn SignatureVerifier>,
    policy: Arc<InMemoryPolicyStore>,
    chains: RwLock<BTreeMap<DatabaseId, Arc<SqlChain>>>,
    max_fetch_count: u32,
    drain_timeout: Duration,
}

impl Dbms {
    pub fn new(
        mux: Arc<MuxService>,
        signer: Arc<dyn Signer>,
        verifier: Arc<dyn SignatureVerifier>,
        config: &NodeConfig,
    ) -> Self {
        Self {
            mux,
            signer,
            verifier,
            policy: Arc::new(InMemoryPolicyStore::new()),
            chains: RwLock::new(BTreeMap::new()),
            max_fetch_count: config.max_fetch_count,
            drain_timeout: config.drain_timeout,
        }
    }

    pub fn mux(&self) -> &Arc<MuxService> {
        &self.mux
    }

    /// Project configuration shared by every hosted chain.
    pub fn policy(&self) -> &Arc<InMemoryPolicyStore> {
        &self.policy
    }

    pub fn get(&self, database_id: &DatabaseId) -> Option<Arc<SqlChain>> {
        self.chains.read().get(database_id).cloned()
    }

    pub fn database_ids(&self) -> Vec<DatabaseId> {
        self.chains.read().keys().cloned().collect()
    }

    /// Stats of every hosted chain, ordered by database id.
    pub fn snapshots(&self) -> Vec<(DatabaseId, ChainStatsSnapshot)> {
        self.chains
            .read()
            .iter()
            .map(|(id, chain)| (id.clone(), chain.stats()))
            .collect()
    }

    /// Open an empty chain for `database_id` and register it with the mux.
    pub fn create_database(&self, database_id: DatabaseId) -> Result<Arc<SqlChain>, DbmsError> {
        let mut chains = self.chains.write();
        if chains.contains_key(&database_id) {
            return Err(DbmsError::AlreadyExists { database_id });
        }

        let config =
            ChainConfig::new(database_id.clone()).with_max_fetch_count(self.max_fetch_count);
        let chain = Arc::new(
            SqlChain::new(config, Arc::clone(&self.signer), Arc::clone(&self.verifier))
                .with_policy(self.policy.clone()),
        );

        self.mux.register(database_id.clone(), chain.clone());
        chains.insert(database_id.clone(), Arc::clone(&chain));
        log_chain_event!(info, database_id, "[Dbms] Database created");
        Ok(chain)
    }

    /// Unregister `database_id` and wait for in-flight calls to finish.
    ///
    /// On `DrainTimeout` the database is already unreachable; the instance
    /// is released once the remaining callers drop their handles.
    pub async fn drop_database(&self, database_id: &DatabaseId) -> Result<(), DbmsError> {
        // Unregister under the same guard so a concurrent create of the same
        // id cannot have its fresh binding removed.
        let chain = {
            let mut chains = self.chains.write();
            let chain = chains
                .remove(database_id)
                .ok_or_else(|| DbmsError::NotFound {
                    database_id: database_id.clone(),
                })?;
            drop(self.mux.unregister(database_id));
            chain
        };

        let _timer = time_histogram!(DRAIN_DURATION);
        let deadline = Instant::now() + self.drain_timeout;
        while Arc::strong_count(&chain) > 1 {
            if Instant::now() >= deadline {
                let in_flight = Arc::strong_count(&chain) - 1;
                warn!(
                    database_id = %database_id,
                    in_flight,
                    "[Dbms] Drain timed out, releasing database"
                );
                forget_database(database_id.as_str());
                return Err(DbmsError::DrainTimeout {
                    database_id: database_id.clone(),
                    in_flight,
                });
            }
            tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        }

        forget_database(database_id.as_str());
        log_chain_event!(info, database_id, "[Dbms] Database dropped");
        Ok(())
    }

    /// Drop every database. Returns the ids that failed to drain in time.
    pub async fn shutdown(&self) -> Vec<DatabaseId> {
        let mut stuck = Vec::new();
        for database_id in self.database_ids() {
            if let Err(DbmsError::DrainTimeout { .. }) = self.drop_database(&database_id).await {
                stuck.push(database_id);
            }
        }
        stuck
    }
}
