//! # SQLChain Service
//!
//! One chain instance. Implements both sides:
//! - [`ChainRpcService`]: peer traffic routed in by the mux
//! - [`SqlChainApi`]: local client submission and status
//!
//! ## Locking
//!
//! Blocks and queries share one `RwLock`, so accepting a block and committing
//! its queries is a single step. The binlog and the billing signing ledger
//! have their own mutexes. Lock order when both are needed: billing, then state.

mod rpc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

use crate::domain::{check_admission, BinLog, BlockStore, ChainConfig, QueryState, QueryTracker, SigningLedger};
use crate::ports::{PolicyStore, SignatureVerifier, Signer, SqlChainApi};
use sc_01_chain_mux::ChainError;
use shared_types::{Block, DatabaseId, Query, QueryId};

/// Blocks and queries, guarded together.
#[derive(Debug, Default)]
pub(crate) struct ChainState {
    pub(crate) blocks: BlockStore,
    pub(crate) queries: QueryTracker,
}

/// Event counters for one chain.
#[derive(Debug, Default)]
pub struct ChainStats {
    pub blocks_accepted: AtomicU64,
    pub blocks_rejected: AtomicU64,
    pub queries_committed: AtomicU64,
    pub queries_rejected: AtomicU64,
    pub billing_signed: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStatsSnapshot {
    pub height: u64,
    pub binlog_offset: u64,
    /// Queries not yet committed or rejected
    pub pending_queries: u64,
    pub acked_queries: u64,
    pub blocks_accepted: u64,
    pub blocks_rejected: u64,
    pub queries_committed: u64,
    pub queries_rejected: u64,
    pub billing_signed: u64,
}

impl ChainStats {
    fn bump(counter: &AtomicU64, by: u64) {
        counter.fetch_add(by, Ordering::Relaxed);
    }
}

/// An in-memory SQLChain replica.
pub struct SqlChain {
    config: ChainConfig,
    signer: Arc<dyn Signer>,
    verifier: Arc<dyn SignatureVerifier>,
    policy: Option<Arc<dyn PolicyStore>>,
    state: RwLock<ChainState>,
    binlog: Mutex<BinLog>,
    billing: Mutex<SigningLedger>,
    stats: ChainStats,
}

impl SqlChain {
    pub fn new(
        config: ChainConfig,
        signer: Arc<dyn Signer>,
        verifier: Arc<dyn SignatureVerifier>,
    ) -> Self {
        info!(
            database_id = %config.database_id,
            max_fetch_count = config.max_fetch_count,
            "[SqlChain] Opened chain"
        );
        Self {
            config,
            signer,
            verifier,
            policy: None,
            state: RwLock::new(ChainState::default()),
            binlog: Mutex::new(BinLog::new()),
            billing: Mutex::new(SigningLedger::new()),
            stats: ChainStats::default(),
        }
    }

    /// Check client submissions against `policy`.
    pub fn with_policy(mut self, policy: Arc<dyn PolicyStore>) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    fn ensure_database(&self, database_id: &DatabaseId) -> Result<(), ChainError> {
        if *database_id != self.config.database_id {
            return Err(ChainError::DatabaseMismatch {
                expected: self.config.database_id.clone(),
                got: database_id.clone(),
            });
        }
        Ok(())
    }

    fn fetch_cap(&self, requested: u32) -> usize {
        requested.min(self.config.max_fetch_count) as usize
    }
}

impl SqlChainApi for SqlChain {
    fn database_id(&self) -> &DatabaseId {
        &self.config.database_id
    }

    fn submit_query(&self, query: Query) -> Result<QueryId, ChainError> {
        self.ensure_database(&query.database_id)?;

        if let Some(policy) = &self.policy {
            let database_id = &self.config.database_id;
            check_admission(&query, |kind, key| policy.get(database_id, kind, key)).map_err(
                |denial| ChainError::PolicyDenied {
                    reason: denial.to_string(),
                },
            )?;
        }

        let id = self.state.write().queries.submit(query)?;
        tracing::debug!(
            database_id = %self.config.database_id,
            query_id = %id,
            "[SqlChain] Query submitted"
        );
        Ok(id)
    }

    fn query_state(&self, query_id: &QueryId) -> Option<QueryState> {
        self.state.read().queries.state(query_id)
    }

    fn head(&self) -> Option<Block> {
        self.state.read().blocks.head().cloned()
    }

    fn height(&self) -> u64 {
        self.state.read().blocks.height()
    }

    fn binlog_offset(&self) -> u64 {
        self.binlog.lock().next_offset()
    }

    fn stats(&self) -> ChainStatsSnapshot {
        let (height, pending_queries, acked_queries) = {
            let state = self.state.read();
            (
                state.blocks.height(),
                state.queries.pending_count() as u64,
                state.queries.acked_count() as u64,
            )
        };
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        ChainStatsSnapshot {
            height,
            binlog_offset: self.binlog_offset(),
            pending_queries,
            acked_queries,
            blocks_accepted: load(&self.stats.blocks_accepted),
            blocks_rejected: load(&self.stats.blocks_rejected),
            queries_committed: load(&self.stats.queries_committed),
            queries_rejected: load(&self.stats.queries_rejected),
            billing_signed: load(&self.stats.billing_signed),
        }
    }
}
