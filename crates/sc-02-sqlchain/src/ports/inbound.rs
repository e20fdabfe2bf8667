//! Inbound ports: what local components call on a chain.
//!
//! Peer traffic arrives through [`sc_01_chain_mux::ChainRpcService`]; this
//! port covers the local side (client submission and status).

use crate::domain::QueryState;
use crate::service::ChainStatsSnapshot;
use sc_01_chain_mux::ChainError;
use shared_types::{Block, DatabaseId, Query, QueryId};

pub trait SqlChainApi: Send + Sync {
    fn database_id(&self) -> &DatabaseId;

    /// Admit a client query in `Submitted`, subject to project policy.
    fn submit_query(&self, query: Query) -> Result<QueryId, ChainError>;

    fn query_state(&self, query_id: &QueryId) -> Option<QueryState>;

    fn head(&self) -> Option<Block>;

    /// Head height, 0 when empty.
    fn height(&self) -> u64;

    fn binlog_offset(&self) -> u64;

    fn stats(&self) -> ChainStatsSnapshot;
}
