//! # Domain Layer - SQLChain
//!
//! Pure chain logic with no I/O and no locking.
//!
//! ## Components
//!
//! - `config`: `ChainConfig`
//! - `block_store`: append-only block list with extension checks
//! - `query_state`: the query lifecycle state machine
//! - `query_tracker`: per-query records and the acked-query index
//! - `binlog`: write-ahead log replica
//! - `billing`: local billing computation and the signing ledger
//! - `policy`: project configuration records and admission checks

pub mod billing;
pub mod binlog;
pub mod block_store;
pub mod config;
pub mod policy;
pub mod query_state;
pub mod query_tracker;

pub use billing::*;
pub use binlog::*;
pub use block_store::*;
pub use config::*;
pub use policy::*;
pub use query_state::*;
pub use query_tracker::*;
