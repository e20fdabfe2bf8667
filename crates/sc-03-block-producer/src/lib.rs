//! # Block Producer (Global Ledger Chain RPC)
//!
//! The ledger chain runs next to the chain multiplexer on every node and
//! answers account and profile questions for the SQLChains it hosts.
//!
//! | Operation | Request | Response |
//! |-----------|---------|----------|
//! | NextAccountNonce | `addr` | `addr`, `nonce` (current + 1) |
//! | QueryAccountStableBalance | `addr` | `addr`, `ok`, `balance` |
//! | QueryAccountCovenantBalance | `addr` | `addr`, `ok`, `balance` |
//! | AddTx | signed `Transfer` or `TokenReceive` | `{}` |
//! | QuerySqlChainProfile | `database_id` | `profile` |
//!
//! Balances are kept per token. A `Transfer` moves one token between
//! accounts; a `TokenReceive` credits tokens observed arriving from outside
//! the ledger and is only accepted from a registered observer.
//!
//! Requests and responses travel as `Enveloped<T>`; the response envelope
//! is the request's.

pub mod catalog;
pub mod domain;
pub mod ports;
pub mod service;

pub use catalog::*;
pub use domain::{Ledger, LedgerError, SqlChainProfile};
pub use ports::LedgerApi;
pub use service::{LedgerService, LedgerStats, LedgerStatsSnapshot};
