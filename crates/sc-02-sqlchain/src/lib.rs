//! # SQLChain
//!
//! An in-memory chain instance for one database, hosted behind the
//! [`sc_01_chain_mux::MuxService`].
//!
//! ## Responsibilities
//!
//! - Accept blocks that extend the head (no gaps, no forks, valid producer signature)
//! - Replicate the binlog in contiguous segments
//! - Drive each query through `Submitted → Responsed → Acked → Committed`
//! - Serve catch-up fetches
//! - Countersign billing records that match local accounting
//!
//! ## Example
//!
//! ```rust,ignore
//! let chain = Arc::new(SqlChain::new(
//!     ChainConfig::new(DatabaseId::new("db1")),
//!     Arc::new(Ed25519Signer::generate()),
//!     Arc::new(Ed25519Verifier),
//! ));
//! mux.register(DatabaseId::new("db1"), chain.clone());
//! ```

pub mod adapters;
pub mod attest;
pub mod collector;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{Ed25519Signer, Ed25519Verifier, InMemoryPolicyStore};
pub use collector::{collect_billing_signatures, CollectionOutcome};
pub use domain::{ChainConfig, QueryState};
pub use ports::{PolicyStore, SignatureVerifier, Signer, SqlChainApi};
pub use service::{ChainStats, ChainStatsSnapshot, SqlChain};
