//! Router and chain instance errors.
//!
//! Routing failures and chain rejections are kept apart so callers can tell
//! "not hosted here" from "rejected by the chain". Every error has a stable
//! numeric code for the wire.

use shared_types::{DatabaseId, QueryId};
use thiserror::Error;

/// Stable code for [`MuxError::UnknownChain`].
pub const ERR_UNKNOWN_CHAIN: u32 = 1000;

/// Coarse classification of [`ChainError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Out-of-order or inconsistent advice. State unchanged.
    Protocol,
    /// A signature or content check failed.
    Verification,
    /// Admission denied by project configuration.
    Policy,
    Internal,
}

/// Errors returned by a chain instance.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChainError {
    // ---- protocol (2xxx) ----
    #[error("Height mismatch: expected {expected}, got {got}")]
    HeightMismatch { expected: u64, got: u64 },

    #[error("Parent of block {height} does not match the local head")]
    ParentMismatch { height: u64 },

    #[error("Block {height} has no parent reference")]
    MissingParent { height: u64 },

    #[error("Genesis block must not reference a parent")]
    GenesisHasParent,

    #[error("Block {height} already stored")]
    DuplicateBlock { height: u64 },

    #[error("Block not found at height {height}")]
    BlockNotFound { height: u64 },

    #[error("Chain has no blocks")]
    EmptyChain,

    #[error("Binlog discontinuity: expected offset {expected}, got {got}")]
    BinLogDiscontinuity { expected: u64, got: u64 },

    #[error("Unknown query {query_id}")]
    QueryNotFound { query_id: QueryId },

    #[error("Query {query_id} already submitted")]
    DuplicateQuery { query_id: QueryId },

    #[error("Query {query_id} cannot move from {from} to {to}")]
    InvalidTransition {
        query_id: QueryId,
        from: &'static str,
        to: &'static str,
    },

    #[error("Block lists query {query_id} which is not acked")]
    QueryNotAcked { query_id: QueryId },

    #[error("Response does not answer query {query_id}")]
    QueryMismatch { query_id: QueryId },

    #[error("Record belongs to database {got}, this chain serves {expected}")]
    DatabaseMismatch {
        expected: DatabaseId,
        got: DatabaseId,
    },

    #[error("Billing cycle {cycle} is stale (newest signed: {newest})")]
    StaleBilling { cycle: u64, newest: u64 },

    #[error("Billing range ends at {end_height}, head is {head}")]
    BillingRangeUnavailable { end_height: u64, head: u64 },

    #[error("Billing record already carries this participant's signature")]
    AlreadySigned,

    // ---- verification (3xxx) ----
    #[error("Invalid {subject} signature")]
    InvalidSignature { subject: &'static str },

    #[error("Billing amounts do not match local records")]
    BillingMismatch,

    #[error("Ack for query {query_id} references a different response")]
    ResponseHashMismatch { query_id: QueryId },

    // ---- policy (4xxx) ----
    #[error("Policy denied: {reason}")]
    PolicyDenied { reason: String },

    // ---- internal (5xxx) ----
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChainError {
    /// Stable wire code.
    pub fn code(&self) -> u32 {
        match self {
            Self::HeightMismatch { .. } => 2001,
            Self::ParentMismatch { .. } => 2002,
            Self::MissingParent { .. } => 2003,
            Self::GenesisHasParent => 2004,
            Self::DuplicateBlock { .. } => 2005,
            Self::BlockNotFound { .. } => 2006,
            Self::EmptyChain => 2007,
            Self::BinLogDiscontinuity { .. } => 2008,
            Self::QueryNotFound { .. } => 2009,
            Self::DuplicateQuery { .. } => 2010,
            Self::InvalidTransition { .. } => 2011,
            Self::QueryNotAcked { .. } => 2012,
            Self::StaleBilling { .. } => 2013,
            Self::BillingRangeUnavailable { .. } => 2014,
            Self::AlreadySigned => 2015,
            Self::QueryMismatch { .. } => 2016,
            Self::DatabaseMismatch { .. } => 2017,
            Self::InvalidSignature { .. } => 3001,
            Self::BillingMismatch => 3002,
            Self::ResponseHashMismatch { .. } => 3003,
            Self::PolicyDenied { .. } => 4001,
            Self::Internal(_) => 5000,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self.code() {
            2000..=2999 => ErrorKind::Protocol,
            3000..=3999 => ErrorKind::Verification,
            4000..=4999 => ErrorKind::Policy,
            _ => ErrorKind::Internal,
        }
    }
}

/// Errors returned by [`crate::MuxService`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MuxError {
    /// No chain registered under this id. No instance was invoked.
    #[error("Unknown chain: {database_id}")]
    UnknownChain { database_id: DatabaseId },

    /// The chain instance rejected the call; passed through unchanged.
    #[error(transparent)]
    Chain(#[from] ChainError),
}

impl MuxError {
    pub fn code(&self) -> u32 {
        match self {
            Self::UnknownChain { .. } => ERR_UNKNOWN_CHAIN,
            Self::Chain(e) => e.code(),
        }
    }

    /// True when the call never reached a chain instance.
    pub fn is_routing(&self) -> bool {
        matches!(self, Self::UnknownChain { .. })
    }

    /// The chain's own error, if the call reached one.
    pub fn as_chain(&self) -> Option<&ChainError> {
        match self {
            Self::Chain(e) => Some(e),
            Self::UnknownChain { .. } => None,
        }
    }
}
