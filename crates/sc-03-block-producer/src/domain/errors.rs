use shared_types::{AccountAddress, DatabaseId, TokenType};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Transaction signature does not verify")]
    InvalidSignature,

    #[error("Signee key does not own account {from}")]
    SigneeMismatch { from: AccountAddress },

    #[error("Invalid nonce: expected {expected}, got {got}")]
    NonceMismatch { expected: u64, got: u64 },

    #[error("Insufficient {token} balance: required {required}, available {available}")]
    InsufficientBalance {
        token: TokenType,
        required: u64,
        available: u64,
    },

    #[error("Account {observer} is not an authorized token observer")]
    UnknownObserver { observer: AccountAddress },

    #[error("Balance overflow for account {addr}")]
    BalanceOverflow { addr: AccountAddress },

    #[error("No profile for database {database_id}")]
    ProfileNotFound { database_id: DatabaseId },

    #[error("Profile for database {database_id} already exists")]
    DuplicateProfile { database_id: DatabaseId },

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),
}
