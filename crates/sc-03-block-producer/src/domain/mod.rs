//! Ledger domain: account state, transfer rules and chain profiles.

pub mod errors;
pub mod ledger;

pub use errors::LedgerError;
pub use ledger::{Ledger, SqlChainProfile};
