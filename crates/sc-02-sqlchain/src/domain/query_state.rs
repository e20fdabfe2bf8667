//! Query lifecycle.
//!
//! ```text
//! Submitted ──► Responsed ──► Acked ──► Committed
//!     │             │           │
//!     └─────────────┴───────────┴──────► Rejected
//! ```
//!
//! Transitions only move forward. `Committed` and `Rejected` are terminal.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryState {
    /// Admitted from a client, awaiting a response.
    Submitted,
    /// A signed response has been recorded.
    Responsed,
    /// The client acknowledged the response; eligible for a block.
    Acked,
    /// Listed by an accepted block.
    Committed,
    /// Failed verification. Never retried here.
    Rejected,
}

impl QueryState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "Submitted",
            Self::Responsed => "Responsed",
            Self::Acked => "Acked",
            Self::Committed => "Committed",
            Self::Rejected => "Rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Committed | Self::Rejected)
    }

    pub fn can_transition_to(&self, next: QueryState) -> bool {
        matches!(
            (self, next),
            (Self::Submitted, Self::Responsed)
                | (Self::Responsed, Self::Acked)
                | (Self::Acked, Self::Committed)
                | (Self::Submitted, Self::Rejected)
                | (Self::Responsed, Self::Rejected)
                | (Self::Acked, Self::Rejected)
        )
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
