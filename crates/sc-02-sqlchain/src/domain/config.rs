use serde::{Deserialize, Serialize};
use shared_types::DatabaseId;

/// Per-chain settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Database this chain serves. Blocks and billing records for any other
    /// database are refused.
    pub database_id: DatabaseId,
    /// Upper bound on blocks or queries returned by a single fetch.
    pub max_fetch_count: u32,
}

impl ChainConfig {
    pub const DEFAULT_MAX_FETCH_COUNT: u32 = 1024;

    pub fn new(database_id: DatabaseId) -> Self {
        Self {
            database_id,
            max_fetch_count: Self::DEFAULT_MAX_FETCH_COUNT,
        }
    }

    pub fn with_max_fetch_count(mut self, max_fetch_count: u32) -> Self {
        self.max_fetch_count = max_fetch_count.max(1);
        self
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::new(DatabaseId::new("default"))
    }
}
