//! Write-ahead log replica.

use sc_01_chain_mux::ChainError;
use shared_types::{BinLogEntry, BinLogSegment};

/// Replicated binlog; offsets count entries from 0.
#[derive(Debug, Default)]
pub struct BinLog {
    entries: Vec<BinLogEntry>,
}

impl BinLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset the next segment must start at.
    pub fn next_offset(&self) -> u64 {
        self.entries.len() as u64
    }

    /// Append `segment` if it starts exactly at [`next_offset`](Self::next_offset).
    pub fn apply(&mut self, segment: BinLogSegment) -> Result<u64, ChainError> {
        let expected = self.next_offset();
        if segment.start_offset != expected {
            return Err(ChainError::BinLogDiscontinuity {
                expected,
                got: segment.start_offset,
            });
        }
        let next = segment.end_offset();
        self.entries.extend(segment.entries);
        Ok(next)
    }
}
