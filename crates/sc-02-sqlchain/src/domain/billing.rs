//! Billing: local computation and the record of what this node has signed.

use sc_01_chain_mux::ChainError;
use shared_types::{normalize_billing, BillingEntry, BillingRecord, BillingSignature, Block, Hash};
use std::collections::BTreeMap;

/// Per-payee totals over `blocks`, merged and sorted by payee.
///
/// `None` on overflow.
pub fn compute_billing(blocks: &[Block]) -> Option<Vec<BillingEntry>> {
    normalize_billing(blocks.iter().flat_map(|b| b.billing.entries.iter()))
}

/// Cycles this node has signed, with the record hash it signed for each.
///
/// A node signs at most one record per cycle, and never a cycle older than
/// the newest one it has signed.
#[derive(Debug, Default)]
pub struct SigningLedger {
    signed: BTreeMap<u64, (Hash, BillingSignature)>,
}

impl SigningLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn newest_cycle(&self) -> Option<u64> {
        self.signed.keys().next_back().copied()
    }

    /// Decide whether `record` may be signed.
    ///
    /// `Ok(Some(sig))` when the identical record was signed before,
    /// `Ok(None)` when it is new and may be signed.
    pub fn check(&self, record: &BillingRecord) -> Result<Option<BillingSignature>, ChainError> {
        let newest = match self.newest_cycle() {
            Some(newest) => newest,
            None => return Ok(None),
        };

        if let Some((hash, signature)) = self.signed.get(&record.cycle) {
            if *hash == record.signing_hash() {
                return Ok(Some(*signature));
            }
            return Err(ChainError::StaleBilling {
                cycle: record.cycle,
                newest,
            });
        }

        if record.cycle < newest {
            return Err(ChainError::StaleBilling {
                cycle: record.cycle,
                newest,
            });
        }
        Ok(None)
    }

    pub fn remember(&mut self, record: &BillingRecord, signature: BillingSignature) {
        self.signed
            .insert(record.cycle, (record.signing_hash(), signature));
    }
}
