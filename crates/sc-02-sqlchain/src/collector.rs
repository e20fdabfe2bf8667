//! Billing signature collection across chain participants.

use crate::ports::SignatureVerifier;
use sc_01_chain_mux::{ChainRpcService, SignBillingReq};
use shared_types::BillingRecord;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of one collection round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionOutcome {
    /// Signatures attached during this round
    pub added: usize,
    /// Peers that refused or returned an unusable signature
    pub failed: usize,
    pub is_final: bool,
}

/// Ask each peer in turn to countersign `record` until it reaches `quorum`.
///
/// Returned signatures are verified before they are attached, and a signee
/// is attached at most once. Refusals are logged and not retried. With
/// `quorum == 0` every peer is asked and the record never becomes final.
pub fn collect_billing_signatures(
    record: &mut BillingRecord,
    peers: &[Arc<dyn ChainRpcService>],
    verifier: &dyn SignatureVerifier,
    quorum: usize,
) -> CollectionOutcome {
    let mut outcome = CollectionOutcome::default();
    let signing_hash = record.signing_hash();

    for (index, peer) in peers.iter().enumerate() {
        if record.is_final(quorum) {
            break;
        }

        let response = match peer.sign_billing(SignBillingReq {
            record: record.clone(),
        }) {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    database_id = %record.database_id,
                    cycle = record.cycle,
                    peer = index,
                    code = e.code(),
                    "[Billing] Peer refused to sign: {}",
                    e
                );
                outcome.failed += 1;
                continue;
            }
        };

        let signature = response.signature;
        if !verifier.verify(&signature.signee, &signing_hash, &signature.signature) {
            warn!(
                database_id = %record.database_id,
                cycle = record.cycle,
                peer = index,
                "[Billing] Peer returned an invalid signature"
            );
            outcome.failed += 1;
            continue;
        }

        if record.add_signature(signature) {
            outcome.added += 1;
        } else {
            debug!(
                database_id = %record.database_id,
                cycle = record.cycle,
                peer = index,
                "[Billing] Signee already attached, skipping"
            );
        }
    }

    outcome.is_final = record.is_final(quorum);
    info!(
        database_id = %record.database_id,
        cycle = record.cycle,
        signatures = record.signatures.len(),
        quorum,
        is_final = outcome.is_final,
        "[Billing] Collection round finished"
    );
    outcome
}
