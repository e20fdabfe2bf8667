//! # Billing Across Nodes
//!
//! Each miner hosts its own replica of the chain. The payer's side builds a
//! billing record from the block summaries, collects countersignatures
//! through the miners' muxes until the ledger profile's quorum is met, then
//! settles on the ledger chain.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sc_01_chain_mux::ChainRpcService;
    use sc_02_sqlchain::{collect_billing_signatures, Ed25519Verifier, SignatureVerifier};
    use sc_03_block_producer::*;
    use shared_crypto::Ed25519KeyPair;
    use shared_types::{
        AccountAddress, BillingEntry, BillingRecord, Block, DatabaseId, Envelope, Enveloped,
        NodeId, TokenType,
    };

    use crate::integration::fixtures::{broadcast, next_block, replica, signer, MuxPeer, Replica, DB1};

    fn ledger_call<T>(payload: T) -> Enveloped<T> {
        Enveloped::new(Envelope::new(NodeId([0xB0; 32])), payload)
    }

    fn miners() -> Vec<Replica> {
        (0..3).map(|i| replica(DB1, 0x30 + i)).collect()
    }

    fn account(replica: &Replica) -> AccountAddress {
        AccountAddress::from_public_key(&replica.key)
    }

    fn peers(replicas: &[Replica]) -> Vec<Arc<dyn ChainRpcService>> {
        replicas
            .iter()
            .map(|r| Arc::new(MuxPeer::new(Arc::clone(&r.mux), DB1)) as Arc<dyn ChainRpcService>)
            .collect()
    }

    /// Two billed blocks advised to `replicas`; returns them.
    fn billed_chain(replicas: &[Replica], payees: &[AccountAddress]) -> Vec<Block> {
        let producer = signer(1);
        let first = next_block(
            DB1,
            None,
            &producer,
            vec![],
            vec![
                BillingEntry { payee: payees[0], amount: 10 },
                BillingEntry { payee: payees[1], amount: 4 },
            ],
        );
        let second = next_block(
            DB1,
            Some(&first),
            &producer,
            vec![],
            vec![
                BillingEntry { payee: payees[0], amount: 5 },
                BillingEntry { payee: payees[2], amount: 1 },
            ],
        );
        broadcast(replicas, DB1, &first);
        broadcast(replicas, DB1, &second);
        vec![first, second]
    }

    fn record_for(blocks: &[Block], payer: AccountAddress) -> BillingRecord {
        BillingRecord {
            database_id: DatabaseId::new(DB1),
            cycle: 1,
            start_height: 1,
            end_height: blocks.len() as u64,
            payer,
            entries: blocks
                .iter()
                .flat_map(|b| b.billing.entries.iter().copied())
                .collect(),
            signatures: vec![],
        }
    }

    #[test]
    fn test_billing_reaches_profile_quorum_and_settles() {
        let nodes = miners();
        let miner_accounts: Vec<_> = nodes.iter().map(account).collect();
        let payer_key = Ed25519KeyPair::from_seed([0x99; 32]);
        let payer = AccountAddress::from_public_key(&payer_key.public_key());

        let ledger = LedgerService::with_genesis([(payer, TokenType::Stable, 100)]).unwrap();
        ledger
            .register_profile(SqlChainProfile {
                database_id: DatabaseId::new(DB1),
                owner: payer,
                miners: miner_accounts.clone(),
                quorum: 2,
            })
            .unwrap();
        let profile = ledger
            .query_sql_chain_profile(ledger_call(QuerySqlChainProfileReq {
                database_id: DatabaseId::new(DB1),
            }))
            .unwrap()
            .payload
            .profile;

        let blocks = billed_chain(&nodes, &miner_accounts);
        let mut record = record_for(&blocks, payer);

        let outcome =
            collect_billing_signatures(&mut record, &peers(&nodes), &Ed25519Verifier, profile.quorum);
        assert!(outcome.is_final);
        assert_eq!(outcome.added, 2);
        assert_eq!(outcome.failed, 0);

        let signing_hash = record.signing_hash();
        for signature in &record.signatures {
            assert!(nodes.iter().any(|n| n.key == signature.signee));
            assert!(Ed25519Verifier.verify(&signature.signee, &signing_hash, &signature.signature));
        }

        // Settle each payee line with a signed transfer from the payer
        for entry in record.normalized_entries().unwrap() {
            let nonce = ledger
                .next_account_nonce(ledger_call(NextAccountNonceReq { addr: payer }))
                .unwrap()
                .payload
                .nonce;
            let tx =
                Transfer::signed(&payer_key, entry.payee, TokenType::Stable, entry.amount, nonce);
            ledger.add_tx(ledger_call(AddTxReq { tx: tx.into() })).unwrap();
        }

        let balance_of = |addr| {
            ledger
                .query_account_stable_balance(ledger_call(QueryAccountStableBalanceReq { addr }))
                .unwrap()
                .payload
                .balance
        };
        assert_eq!(balance_of(payer), 100 - 20);
        assert_eq!(balance_of(miner_accounts[0]), 15);
        assert_eq!(balance_of(miner_accounts[1]), 4);
        assert_eq!(balance_of(miner_accounts[2]), 1);
    }

    #[test]
    fn test_inflated_record_collects_nothing() {
        let nodes = miners();
        let miner_accounts: Vec<_> = nodes.iter().map(account).collect();
        let blocks = billed_chain(&nodes, &miner_accounts);

        let mut record = record_for(&blocks, AccountAddress([0xEE; 32]));
        record.entries[0].amount += 1;

        let outcome = collect_billing_signatures(&mut record, &peers(&nodes), &Ed25519Verifier, 2);
        assert_eq!(outcome.added, 0);
        assert_eq!(outcome.failed, 3);
        assert!(!outcome.is_final);
        assert!(record.signatures.is_empty());
    }

    #[test]
    fn test_lagging_and_unhosting_peers_count_as_failures() {
        let nodes = miners();
        let miner_accounts: Vec<_> = nodes.iter().map(account).collect();
        let blocks = billed_chain(&nodes[..2], &miner_accounts);

        // Third miner only has the first block
        nodes[2]
            .mux
            .advise_new_block(crate::integration::fixtures::call(
                DB1,
                sc_01_chain_mux::AdviseNewBlockReq {
                    block: blocks[0].clone(),
                },
            ))
            .unwrap();
        // A fourth node that does not host db1 at all
        let stranger = replica("db9", 0x40);

        let mut all = peers(&nodes);
        all.push(Arc::new(MuxPeer::new(Arc::clone(&stranger.mux), DB1)));

        let mut record = record_for(&blocks, AccountAddress([0xEE; 32]));
        let outcome = collect_billing_signatures(&mut record, &all, &Ed25519Verifier, 4);

        assert_eq!(outcome.added, 2);
        assert_eq!(outcome.failed, 2);
        assert!(!outcome.is_final);

        // A later round with the same peers adds nothing new
        let again = collect_billing_signatures(&mut record, &all, &Ed25519Verifier, 4);
        assert_eq!(again.added, 0);
        assert_eq!(record.signatures.len(), 2);
    }
}
