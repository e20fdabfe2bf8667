//! # Routing Through the Mux
//!
//! Real chain instances behind one endpoint: catch-up scenarios, isolation
//! between databases, and lookups racing registry changes.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use sc_01_chain_mux::*;
    use sc_02_sqlchain::attest::{next_header, seal_block};
    use sc_02_sqlchain::{Ed25519Signer, Ed25519Verifier, SqlChain};
    use shared_types::{BillingSummary, Block, DatabaseId};

    use crate::integration::fixtures::{call, next_block, replica, signer, DB1};

    fn fresh_chain(database_id: &str) -> Arc<SqlChain> {
        Arc::new(SqlChain::new(
            sc_02_sqlchain::ChainConfig::new(DatabaseId::new(database_id)),
            Arc::new(Ed25519Signer::generate()),
            Arc::new(Ed25519Verifier),
        ))
    }

    fn advise(mux: &MuxService, database_id: &str, block: &Block) -> Result<(), MuxError> {
        mux.advise_new_block(call(
            database_id,
            AdviseNewBlockReq {
                block: block.clone(),
            },
        ))
        .map(|_| ())
    }

    // =========================================================================
    // CATCH-UP
    // =========================================================================

    #[test]
    fn test_db1_catch_up_over_the_mux() {
        let node = replica(DB1, 0x10);
        let producer = signer(1);

        let genesis = next_block(DB1, None, &producer, vec![], vec![]);
        advise(&node.mux, DB1, &genesis).unwrap();

        let request = call(DB1, FetchLastBlockReq {});
        let reply = node.mux.fetch_last_block(request.clone()).unwrap();
        assert_eq!(reply.envelope, request.envelope);
        assert_eq!(reply.database_id, request.database_id);
        assert_eq!(reply.payload.block.height(), 1);

        // A producer that skipped height 2
        let mut header = next_header(DatabaseId::new(DB1), Some(&genesis), &producer, 1_000);
        header.height = 3;
        let gapped = seal_block(&producer, header, vec![], BillingSummary::default());
        let err = advise(&node.mux, DB1, &gapped).unwrap_err();
        assert!(!err.is_routing());
        assert_eq!(
            err.as_chain(),
            Some(&ChainError::HeightMismatch {
                expected: 2,
                got: 3
            })
        );

        let second = next_block(DB1, Some(&genesis), &producer, vec![], vec![]);
        advise(&node.mux, DB1, &second).unwrap();
        let third = next_block(DB1, Some(&second), &producer, vec![], vec![]);
        advise(&node.mux, DB1, &third).unwrap();

        let blocks = node
            .mux
            .fetch_block_by_count(call(DB1, FetchBlockByCountReq { count: 10 }))
            .unwrap()
            .payload
            .blocks;
        let heights: Vec<u64> = blocks.iter().map(Block::height).collect();
        assert_eq!(heights, vec![3, 2, 1]);

        let at_two = node
            .mux
            .fetch_block(call(DB1, FetchBlockReq { height: 2 }))
            .unwrap()
            .payload;
        assert_eq!(at_two.block, second);
        assert_eq!(at_two.count, 1);
    }

    #[test]
    fn test_follower_catches_up_from_leader() {
        let leader = replica(DB1, 0x10);
        let follower = replica(DB1, 0x11);
        let producer = signer(1);

        let mut head: Option<Block> = None;
        for _ in 0..4 {
            let block = next_block(DB1, head.as_ref(), &producer, vec![], vec![]);
            advise(&leader.mux, DB1, &block).unwrap();
            head = Some(block);
        }

        // Follower pulls newest-first and replays oldest-first
        let mut missing = leader
            .mux
            .fetch_block_by_count(call(DB1, FetchBlockByCountReq { count: 100 }))
            .unwrap()
            .payload
            .blocks;
        missing.reverse();
        for block in &missing {
            advise(&follower.mux, DB1, block).unwrap();
        }

        let leader_head = leader
            .mux
            .fetch_last_block(call(DB1, FetchLastBlockReq {}))
            .unwrap()
            .payload
            .block;
        let follower_head = follower
            .mux
            .fetch_last_block(call(DB1, FetchLastBlockReq {}))
            .unwrap()
            .payload
            .block;
        assert_eq!(leader_head, follower_head);
        assert_eq!(follower_head.height(), 4);
    }

    // =========================================================================
    // ISOLATION
    // =========================================================================

    #[test]
    fn test_databases_behind_one_mux_are_isolated() {
        let mux = MuxService::default();
        mux.register(DatabaseId::new("db1"), fresh_chain("db1"));
        mux.register(DatabaseId::new("db2"), fresh_chain("db2"));
        let producer = signer(1);

        let genesis = next_block("db1", None, &producer, vec![], vec![]);
        advise(&mux, "db1", &genesis).unwrap();

        assert_eq!(
            mux.fetch_last_block(call("db2", FetchLastBlockReq {})),
            Err(MuxError::Chain(ChainError::EmptyChain))
        );

        // Routed to db2, but the block names db1
        let err = advise(&mux, "db2", &genesis).unwrap_err();
        assert!(matches!(
            err,
            MuxError::Chain(ChainError::DatabaseMismatch { .. })
        ));
        assert_eq!(mux.metrics().chain_rejections, 2);
    }

    #[test]
    fn test_unregistered_chain_is_not_invoked() {
        let node = replica(DB1, 0x10);
        let chain = node.mux.unregister(&DatabaseId::new(DB1)).unwrap();

        let err = node
            .mux
            .fetch_block_by_count(call(DB1, FetchBlockByCountReq { count: 1 }))
            .unwrap_err();
        assert_eq!(err.code(), ERR_UNKNOWN_CHAIN);
        assert_eq!(
            err,
            MuxError::UnknownChain {
                database_id: DatabaseId::new(DB1)
            }
        );

        // The detached instance still answers direct calls
        assert!(chain
            .fetch_block_by_count(FetchBlockByCountReq { count: 1 })
            .unwrap()
            .blocks
            .is_empty());
    }

    // =========================================================================
    // CONCURRENCY
    // =========================================================================

    #[test]
    fn test_dispatch_while_registry_churns() {
        let mux = Arc::new(MuxService::default());
        mux.register(DatabaseId::new("stable"), fresh_chain("stable"));
        let producer = signer(1);
        advise(
            &mux,
            "stable",
            &next_block("stable", None, &producer, vec![], vec![]),
        )
        .unwrap();

        thread::scope(|s| {
            let churn = Arc::clone(&mux);
            s.spawn(move || {
                for _ in 0..200 {
                    churn.register(DatabaseId::new("flaky"), fresh_chain("flaky"));
                    churn.unregister(&DatabaseId::new("flaky"));
                }
            });

            for _ in 0..4 {
                let reader = Arc::clone(&mux);
                s.spawn(move || {
                    for _ in 0..200 {
                        let stable = reader
                            .fetch_last_block(call("stable", FetchLastBlockReq {}))
                            .unwrap();
                        assert_eq!(stable.payload.block.height(), 1);

                        match reader.fetch_last_block(call("flaky", FetchLastBlockReq {})) {
                            Err(MuxError::UnknownChain { .. })
                            | Err(MuxError::Chain(ChainError::EmptyChain)) => {}
                            other => panic!("unexpected result: {:?}", other),
                        }
                    }
                });
            }
        });

        assert!(!mux.is_registered(&DatabaseId::new("flaky")));
        assert_eq!(mux.metrics().dispatched, 1 + 4 * 200 + mux.metrics().chain_rejections);
    }
}
