//! # Query Ordering Across Replicas
//!
//! A client query travels Submitted → Responsed → Acked on every replica,
//! the producer collects acked queries through the mux, and the block that
//! lists them commits them everywhere.

#[cfg(test)]
mod tests {
    use sc_01_chain_mux::*;
    use sc_02_sqlchain::attest::{sign_ack, sign_response};
    use sc_02_sqlchain::{QueryState, Signer, SqlChainApi};
    use shared_types::{
        BinLogEntry, BinLogSegment, DatabaseId, Query, QueryKind, QueryPayload, QueryResult,
    };

    use crate::integration::fixtures::{broadcast, call, next_block, replica, signer, Replica, DB1};

    fn write_query(client: &dyn Signer, sequence: u64) -> Query {
        Query {
            database_id: DatabaseId::new(DB1),
            client: client.public_key(),
            sequence,
            payload: QueryPayload {
                kind: QueryKind::Write,
                statements: vec![format!("INSERT INTO t VALUES ({})", sequence)],
                tables: vec!["t".into()],
            },
            timestamp: 10 + sequence,
        }
    }

    fn cluster() -> Vec<Replica> {
        (0..3).map(|i| replica(DB1, 0x20 + i)).collect()
    }

    #[test]
    fn test_acked_queries_commit_on_every_replica() {
        let replicas = cluster();
        let client = signer(2);
        let responder = signer(3);
        let producer = signer(1);

        let genesis = next_block(DB1, None, &producer, vec![], vec![]);
        broadcast(&replicas, DB1, &genesis);

        let mut ids = Vec::new();
        for sequence in 1..=2 {
            let query = write_query(&client, sequence);
            let id = query.id();
            let response = sign_response(&responder, id, QueryResult::default(), 20);
            let ack = sign_ack(&client, &response, 30);

            for node in &replicas {
                assert_eq!(node.chain.submit_query(query.clone()).unwrap(), id);
                node.mux
                    .advise_responsed_query(call(
                        DB1,
                        AdviseResponsedQueryReq {
                            query: query.clone(),
                            response: response.clone(),
                        },
                    ))
                    .unwrap();
                node.mux
                    .advise_acked_query(call(DB1, AdviseAckedQueryReq { ack: ack.clone() }))
                    .unwrap();
                assert_eq!(node.chain.query_state(&id), Some(QueryState::Acked));
            }
            ids.push(id);
        }

        // The producer assembles from what the first replica has acked
        let pending = replicas[0]
            .mux
            .fetch_acked_query(call(DB1, FetchAckedQueryReq::default()))
            .unwrap()
            .payload;
        let listed: Vec<_> = pending.queries.iter().map(|q| q.query.id()).collect();
        assert_eq!(listed, ids);

        let block = next_block(DB1, Some(&genesis), &producer, listed, vec![]);
        broadcast(&replicas, DB1, &block);

        for node in &replicas {
            for id in &ids {
                assert_eq!(node.chain.query_state(id), Some(QueryState::Committed));
            }
            let stats = node.chain.stats();
            assert_eq!(stats.height, 2);
            assert_eq!(stats.queries_committed, 2);
            assert_eq!(stats.pending_queries, 0);
            assert!(node
                .mux
                .fetch_acked_query(call(DB1, FetchAckedQueryReq::default()))
                .unwrap()
                .payload
                .queries
                .is_empty());
        }
    }

    #[test]
    fn test_lagging_replica_refuses_block_until_acked() {
        let replicas = cluster();
        let client = signer(2);
        let responder = signer(3);
        let producer = signer(1);

        let query = write_query(&client, 1);
        let id = query.id();
        let response = sign_response(&responder, id, QueryResult::default(), 20);
        let ack = sign_ack(&client, &response, 30);

        for node in &replicas {
            node.chain.submit_query(query.clone()).unwrap();
            node.mux
                .advise_responsed_query(call(
                    DB1,
                    AdviseResponsedQueryReq {
                        query: query.clone(),
                        response: response.clone(),
                    },
                ))
                .unwrap();
        }
        // Only the first two replicas hear the ack
        for node in &replicas[..2] {
            node.mux
                .advise_acked_query(call(DB1, AdviseAckedQueryReq { ack: ack.clone() }))
                .unwrap();
        }

        let block = next_block(DB1, None, &producer, vec![id], vec![]);
        let lagging = &replicas[2];
        let err = lagging
            .mux
            .advise_new_block(call(DB1, AdviseNewBlockReq { block: block.clone() }))
            .unwrap_err();
        assert_eq!(
            err,
            MuxError::Chain(ChainError::QueryNotAcked { query_id: id })
        );
        assert_eq!(lagging.chain.query_state(&id), Some(QueryState::Responsed));

        lagging
            .mux
            .advise_acked_query(call(DB1, AdviseAckedQueryReq { ack }))
            .unwrap();
        broadcast(&replicas, DB1, &block);
        for node in &replicas {
            assert_eq!(node.chain.query_state(&id), Some(QueryState::Committed));
        }
    }

    #[test]
    fn test_binlog_streams_in_order() {
        let node = replica(DB1, 0x20);
        let segment = |start: u64, count: u64| BinLogSegment {
            start_offset: start,
            entries: (start..start + count)
                .map(|i| BinLogEntry {
                    query_id: shared_types::QueryId([i as u8; 32]),
                    data: i.to_be_bytes().to_vec(),
                })
                .collect(),
        };

        let first = node
            .mux
            .advise_bin_log(call(DB1, AdviseBinLogReq { segment: segment(0, 3) }))
            .unwrap();
        assert_eq!(first.payload.next_offset, 3);

        // Replayed segment
        let err = node
            .mux
            .advise_bin_log(call(DB1, AdviseBinLogReq { segment: segment(0, 3) }))
            .unwrap_err();
        assert_eq!(
            err,
            MuxError::Chain(ChainError::BinLogDiscontinuity {
                expected: 3,
                got: 0
            })
        );

        let next = node
            .mux
            .advise_bin_log(call(DB1, AdviseBinLogReq { segment: segment(3, 2) }))
            .unwrap();
        assert_eq!(next.payload.next_offset, 5);
        assert_eq!(node.chain.binlog_offset(), 5);
    }
}
