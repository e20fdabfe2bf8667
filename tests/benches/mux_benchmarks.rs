//! # Mux Benchmarks
//!
//! | Path | Target |
//! |------|--------|
//! | Dispatch to a registered chain | flat as the registry grows |
//! | Routing failure | cheaper than a dispatch |
//! | Block acceptance (verify + append) | < 100µs |

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use std::sync::Arc;

use sc_01_chain_mux::{AdviseNewBlockReq, ChainRpcService, FetchLastBlockReq, MuxService};
use sc_02_sqlchain::attest::{next_header, seal_block};
use sc_02_sqlchain::{ChainConfig, Ed25519Signer, Ed25519Verifier, SqlChain};
use shared_crypto::Ed25519KeyPair;
use shared_types::{BillingSummary, DatabaseId, Envelope, Mux, NodeId};

fn chain(database_id: &DatabaseId) -> Arc<SqlChain> {
    Arc::new(SqlChain::new(
        ChainConfig::new(database_id.clone()),
        Arc::new(Ed25519Signer::generate()),
        Arc::new(Ed25519Verifier),
    ))
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("mux-dispatch");
    let envelope = Envelope::new(NodeId::default());

    for registered in [1usize, 100, 10_000] {
        let mux = MuxService::default();
        for i in 0..registered {
            let id = DatabaseId::new(format!("db{}", i));
            mux.register(id.clone(), chain(&id));
        }
        let target = DatabaseId::new("db0");
        let missing = DatabaseId::new("missing");

        group.bench_with_input(BenchmarkId::new("hit", registered), &registered, |b, _| {
            b.iter(|| {
                let req = Mux::new(envelope.clone(), target.clone(), FetchLastBlockReq {});
                black_box(mux.fetch_last_block(req).is_err())
            })
        });

        group.bench_with_input(BenchmarkId::new("miss", registered), &registered, |b, _| {
            b.iter(|| {
                let req = Mux::new(envelope.clone(), missing.clone(), FetchLastBlockReq {});
                black_box(mux.fetch_last_block(req).is_err())
            })
        });
    }

    group.finish();
}

fn bench_block_acceptance(c: &mut Criterion) {
    let producer = Ed25519Signer::new(Ed25519KeyPair::from_seed([1u8; 32]));
    let database_id = DatabaseId::new("bench");
    let genesis = seal_block(
        &producer,
        next_header(database_id.clone(), None, &producer, 1),
        vec![],
        BillingSummary::default(),
    );

    c.bench_function("chain-accept-genesis", |b| {
        b.iter_batched(
            || chain(&database_id),
            |chain| {
                black_box(chain.advise_new_block(AdviseNewBlockReq {
                    block: genesis.clone(),
                }))
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_dispatch, bench_block_acceptance);
criterion_main!(benches);
