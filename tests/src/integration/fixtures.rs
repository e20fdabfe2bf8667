//! Shared builders for integration flows.

use std::sync::Arc;

use sc_01_chain_mux::*;
use sc_02_sqlchain::attest::{next_header, seal_block};
use sc_02_sqlchain::{Ed25519Signer, Ed25519Verifier, Signer, SqlChain};
use shared_crypto::Ed25519KeyPair;
use shared_types::{
    BillingEntry, BillingSummary, Block, DatabaseId, Envelope, Mux, NodeId, PublicKey, QueryId,
};

pub const DB1: &str = "db1";

pub fn signer(seed: u8) -> Ed25519Signer {
    Ed25519Signer::new(Ed25519KeyPair::from_seed([seed; 32]))
}

/// Wrap `payload` for `database_id` with a fresh envelope.
pub fn call<T>(database_id: &str, payload: T) -> Mux<T> {
    Mux::new(
        Envelope::new(NodeId([0xC1; 32])),
        DatabaseId::new(database_id),
        payload,
    )
}

/// One node: its own mux hosting one chain.
pub struct Replica {
    pub mux: Arc<MuxService>,
    pub chain: Arc<SqlChain>,
    pub key: PublicKey,
}

pub fn replica(database_id: &str, seed: u8) -> Replica {
    let own = signer(seed);
    let key = own.public_key();
    let chain = Arc::new(SqlChain::new(
        sc_02_sqlchain::ChainConfig::new(DatabaseId::new(database_id)),
        Arc::new(own),
        Arc::new(Ed25519Verifier),
    ));
    let mux = Arc::new(MuxService::default());
    mux.register(DatabaseId::new(database_id), chain.clone());
    Replica { mux, chain, key }
}

/// The block extending `head`, signed by `producer`.
pub fn next_block(
    database_id: &str,
    head: Option<&Block>,
    producer: &Ed25519Signer,
    queries: Vec<QueryId>,
    billing: Vec<BillingEntry>,
) -> Block {
    seal_block(
        producer,
        next_header(DatabaseId::new(database_id), head, producer, 1_000),
        queries,
        BillingSummary { entries: billing },
    )
}

/// Advise `block` to every replica through its mux.
pub fn broadcast(replicas: &[Replica], database_id: &str, block: &Block) {
    for replica in replicas {
        replica
            .mux
            .advise_new_block(call(
                database_id,
                AdviseNewBlockReq {
                    block: block.clone(),
                },
            ))
            .unwrap();
    }
}

/// A remote chain reached through another node's mux.
///
/// Routing failures surface as internal chain errors so a collector can
/// treat an unhosted peer like any other refusal.
pub struct MuxPeer {
    pub mux: Arc<MuxService>,
    pub database_id: DatabaseId,
}

impl MuxPeer {
    pub fn new(mux: Arc<MuxService>, database_id: &str) -> Self {
        Self {
            mux,
            database_id: DatabaseId::new(database_id),
        }
    }

    fn wrap<T>(&self, payload: T) -> Mux<T> {
        call(self.database_id.as_str(), payload)
    }
}

fn unwrap_reply<T>(result: Result<Mux<T>, MuxError>) -> Result<T, ChainError> {
    match result {
        Ok(reply) => Ok(reply.payload),
        Err(MuxError::Chain(e)) => Err(e),
        Err(MuxError::UnknownChain { database_id }) => Err(ChainError::Internal(format!(
            "database {} not hosted by peer",
            database_id
        ))),
    }
}

impl ChainRpcService for MuxPeer {
    fn advise_new_block(&self, req: AdviseNewBlockReq) -> Result<AdviseNewBlockResp, ChainError> {
        unwrap_reply(self.mux.advise_new_block(self.wrap(req)))
    }

    fn advise_bin_log(&self, req: AdviseBinLogReq) -> Result<AdviseBinLogResp, ChainError> {
        unwrap_reply(self.mux.advise_bin_log(self.wrap(req)))
    }

    fn advise_responsed_query(
        &self,
        req: AdviseResponsedQueryReq,
    ) -> Result<AdviseResponsedQueryResp, ChainError> {
        unwrap_reply(self.mux.advise_responsed_query(self.wrap(req)))
    }

    fn advise_acked_query(
        &self,
        req: AdviseAckedQueryReq,
    ) -> Result<AdviseAckedQueryResp, ChainError> {
        unwrap_reply(self.mux.advise_acked_query(self.wrap(req)))
    }

    fn fetch_block(&self, req: FetchBlockReq) -> Result<FetchBlockResp, ChainError> {
        unwrap_reply(self.mux.fetch_block(self.wrap(req)))
    }

    fn fetch_last_block(&self, req: FetchLastBlockReq) -> Result<FetchLastBlockResp, ChainError> {
        unwrap_reply(self.mux.fetch_last_block(self.wrap(req)))
    }

    fn fetch_block_by_count(
        &self,
        req: FetchBlockByCountReq,
    ) -> Result<FetchBlockByCountResp, ChainError> {
        unwrap_reply(self.mux.fetch_block_by_count(self.wrap(req)))
    }

    fn fetch_acked_query(
        &self,
        req: FetchAckedQueryReq,
    ) -> Result<FetchAckedQueryResp, ChainError> {
        unwrap_reply(self.mux.fetch_acked_query(self.wrap(req)))
    }

    fn sign_billing(&self, req: SignBillingReq) -> Result<SignBillingResp, ChainError> {
        unwrap_reply(self.mux.sign_billing(self.wrap(req)))
    }
}
