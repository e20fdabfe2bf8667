//! Building signed protocol objects.
//!
//! Producers, responders and clients use these to create blocks, responses
//! and acks that a chain instance will verify.

use crate::ports::Signer;
use shared_types::{
    BillingSummary, Block, BlockHeader, DatabaseId, QueryAck, QueryId, QueryResponse, QueryResult,
    GENESIS_HEIGHT,
};

/// Header for the block that extends `head` (or the first block when `head` is `None`).
pub fn next_header(
    database_id: DatabaseId,
    head: Option<&Block>,
    producer: &dyn Signer,
    timestamp: u64,
) -> BlockHeader {
    BlockHeader {
        version: 1,
        database_id,
        height: head.map_or(GENESIS_HEIGHT, |h| h.height() + 1),
        parent: head.map(Block::block_ref),
        producer: producer.public_key(),
        timestamp,
    }
}

/// Sign a block over its hash. `header.producer` should be the signer's key.
pub fn seal_block(
    signer: &dyn Signer,
    header: BlockHeader,
    queries: Vec<QueryId>,
    billing: BillingSummary,
) -> Block {
    let mut block = Block {
        header,
        queries,
        billing,
        signature: [0u8; 64],
    };
    block.signature = signer.sign(&block.hash());
    block
}

pub fn sign_response(
    responder: &dyn Signer,
    query_id: QueryId,
    result: QueryResult,
    timestamp: u64,
) -> QueryResponse {
    let mut response = QueryResponse {
        query_id,
        responder: responder.public_key(),
        result,
        timestamp,
        signature: [0u8; 64],
    };
    response.signature = responder.sign(&response.hash());
    response
}

/// Acknowledge `response` as the client that submitted the query.
pub fn sign_ack(client: &dyn Signer, response: &QueryResponse, timestamp: u64) -> QueryAck {
    let mut ack = QueryAck {
        query_id: response.query_id,
        response_hash: response.hash(),
        client: client.public_key(),
        timestamp,
        signature: [0u8; 64],
    };
    ack.signature = client.sign(&ack.hash());
    ack
}
