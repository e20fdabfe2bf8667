//! Chain protocol message catalog.
//!
//! One request/response pair per operation. On the wire every pair travels
//! inside [`shared_types::Mux`], so none of these types repeat the database id
//! or the caller's identity.

use serde::{Deserialize, Serialize};
use shared_types::{
    BillingRecord, BillingSignature, BinLogSegment, Block, Query, QueryAck, QueryResponse,
};

// =============================================================================
// CLUSTER A: PROPAGATION
// =============================================================================

/// A finished block produced elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviseNewBlockReq {
    pub block: Block,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviseNewBlockResp {}

/// A contiguous slice of the write-ahead log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviseBinLogReq {
    pub segment: BinLogSegment,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviseBinLogResp {
    /// Offset the replica expects next.
    pub next_offset: u64,
}

// =============================================================================
// CLUSTER B: QUERY ORDERING
// =============================================================================

/// Phase one: a responder's signed result for a submitted query.
///
/// The query travels along so the replica can check that the response
/// answers the payload it admitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviseResponsedQueryReq {
    pub query: Query,
    pub response: QueryResponse,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviseResponsedQueryResp {}

/// Phase two: the client's acknowledgment of a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviseAckedQueryReq {
    pub ack: QueryAck,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviseAckedQueryResp {}

// =============================================================================
// CLUSTER C: CATCH-UP FETCH
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchBlockReq {
    pub height: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchBlockResp {
    pub height: u64,
    /// Blocks stored above `height`.
    pub count: u64,
    pub block: Block,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchLastBlockReq {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchLastBlockResp {
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchBlockByCountReq {
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchBlockByCountResp {
    /// Newest first.
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchAckedQueryReq {
    /// Only queries acked after this sequence are returned. 0 starts from the beginning.
    pub cursor: u64,
    /// Page size. `None` uses the chain's fetch cap.
    pub limit: Option<u32>,
}

/// An acked query with everything a block producer needs to include it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckedQuery {
    /// Position in the replica's ack order.
    pub sequence: u64,
    pub query: Query,
    pub response: QueryResponse,
    pub ack: QueryAck,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchAckedQueryResp {
    /// Ascending by `sequence`.
    pub queries: Vec<AckedQuery>,
    /// Cursor for the next page; equals the request cursor when nothing new.
    pub next_cursor: u64,
}

// =============================================================================
// CLUSTER D: BILLING
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignBillingReq {
    pub record: BillingRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignBillingResp {
    pub signature: BillingSignature,
}

// =============================================================================
// TAGGED UNION FOR SINGLE-ENTRY TRANSPORTS
// =============================================================================

/// Any chain request, for transports that deliver one message type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainRequest {
    AdviseNewBlock(AdviseNewBlockReq),
    AdviseBinLog(AdviseBinLogReq),
    AdviseResponsedQuery(AdviseResponsedQueryReq),
    AdviseAckedQuery(AdviseAckedQueryReq),
    FetchBlock(FetchBlockReq),
    FetchLastBlock(FetchLastBlockReq),
    FetchBlockByCount(FetchBlockByCountReq),
    FetchAckedQuery(FetchAckedQueryReq),
    SignBilling(SignBillingReq),
}

/// Response counterpart of [`ChainRequest`]; the variant always matches the request's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainResponse {
    AdviseNewBlock(AdviseNewBlockResp),
    AdviseBinLog(AdviseBinLogResp),
    AdviseResponsedQuery(AdviseResponsedQueryResp),
    AdviseAckedQuery(AdviseAckedQueryResp),
    FetchBlock(FetchBlockResp),
    FetchLastBlock(FetchLastBlockResp),
    FetchBlockByCount(FetchBlockByCountResp),
    FetchAckedQuery(FetchAckedQueryResp),
    SignBilling(SignBillingResp),
}

impl ChainRequest {
    /// Operation name used in logs and metrics.
    pub fn method(&self) -> &'static str {
        match self {
            Self::AdviseNewBlock(_) => "AdviseNewBlock",
            Self::AdviseBinLog(_) => "AdviseBinLog",
            Self::AdviseResponsedQuery(_) => "AdviseResponsedQuery",
            Self::AdviseAckedQuery(_) => "AdviseAckedQuery",
            Self::FetchBlock(_) => "FetchBlock",
            Self::FetchLastBlock(_) => "FetchLastBlock",
            Self::FetchBlockByCount(_) => "FetchBlockByCount",
            Self::FetchAckedQuery(_) => "FetchAckedQuery",
            Self::SignBilling(_) => "SignBilling",
        }
    }
}
