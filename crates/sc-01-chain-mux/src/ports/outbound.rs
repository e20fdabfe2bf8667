//! Outbound ports: what the mux needs from a chain instance.

use crate::catalog::*;
use crate::errors::ChainError;

/// Contract every chain instance hosted behind the mux implements.
///
/// Each call either fully applies or fully fails. Implementations are shared
/// across request tasks through `Arc`, so they synchronize internally.
pub trait ChainRpcService: Send + Sync {
    /// Accept a block produced elsewhere.
    ///
    /// Rejects height gaps, forks and duplicates, blocks with a bad producer
    /// signature and blocks that list a locally known query that is not acked.
    fn advise_new_block(&self, req: AdviseNewBlockReq) -> Result<AdviseNewBlockResp, ChainError>;

    /// Append a binlog segment; its start offset must equal the next expected offset.
    fn advise_bin_log(&self, req: AdviseBinLogReq) -> Result<AdviseBinLogResp, ChainError>;

    /// Record a signed response for a query (Submitted → Responsed).
    fn advise_responsed_query(
        &self,
        req: AdviseResponsedQueryReq,
    ) -> Result<AdviseResponsedQueryResp, ChainError>;

    /// Record the client's acknowledgment (Responsed → Acked).
    fn advise_acked_query(
        &self,
        req: AdviseAckedQueryReq,
    ) -> Result<AdviseAckedQueryResp, ChainError>;

    fn fetch_block(&self, req: FetchBlockReq) -> Result<FetchBlockResp, ChainError>;

    fn fetch_last_block(&self, req: FetchLastBlockReq) -> Result<FetchLastBlockResp, ChainError>;

    /// Up to `count` blocks from the head downwards. Never fails on a short chain.
    fn fetch_block_by_count(
        &self,
        req: FetchBlockByCountReq,
    ) -> Result<FetchBlockByCountResp, ChainError>;

    /// Acked queries not yet committed, after `cursor`, in ack order.
    fn fetch_acked_query(&self, req: FetchAckedQueryReq)
        -> Result<FetchAckedQueryResp, ChainError>;

    /// Countersign a billing record if it matches local accounting.
    fn sign_billing(&self, req: SignBillingReq) -> Result<SignBillingResp, ChainError>;

    /// Route a tagged request to the matching method.
    fn handle(&self, request: ChainRequest) -> Result<ChainResponse, ChainError> {
        Ok(match request {
            ChainRequest::AdviseNewBlock(r) => ChainResponse::AdviseNewBlock(self.advise_new_block(r)?),
            ChainRequest::AdviseBinLog(r) => ChainResponse::AdviseBinLog(self.advise_bin_log(r)?),
            ChainRequest::AdviseResponsedQuery(r) => {
                ChainResponse::AdviseResponsedQuery(self.advise_responsed_query(r)?)
            }
            ChainRequest::AdviseAckedQuery(r) => {
                ChainResponse::AdviseAckedQuery(self.advise_acked_query(r)?)
            }
            ChainRequest::FetchBlock(r) => ChainResponse::FetchBlock(self.fetch_block(r)?),
            ChainRequest::FetchLastBlock(r) => ChainResponse::FetchLastBlock(self.fetch_last_block(r)?),
            ChainRequest::FetchBlockByCount(r) => {
                ChainResponse::FetchBlockByCount(self.fetch_block_by_count(r)?)
            }
            ChainRequest::FetchAckedQuery(r) => {
                ChainResponse::FetchAckedQuery(self.fetch_acked_query(r)?)
            }
            ChainRequest::SignBilling(r) => ChainResponse::SignBilling(self.sign_billing(r)?),
        })
    }
}
