//! Peer-facing protocol operations.

use tracing::{debug, info, warn};

use super::{ChainStats, SqlChain};
use crate::domain::{compute_billing, QueryState, QueryTracker};
use sc_01_chain_mux::*;
use shared_types::{BillingSignature, Block, QueryId, QueryResponse, GENESIS_HEIGHT};

impl SqlChain {
    /// Verify and append a block, committing the queries it lists.
    ///
    /// Returns the number of local queries committed.
    fn accept_block(&self, block: Block) -> Result<usize, ChainError> {
        self.ensure_database(&block.header.database_id)?;

        let mut state = self.state.write();
        state.blocks.check_extends(&block)?;
        if !self
            .verifier
            .verify(&block.header.producer, &block.hash(), &block.signature)
        {
            return Err(ChainError::InvalidSignature { subject: "block" });
        }
        state.queries.check_committable(&block.queries)?;

        let height = block.height();
        let ids = block.queries.clone();
        state.blocks.append(block)?;
        Ok(state.queries.commit(&ids, height))
    }

    /// Move a query to `Rejected` after a failed check and hand back `error`.
    fn reject_query(&self, queries: &mut QueryTracker, id: &QueryId, error: ChainError) -> ChainError {
        queries.reject(id);
        ChainStats::bump(&self.stats.queries_rejected, 1);
        warn!(
            database_id = %self.config.database_id,
            query_id = %id,
            "[SqlChain] Query rejected: {}",
            error
        );
        error
    }
}

impl ChainRpcService for SqlChain {
    fn advise_new_block(&self, req: AdviseNewBlockReq) -> Result<AdviseNewBlockResp, ChainError> {
        let height = req.block.height();
        match self.accept_block(req.block) {
            Ok(committed) => {
                ChainStats::bump(&self.stats.blocks_accepted, 1);
                ChainStats::bump(&self.stats.queries_committed, committed as u64);
                info!(
                    database_id = %self.config.database_id,
                    height,
                    committed,
                    "[SqlChain] Block accepted"
                );
                Ok(AdviseNewBlockResp {})
            }
            Err(e) => {
                ChainStats::bump(&self.stats.blocks_rejected, 1);
                warn!(
                    database_id = %self.config.database_id,
                    height,
                    "[SqlChain] Block rejected: {}",
                    e
                );
                Err(e)
            }
        }
    }

    fn advise_bin_log(&self, req: AdviseBinLogReq) -> Result<AdviseBinLogResp, ChainError> {
        let next_offset = self.binlog.lock().apply(req.segment)?;
        Ok(AdviseBinLogResp { next_offset })
    }

    fn advise_responsed_query(
        &self,
        req: AdviseResponsedQueryReq,
    ) -> Result<AdviseResponsedQueryResp, ChainError> {
        let AdviseResponsedQueryReq { query, response } = req;
        let id = response.query_id;

        let mut state = self.state.write();
        state.queries.ensure_transition(&id, QueryState::Responsed)?;
        if query.id() != id {
            return Err(ChainError::QueryMismatch { query_id: id });
        }

        if !self
            .verifier
            .verify(&response.responder, &response.hash(), &response.signature)
        {
            let error = ChainError::InvalidSignature { subject: "response" };
            return Err(self.reject_query(&mut state.queries, &id, error));
        }

        state.queries.record_response(response)?;
        debug!(
            database_id = %self.config.database_id,
            query_id = %id,
            "[SqlChain] Query responsed"
        );
        Ok(AdviseResponsedQueryResp {})
    }

    fn advise_acked_query(
        &self,
        req: AdviseAckedQueryReq,
    ) -> Result<AdviseAckedQueryResp, ChainError> {
        let ack = req.ack;
        let id = ack.query_id;

        let mut state = self.state.write();
        let tracked = state.queries.ensure_transition(&id, QueryState::Acked)?;
        let response_hash = tracked.response.as_ref().map(QueryResponse::hash);
        let client = tracked.query.client;

        if response_hash != Some(ack.response_hash) {
            let error = ChainError::ResponseHashMismatch { query_id: id };
            return Err(self.reject_query(&mut state.queries, &id, error));
        }
        if ack.client != client || !self.verifier.verify(&ack.client, &ack.hash(), &ack.signature)
        {
            let error = ChainError::InvalidSignature { subject: "ack" };
            return Err(self.reject_query(&mut state.queries, &id, error));
        }

        let sequence = state.queries.record_ack(ack)?;
        debug!(
            database_id = %self.config.database_id,
            query_id = %id,
            sequence,
            "[SqlChain] Query acked"
        );
        Ok(AdviseAckedQueryResp {})
    }

    fn fetch_block(&self, req: FetchBlockReq) -> Result<FetchBlockResp, ChainError> {
        let state = self.state.read();
        let block = state
            .blocks
            .get(req.height)
            .cloned()
            .ok_or(ChainError::BlockNotFound { height: req.height })?;
        Ok(FetchBlockResp {
            height: req.height,
            count: state.blocks.height() - req.height,
            block,
        })
    }

    fn fetch_last_block(&self, _req: FetchLastBlockReq) -> Result<FetchLastBlockResp, ChainError> {
        let block = self
            .state
            .read()
            .blocks
            .head()
            .cloned()
            .ok_or(ChainError::EmptyChain)?;
        Ok(FetchLastBlockResp { block })
    }

    fn fetch_block_by_count(
        &self,
        req: FetchBlockByCountReq,
    ) -> Result<FetchBlockByCountResp, ChainError> {
        let blocks = self.state.read().blocks.latest(self.fetch_cap(req.count));
        Ok(FetchBlockByCountResp { blocks })
    }

    fn fetch_acked_query(
        &self,
        req: FetchAckedQueryReq,
    ) -> Result<FetchAckedQueryResp, ChainError> {
        let limit = self.fetch_cap(req.limit.unwrap_or(self.config.max_fetch_count));
        let (queries, next_cursor) = self.state.read().queries.acked_after(req.cursor, limit);
        Ok(FetchAckedQueryResp {
            queries,
            next_cursor,
        })
    }

    fn sign_billing(&self, req: SignBillingReq) -> Result<SignBillingResp, ChainError> {
        let record = req.record;
        self.ensure_database(&record.database_id)?;

        let signee = self.signer.public_key();
        if record.is_signed_by(&signee) {
            return Err(ChainError::AlreadySigned);
        }

        let mut ledger = self.billing.lock();
        if let Some(signature) = ledger.check(&record)? {
            return Ok(SignBillingResp { signature });
        }

        if record.start_height < GENESIS_HEIGHT || record.start_height > record.end_height {
            return Err(ChainError::BillingMismatch);
        }

        let local = {
            let state = self.state.read();
            let head = state.blocks.height();
            let blocks = state
                .blocks
                .range(record.start_height, record.end_height)
                .ok_or(ChainError::BillingRangeUnavailable {
                    end_height: record.end_height,
                    head,
                })?;
            compute_billing(blocks)
        };

        let presented = record.normalized_entries();
        if local.is_none() || local != presented {
            warn!(
                database_id = %self.config.database_id,
                cycle = record.cycle,
                "[SqlChain] Billing record disagrees with local accounting"
            );
            return Err(ChainError::BillingMismatch);
        }

        let signature = BillingSignature {
            signee,
            signature: self.signer.sign(&record.signing_hash()),
        };
        ledger.remember(&record, signature);
        ChainStats::bump(&self.stats.billing_signed, 1);
        info!(
            database_id = %self.config.database_id,
            cycle = record.cycle,
            start = record.start_height,
            end = record.end_height,
            "[SqlChain] Billing record signed"
        );
        Ok(SignBillingResp { signature })
    }
}
