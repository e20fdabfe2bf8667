//! # Mux Service
//!
//! Registry of chain instances keyed by database id, and the router that
//! forwards each [`Mux`]-wrapped call to the right instance.
//!
//! ## Concurrency
//!
//! The registry is a sharded concurrent map. Every dispatch clones the
//! instance handle out of the map before calling it, so no map lock is held
//! while a chain works. A dispatch racing an `unregister` sees either the old
//! binding or none; a call that already holds the handle runs to completion.

use dashmap::DashMap;
use shared_types::{DatabaseId, Mux};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::catalog::*;
use crate::errors::{ChainError, MuxError};
use crate::metrics::{MuxMetrics, MuxMetricsSnapshot};
use crate::ports::outbound::ChainRpcService;

/// Shared handle to a hosted chain.
pub type ChainHandle = Arc<dyn ChainRpcService>;

/// Hosts many chains behind one endpoint.
pub struct MuxService {
    service_name: String,
    chains: DashMap<DatabaseId, ChainHandle>,
    metrics: MuxMetrics,
}

impl MuxService {
    /// Name the mux registers under when none is configured.
    pub const DEFAULT_SERVICE_NAME: &'static str = "SQLC";

    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            chains: DashMap::new(),
            metrics: MuxMetrics::default(),
        }
    }

    /// Name this service is exposed under on the node's RPC endpoint.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    // =========================================================================
    // REGISTRY
    // =========================================================================

    /// Bind `database_id` to `chain`.
    ///
    /// Replaces any existing binding and returns the displaced handle.
    pub fn register(&self, database_id: DatabaseId, chain: ChainHandle) -> Option<ChainHandle> {
        let previous = self.chains.insert(database_id.clone(), chain);
        if previous.is_some() {
            warn!(
                "[Mux] Chain {} already registered, replacing",
                database_id
            );
        } else {
            info!("[Mux] Registered chain {}", database_id);
        }
        previous
    }

    /// Remove the binding for `database_id`, if any.
    pub fn unregister(&self, database_id: &DatabaseId) -> Option<ChainHandle> {
        let removed = self.chains.remove(database_id).map(|(_, chain)| chain);
        if removed.is_some() {
            info!("[Mux] Unregistered chain {}", database_id);
        } else {
            debug!("[Mux] Unregister of unknown chain {} ignored", database_id);
        }
        removed
    }

    /// Clone of the handle bound to `database_id`.
    pub fn lookup(&self, database_id: &DatabaseId) -> Option<ChainHandle> {
        self.chains.get(database_id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn is_registered(&self, database_id: &DatabaseId) -> bool {
        self.chains.contains_key(database_id)
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Registered ids, sorted.
    pub fn database_ids(&self) -> Vec<DatabaseId> {
        let mut ids: Vec<DatabaseId> = self.chains.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn metrics(&self) -> MuxMetricsSnapshot {
        self.metrics.snapshot(self.chains.len())
    }

    // =========================================================================
    // ROUTING
    // =========================================================================

    fn dispatch<Req, Resp, F>(
        &self,
        method: &'static str,
        request: Mux<Req>,
        call: F,
    ) -> Result<Mux<Resp>, MuxError>
    where
        F: FnOnce(&dyn ChainRpcService, Req) -> Result<Resp, ChainError>,
    {
        let (envelope, database_id, payload) = request.into_parts();

        // The map guard is released here; only the cloned handle is used below.
        let Some(chain) = self.lookup(&database_id) else {
            self.metrics.record_routing_failure();
            debug!(
                method,
                correlation_id = %envelope.correlation_id,
                "[Mux] No chain registered for {}",
                database_id
            );
            return Err(MuxError::UnknownChain { database_id });
        };

        self.metrics.record_dispatch();
        match call(chain.as_ref(), payload) {
            Ok(response) => Ok(Mux::new(envelope, database_id, response)),
            Err(e) => {
                self.metrics.record_rejection();
                debug!(
                    method,
                    database_id = %database_id,
                    code = e.code(),
                    "[Mux] Chain rejected call: {}",
                    e
                );
                Err(MuxError::Chain(e))
            }
        }
    }

    pub fn advise_new_block(
        &self,
        request: Mux<AdviseNewBlockReq>,
    ) -> Result<Mux<AdviseNewBlockResp>, MuxError> {
        self.dispatch("AdviseNewBlock", request, |c, r| c.advise_new_block(r))
    }

    pub fn advise_bin_log(
        &self,
        request: Mux<AdviseBinLogReq>,
    ) -> Result<Mux<AdviseBinLogResp>, MuxError> {
        self.dispatch("AdviseBinLog", request, |c, r| c.advise_bin_log(r))
    }

    pub fn advise_responsed_query(
        &self,
        request: Mux<AdviseResponsedQueryReq>,
    ) -> Result<Mux<AdviseResponsedQueryResp>, MuxError> {
        self.dispatch("AdviseResponsedQuery", request, |c, r| {
            c.advise_responsed_query(r)
        })
    }

    pub fn advise_acked_query(
        &self,
        request: Mux<AdviseAckedQueryReq>,
    ) -> Result<Mux<AdviseAckedQueryResp>, MuxError> {
        self.dispatch("AdviseAckedQuery", request, |c, r| c.advise_acked_query(r))
    }

    pub fn fetch_block(&self, request: Mux<FetchBlockReq>) -> Result<Mux<FetchBlockResp>, MuxError> {
        self.dispatch("FetchBlock", request, |c, r| c.fetch_block(r))
    }

    pub fn fetch_last_block(
        &self,
        request: Mux<FetchLastBlockReq>,
    ) -> Result<Mux<FetchLastBlockResp>, MuxError> {
        self.dispatch("FetchLastBlock", request, |c, r| c.fetch_last_block(r))
    }

    pub fn fetch_block_by_count(
        &self,
        request: Mux<FetchBlockByCountReq>,
    ) -> Result<Mux<FetchBlockByCountResp>, MuxError> {
        self.dispatch("FetchBlockByCount", request, |c, r| c.fetch_block_by_count(r))
    }

    pub fn fetch_acked_query(
        &self,
        request: Mux<FetchAckedQueryReq>,
    ) -> Result<Mux<FetchAckedQueryResp>, MuxError> {
        self.dispatch("FetchAckedQuery", request, |c, r| c.fetch_acked_query(r))
    }

    pub fn sign_billing(
        &self,
        request: Mux<SignBillingReq>,
    ) -> Result<Mux<SignBillingResp>, MuxError> {
        self.dispatch("SignBilling", request, |c, r| c.sign_billing(r))
    }

    /// Single entry point for transports carrying [`ChainRequest`].
    pub fn handle(&self, request: Mux<ChainRequest>) -> Result<Mux<ChainResponse>, MuxError> {
        let method = request.payload.method();
        self.dispatch(method, request, |c, r| c.handle(r))
    }
}

impl Default for MuxService {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SERVICE_NAME)
    }
}
