//! # Node Container
//!
//! Wires the node key, the chain mux, the database lifecycle manager and
//! the ledger service together.

pub mod config;

pub use config::{ConfigError, NodeConfig};

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use sc_01_chain_mux::MuxService;
use sc_02_sqlchain::{Ed25519Signer, Ed25519Verifier, Signer};
use sc_03_block_producer::{LedgerError, LedgerService, SqlChainProfile};
use shared_crypto::Ed25519KeyPair;
use shared_types::{AccountAddress, NodeId, TokenType};

use crate::dbms::{Dbms, DbmsError};

/// Stable-token balance credited to the node's own account at genesis.
pub const GENESIS_BALANCE: u64 = 1_000_000;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error(transparent)]
    Dbms(#[from] DbmsError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Everything one node hosts.
pub struct NodeContainer {
    pub config: NodeConfig,
    pub node_id: NodeId,
    /// Ledger account owned by the node key.
    pub account: AccountAddress,
    pub dbms: Arc<Dbms>,
    pub ledger: Arc<LedgerService>,
}

impl NodeContainer {
    /// Build the node and open every configured database.
    ///
    /// Each database gets a ledger profile with this node as owner and sole
    /// miner.
    pub fn new(config: NodeConfig) -> Result<Self, ContainerError> {
        let signer = Ed25519Signer::new(Ed25519KeyPair::from_seed(config.node_seed));
        let public_key = signer.public_key();
        let node_id = NodeId(public_key);
        let account = AccountAddress::from_public_key(&public_key);

        let mux = Arc::new(MuxService::default());
        let dbms = Arc::new(Dbms::new(
            mux,
            Arc::new(signer),
            Arc::new(Ed25519Verifier),
            &config,
        ));
        let ledger = Arc::new(LedgerService::with_genesis([(
            account,
            TokenType::Stable,
            GENESIS_BALANCE,
        )])?);

        for database_id in &config.databases {
            dbms.create_database(database_id.clone())?;
            ledger.register_profile(SqlChainProfile {
                database_id: database_id.clone(),
                owner: account,
                miners: vec![account],
                quorum: 1,
            })?;
        }

        info!(
            node_id = %node_id,
            databases = config.databases.len(),
            "[Node] Container initialized"
        );

        Ok(Self {
            config,
            node_id,
            account,
            dbms,
            ledger,
        })
    }

    pub fn mux(&self) -> &Arc<MuxService> {
        self.dbms.mux()
    }
}
