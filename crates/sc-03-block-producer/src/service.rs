//! # Ledger Service
//!
//! Serves [`LedgerApi`] over one in-memory [`Ledger`].

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};

use crate::catalog::*;
use crate::domain::{Ledger, LedgerError, SqlChainProfile};
use crate::ports::LedgerApi;
use shared_types::{AccountAddress, Enveloped, Hash, PublicKey, Signature, TokenType};

#[derive(Debug, Default)]
pub struct LedgerStats {
    pub tx_applied: AtomicU64,
    pub tx_rejected: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStatsSnapshot {
    pub tx_applied: u64,
    pub tx_rejected: u64,
    pub profiles: u64,
}

pub struct LedgerService {
    ledger: RwLock<Ledger>,
    profiles: AtomicU64,
    stats: LedgerStats,
}

impl LedgerService {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: RwLock::new(ledger),
            profiles: AtomicU64::new(0),
            stats: LedgerStats::default(),
        }
    }

    /// A ledger with initial balances credited.
    pub fn with_genesis(
        allocations: impl IntoIterator<Item = (AccountAddress, TokenType, u64)>,
    ) -> Result<Self, LedgerError> {
        Ok(Self::new(Ledger::with_genesis(allocations)?))
    }

    /// Allow `observer` to sign `TokenReceive` credits.
    pub fn register_observer(&self, observer: AccountAddress) {
        self.ledger.write().add_observer(observer);
        info!(observer = %observer, "[Ledger] Token observer registered");
    }

    pub fn register_profile(&self, profile: SqlChainProfile) -> Result<(), LedgerError> {
        let database_id = profile.database_id.clone();
        let quorum = profile.quorum;
        self.ledger.write().register_profile(profile)?;
        self.profiles.fetch_add(1, Ordering::Relaxed);
        info!(
            database_id = %database_id,
            quorum,
            "[Ledger] SQLChain profile registered"
        );
        Ok(())
    }

    pub fn stats(&self) -> LedgerStatsSnapshot {
        LedgerStatsSnapshot {
            tx_applied: self.stats.tx_applied.load(Ordering::Relaxed),
            tx_rejected: self.stats.tx_rejected.load(Ordering::Relaxed),
            profiles: self.profiles.load(Ordering::Relaxed),
        }
    }

    fn verify_signee(
        account: AccountAddress,
        signee: &PublicKey,
        hash: &Hash,
        signature: &Signature,
    ) -> Result<(), LedgerError> {
        if AccountAddress::from_public_key(signee) != account {
            return Err(LedgerError::SigneeMismatch { from: account });
        }
        shared_crypto::verify(signee, hash, signature).map_err(|_| LedgerError::InvalidSignature)
    }

    fn verify_tx(tx: &Tx) -> Result<(), LedgerError> {
        match tx {
            Tx::Transfer(t) => Self::verify_signee(t.from, &t.signee, &t.signing_hash(), &t.signature),
            Tx::TokenReceive(t) => Self::verify_signee(
                t.header.observer,
                &t.signee,
                &t.signing_hash(),
                &t.signature,
            ),
        }
    }

    fn balance_of(&self, addr: &AccountAddress, token: TokenType) -> (bool, u64) {
        self.ledger
            .read()
            .account(addr)
            .map_or((false, 0), |a| (true, a.balance(token)))
    }
}

impl LedgerApi for LedgerService {
    fn next_account_nonce(
        &self,
        req: Enveloped<NextAccountNonceReq>,
    ) -> Result<Enveloped<NextAccountNonceResp>, LedgerError> {
        let addr = req.payload.addr;
        let nonce = self.ledger.read().next_nonce(&addr);
        Ok(req.reply(NextAccountNonceResp { addr, nonce }))
    }

    fn query_account_stable_balance(
        &self,
        req: Enveloped<QueryAccountStableBalanceReq>,
    ) -> Result<Enveloped<QueryAccountStableBalanceResp>, LedgerError> {
        let addr = req.payload.addr;
        let (ok, balance) = self.balance_of(&addr, TokenType::Stable);
        Ok(req.reply(QueryAccountStableBalanceResp { addr, ok, balance }))
    }

    fn query_account_covenant_balance(
        &self,
        req: Enveloped<QueryAccountCovenantBalanceReq>,
    ) -> Result<Enveloped<QueryAccountCovenantBalanceResp>, LedgerError> {
        let addr = req.payload.addr;
        let (ok, balance) = self.balance_of(&addr, TokenType::Covenant);
        Ok(req.reply(QueryAccountCovenantBalanceResp { addr, ok, balance }))
    }

    fn add_tx(&self, req: Enveloped<AddTxReq>) -> Result<Enveloped<AddTxResp>, LedgerError> {
        let tx = &req.payload.tx;
        let result = Self::verify_tx(tx).and_then(|()| self.ledger.write().apply_tx(tx));

        match result {
            Ok(()) => {
                self.stats.tx_applied.fetch_add(1, Ordering::Relaxed);
                info!(
                    kind = tx.kind(),
                    account = %tx.account(),
                    nonce = tx.nonce(),
                    "[Ledger] Transaction applied"
                );
                Ok(req.reply(AddTxResp {}))
            }
            Err(e) => {
                self.stats.tx_rejected.fetch_add(1, Ordering::Relaxed);
                warn!(
                    kind = tx.kind(),
                    account = %tx.account(),
                    nonce = tx.nonce(),
                    "[Ledger] Transaction rejected: {}",
                    e
                );
                Err(e)
            }
        }
    }

    fn query_sql_chain_profile(
        &self,
        req: Enveloped<QuerySqlChainProfileReq>,
    ) -> Result<Enveloped<QuerySqlChainProfileResp>, LedgerError> {
        let database_id = &req.payload.database_id;
        let profile = self
            .ledger
            .read()
            .profile(database_id)
            .cloned()
            .ok_or_else(|| LedgerError::ProfileNotFound {
                database_id: database_id.clone(),
            })?;
        Ok(req.reply(QuerySqlChainProfileResp { profile }))
    }
}
