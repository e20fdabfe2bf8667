//! Account balances, nonces and SQLChain profiles.
//!
//! Pure state; locking and logging live in the service.

use serde::{Deserialize, Serialize};
use shared_types::{AccountAddress, AccountState, DatabaseId, TokenType};
use std::collections::{HashMap, HashSet};

use super::LedgerError;
use crate::catalog::{TokenReceive, Transfer, Tx};

/// Ledger-side description of one SQLChain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlChainProfile {
    pub database_id: DatabaseId,
    /// Account that pays for the database.
    pub owner: AccountAddress,
    /// Accounts of the nodes hosting the chain.
    pub miners: Vec<AccountAddress>,
    /// Billing signatures needed before a record is final.
    pub quorum: usize,
}

impl SqlChainProfile {
    fn validate(&self) -> Result<(), LedgerError> {
        if self.miners.is_empty() {
            return Err(LedgerError::InvalidProfile("no miners".into()));
        }
        if self.quorum == 0 || self.quorum > self.miners.len() {
            return Err(LedgerError::InvalidProfile(format!(
                "quorum {} with {} miners",
                self.quorum,
                self.miners.len()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Ledger {
    accounts: HashMap<AccountAddress, AccountState>,
    profiles: HashMap<DatabaseId, SqlChainProfile>,
    /// Accounts allowed to sign `TokenReceive`.
    observers: HashSet<AccountAddress>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit initial balances. Later allocations to the same address and
    /// token add up.
    pub fn with_genesis(
        allocations: impl IntoIterator<Item = (AccountAddress, TokenType, u64)>,
    ) -> Result<Self, LedgerError> {
        let mut ledger = Self::new();
        for (addr, token, amount) in allocations {
            let balance = ledger.account_mut(addr).balance_mut(token);
            *balance = balance
                .checked_add(amount)
                .ok_or(LedgerError::BalanceOverflow { addr })?;
        }
        Ok(ledger)
    }

    pub fn account(&self, addr: &AccountAddress) -> Option<&AccountState> {
        self.accounts.get(addr)
    }

    fn balance(&self, addr: &AccountAddress, token: TokenType) -> u64 {
        self.accounts.get(addr).map_or(0, |a| a.balance(token))
    }

    /// Nonce the next transaction from `addr` must carry.
    pub fn next_nonce(&self, addr: &AccountAddress) -> u64 {
        self.accounts.get(addr).map_or(0, |a| a.nonce) + 1
    }

    fn account_mut(&mut self, addr: AccountAddress) -> &mut AccountState {
        self.accounts.entry(addr).or_insert_with(|| AccountState {
            address: addr,
            ..AccountState::default()
        })
    }

    fn check_nonce(&self, addr: &AccountAddress, got: u64) -> Result<(), LedgerError> {
        let expected = self.next_nonce(addr);
        if got != expected {
            return Err(LedgerError::NonceMismatch { expected, got });
        }
        Ok(())
    }

    fn check_credit(
        &self,
        addr: AccountAddress,
        token: TokenType,
        amount: u64,
    ) -> Result<(), LedgerError> {
        match self.balance(&addr, token).checked_add(amount) {
            Some(_) => Ok(()),
            None => Err(LedgerError::BalanceOverflow { addr }),
        }
    }

    pub fn add_observer(&mut self, observer: AccountAddress) {
        self.observers.insert(observer);
    }

    pub fn is_observer(&self, addr: &AccountAddress) -> bool {
        self.observers.contains(addr)
    }

    /// Check a transfer against current state without applying it.
    ///
    /// Signature checks are the caller's; this covers nonce and balances.
    pub fn check_transfer(&self, tx: &Transfer) -> Result<(), LedgerError> {
        self.check_nonce(&tx.from, tx.nonce)?;

        let available = self.balance(&tx.from, tx.token);
        if available < tx.amount {
            return Err(LedgerError::InsufficientBalance {
                token: tx.token,
                required: tx.amount,
                available,
            });
        }

        if tx.to != tx.from {
            self.check_credit(tx.to, tx.token, tx.amount)?;
        }
        Ok(())
    }

    /// Apply a transfer: both balances of its token and the sender nonce,
    /// or nothing.
    pub fn apply_transfer(&mut self, tx: &Transfer) -> Result<(), LedgerError> {
        self.check_transfer(tx)?;

        let sender = self.account_mut(tx.from);
        *sender.balance_mut(tx.token) -= tx.amount;
        sender.nonce = tx.nonce;

        *self.account_mut(tx.to).balance_mut(tx.token) += tx.amount;
        Ok(())
    }

    pub fn check_token_receive(&self, tx: &TokenReceive) -> Result<(), LedgerError> {
        let header = &tx.header;
        if !self.is_observer(&header.observer) {
            return Err(LedgerError::UnknownObserver {
                observer: header.observer,
            });
        }
        self.check_nonce(&header.observer, header.nonce)?;
        self.check_credit(header.receiver, header.token, header.amount)
    }

    /// Credit the receiver and consume the observer's nonce, or nothing.
    pub fn apply_token_receive(&mut self, tx: &TokenReceive) -> Result<(), LedgerError> {
        self.check_token_receive(tx)?;

        let header = &tx.header;
        self.account_mut(header.observer).nonce = header.nonce;
        *self
            .account_mut(header.receiver)
            .balance_mut(header.token) += header.amount;
        Ok(())
    }

    pub fn apply_tx(&mut self, tx: &Tx) -> Result<(), LedgerError> {
        match tx {
            Tx::Transfer(tx) => self.apply_transfer(tx),
            Tx::TokenReceive(tx) => self.apply_token_receive(tx),
        }
    }

    pub fn profile(&self, database_id: &DatabaseId) -> Option<&SqlChainProfile> {
        self.profiles.get(database_id)
    }

    pub fn register_profile(&mut self, profile: SqlChainProfile) -> Result<(), LedgerError> {
        profile.validate()?;
        if self.profiles.contains_key(&profile.database_id) {
            return Err(LedgerError::DuplicateProfile {
                database_id: profile.database_id,
            });
        }
        self.profiles.insert(profile.database_id.clone(), profile);
        Ok(())
    }
}
