//! Ledger RPC request and response types.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use shared_crypto::Ed25519KeyPair;
use shared_types::{
    canonical_hash, AccountAddress, DatabaseId, Hash, PublicKey, Signature, TokenType,
};

use crate::domain::SqlChainProfile;

// =============================================================================
// CLUSTER A: ACCOUNTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextAccountNonceReq {
    pub addr: AccountAddress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextAccountNonceResp {
    pub addr: AccountAddress,
    /// Nonce the account's next transaction must carry.
    pub nonce: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAccountStableBalanceReq {
    pub addr: AccountAddress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAccountStableBalanceResp {
    pub addr: AccountAddress,
    /// False when the ledger has never seen the account.
    pub ok: bool,
    pub balance: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAccountCovenantBalanceReq {
    pub addr: AccountAddress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAccountCovenantBalanceResp {
    pub addr: AccountAddress,
    pub ok: bool,
    pub balance: u64,
}

// =============================================================================
// CLUSTER B: TRANSACTIONS
// =============================================================================

/// A signed balance transfer of one token.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: AccountAddress,
    pub to: AccountAddress,
    pub token: TokenType,
    pub amount: u64,
    pub nonce: u64,
    /// Key whose address must equal `from`.
    pub signee: PublicKey,
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
}

impl Transfer {
    /// Build and sign a transfer from the account owned by `keypair`.
    pub fn signed(
        keypair: &Ed25519KeyPair,
        to: AccountAddress,
        token: TokenType,
        amount: u64,
        nonce: u64,
    ) -> Self {
        let signee = keypair.public_key();
        let mut tx = Self {
            from: AccountAddress::from_public_key(&signee),
            to,
            token,
            amount,
            nonce,
            signee,
            signature: [0u8; 64],
        };
        tx.signature = keypair.sign(&tx.signing_hash());
        tx
    }

    /// Hash covered by the signature.
    pub fn signing_hash(&self) -> Hash {
        canonical_hash(&(
            &self.from,
            &self.to,
            self.token,
            self.amount,
            self.nonce,
            &self.signee,
        ))
    }
}

/// Tokens observed arriving for `receiver` from outside the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenReceiveHeader {
    pub token: TokenType,
    pub amount: u64,
    /// Next nonce of the observer account.
    pub nonce: u64,
    pub observer: AccountAddress,
    pub receiver: AccountAddress,
}

/// A token credit signed by an authorized observer.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenReceive {
    pub header: TokenReceiveHeader,
    /// Key whose address must equal `header.observer`.
    pub signee: PublicKey,
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
}

impl TokenReceive {
    /// Build and sign a credit observed by the account owned by `keypair`.
    pub fn signed(
        keypair: &Ed25519KeyPair,
        receiver: AccountAddress,
        token: TokenType,
        amount: u64,
        nonce: u64,
    ) -> Self {
        let signee = keypair.public_key();
        let mut tx = Self {
            header: TokenReceiveHeader {
                token,
                amount,
                nonce,
                observer: AccountAddress::from_public_key(&signee),
                receiver,
            },
            signee,
            signature: [0u8; 64],
        };
        tx.signature = keypair.sign(&tx.signing_hash());
        tx
    }

    pub fn signing_hash(&self) -> Hash {
        canonical_hash(&(&self.header, &self.signee))
    }
}

/// Transactions accepted by `AddTx`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tx {
    Transfer(Transfer),
    TokenReceive(TokenReceive),
}

impl Tx {
    /// Account whose nonce the transaction consumes.
    pub fn account(&self) -> AccountAddress {
        match self {
            Tx::Transfer(tx) => tx.from,
            Tx::TokenReceive(tx) => tx.header.observer,
        }
    }

    pub fn nonce(&self) -> u64 {
        match self {
            Tx::Transfer(tx) => tx.nonce,
            Tx::TokenReceive(tx) => tx.header.nonce,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Tx::Transfer(_) => "transfer",
            Tx::TokenReceive(_) => "token_receive",
        }
    }
}

impl From<Transfer> for Tx {
    fn from(tx: Transfer) -> Self {
        Tx::Transfer(tx)
    }
}

impl From<TokenReceive> for Tx {
    fn from(tx: TokenReceive) -> Self {
        Tx::TokenReceive(tx)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTxReq {
    pub tx: Tx,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTxResp {}

// =============================================================================
// CLUSTER C: PROFILES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySqlChainProfileReq {
    pub database_id: DatabaseId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySqlChainProfileResp {
    pub profile: SqlChainProfile,
}
