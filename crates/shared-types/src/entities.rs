//! # Core Domain Entities
//!
//! Defines the entities exchanged between SQLChain participants.
//!
//! ## Clusters
//!
//! - **Identity**: `DatabaseId`, `NodeId`, `AccountAddress`
//! - **Chain**: `Block`, `BlockHeader`, `BlockRef`, `BillingSummary`
//! - **Queries**: `Query`, `QueryResponse`, `QueryAck`
//! - **Replication**: `BinLogSegment`, `BinLogEntry`
//! - **Settlement**: `BillingRecord`, `BillingSignature`, `AccountState`, `TokenType`

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A 32-byte SHA-256 hash.
pub type Hash = [u8; 32];

/// A 64-byte Ed25519 signature.
pub type Signature = [u8; 64];

/// A 32-byte Ed25519 public key.
pub type PublicKey = [u8; 32];

/// Height of the first block of every chain.
pub const GENESIS_HEIGHT: u64 = 1;

/// Identifies one logical database and therefore one SQLChain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DatabaseId(pub String);

impl DatabaseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatabaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DatabaseId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Unique identifier for a node in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct NodeId(pub [u8; 32]);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0[..4] {
            write!(f, "{:02x}", byte)?;
        }
        f.write_str("..")
    }
}

/// Ledger account address, derived from a public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct AccountAddress(pub Hash);

impl AccountAddress {
    /// Derive the address owned by `public_key`.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Self(sha256(&[public_key.as_slice()]))
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0[..4] {
            write!(f, "{:02x}", byte)?;
        }
        f.write_str("..")
    }
}

/// SHA-256 over the concatenation of `parts`.
pub fn sha256(parts: &[&[u8]]) -> Hash {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Hash of the canonical bincode encoding of `value`.
pub fn canonical_hash<T: Serialize>(value: &T) -> Hash {
    // Encoding plain structs into a Vec cannot fail.
    let bytes = bincode::serialize(value).unwrap_or_default();
    sha256(&[&bytes])
}

// =============================================================================
// CLUSTER B: THE CHAIN
// =============================================================================

/// Reference to a previously accepted block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRef {
    pub height: u64,
    pub hash: Hash,
}

/// Header of a SQLChain block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Protocol version for this block.
    pub version: u16,
    /// Chain this block belongs to.
    pub database_id: DatabaseId,
    /// Block height. The first block has `GENESIS_HEIGHT`.
    pub height: u64,
    /// Predecessor. `None` only for the first block.
    pub parent: Option<BlockRef>,
    /// Key of the node that produced the block.
    pub producer: PublicKey,
    /// Production time, Unix seconds.
    pub timestamp: u64,
}

/// One payee line of a billing summary or record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingEntry {
    pub payee: AccountAddress,
    pub amount: u64,
}

/// Resource usage produced by one block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSummary {
    pub entries: Vec<BillingEntry>,
}

impl BillingSummary {
    pub fn total(&self) -> Option<u64> {
        self.entries
            .iter()
            .try_fold(0u64, |acc, e| acc.checked_add(e.amount))
    }
}

/// An ordered, immutable batch of committed queries.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    /// Queries committed by this block, in chain order.
    pub queries: Vec<QueryId>,
    /// Billing delta produced by this block.
    pub billing: BillingSummary,
    /// Producer signature over [`Block::hash`].
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
}

impl Block {
    /// Hash over header, query list and billing summary.
    pub fn hash(&self) -> Hash {
        canonical_hash(&(&self.header, &self.queries, &self.billing))
    }

    pub fn height(&self) -> u64 {
        self.header.height
    }

    /// A reference to this block, for use as the next block's parent.
    pub fn block_ref(&self) -> BlockRef {
        BlockRef {
            height: self.header.height,
            hash: self.hash(),
        }
    }
}

// =============================================================================
// CLUSTER C: QUERIES
// =============================================================================

/// Identifier of a query: hash of client, sequence and payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueryId(pub Hash);

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0[..6] {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Read queries are answered without mutation; write queries change state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryKind {
    Read,
    Write,
}

/// The SQL carried by a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPayload {
    pub kind: QueryKind,
    pub statements: Vec<String>,
    /// Tables touched by the statements, used for policy checks.
    pub tables: Vec<String>,
}

/// A client SQL request flowing through a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub database_id: DatabaseId,
    /// Key of the submitting client.
    pub client: PublicKey,
    /// Client-side sequence hint.
    pub sequence: u64,
    pub payload: QueryPayload,
    /// Submission time, Unix seconds.
    pub timestamp: u64,
}

impl Query {
    pub fn id(&self) -> QueryId {
        QueryId(canonical_hash(&(
            &self.database_id,
            &self.client,
            self.sequence,
            &self.payload,
        )))
    }
}

/// Execution summary attached to a response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    pub affected_rows: u64,
    pub last_insert_id: i64,
    pub row_count: u64,
    /// Hash of the full result set.
    pub result_hash: Hash,
}

/// A query response signed by the node that executed it.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub query_id: QueryId,
    pub responder: PublicKey,
    pub result: QueryResult,
    pub timestamp: u64,
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
}

impl QueryResponse {
    /// Hash covered by the responder signature.
    pub fn hash(&self) -> Hash {
        canonical_hash(&(
            &self.query_id,
            &self.responder,
            &self.result,
            self.timestamp,
        ))
    }
}

/// A client acknowledgment of a response.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAck {
    pub query_id: QueryId,
    /// Hash of the acknowledged response.
    pub response_hash: Hash,
    pub client: PublicKey,
    pub timestamp: u64,
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
}

impl QueryAck {
    /// Hash covered by the client signature.
    pub fn hash(&self) -> Hash {
        canonical_hash(&(
            &self.query_id,
            &self.response_hash,
            &self.client,
            self.timestamp,
        ))
    }
}

// =============================================================================
// CLUSTER D: REPLICATION
// =============================================================================

/// A single write-ahead log record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinLogEntry {
    pub query_id: QueryId,
    pub data: Vec<u8>,
}

/// A contiguous run of write-ahead log records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinLogSegment {
    /// Offset of the first entry.
    pub start_offset: u64,
    pub entries: Vec<BinLogEntry>,
}

impl BinLogSegment {
    /// Offset just past the last entry.
    pub fn end_offset(&self) -> u64 {
        self.start_offset + self.entries.len() as u64
    }
}

// =============================================================================
// CLUSTER E: SETTLEMENT
// =============================================================================

/// One participant signature on a billing record.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSignature {
    pub signee: PublicKey,
    #[serde_as(as = "Bytes")]
    pub signature: Signature,
}

/// Resource-usage settlement for one billing cycle of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingRecord {
    pub database_id: DatabaseId,
    /// Monotonic billing cycle number.
    pub cycle: u64,
    /// First block covered, inclusive.
    pub start_height: u64,
    /// Last block covered, inclusive.
    pub end_height: u64,
    pub payer: AccountAddress,
    pub entries: Vec<BillingEntry>,
    pub signatures: Vec<BillingSignature>,
}

impl BillingRecord {
    /// Hash covered by participant signatures. Excludes the signatures.
    pub fn signing_hash(&self) -> Hash {
        canonical_hash(&(
            &self.database_id,
            self.cycle,
            self.start_height,
            self.end_height,
            &self.payer,
            &self.entries,
        ))
    }

    /// Entries merged per payee and sorted by payee.
    ///
    /// Returns `None` on amount overflow.
    pub fn normalized_entries(&self) -> Option<Vec<BillingEntry>> {
        normalize_billing(self.entries.iter())
    }

    pub fn is_signed_by(&self, signee: &PublicKey) -> bool {
        self.signatures.iter().any(|s| &s.signee == signee)
    }

    /// Attach a signature. Returns `false` if this signee already signed.
    ///
    /// The signature itself is not checked here.
    pub fn add_signature(&mut self, signature: BillingSignature) -> bool {
        if self.is_signed_by(&signature.signee) {
            return false;
        }
        self.signatures.push(signature);
        true
    }

    /// True once at least `quorum` distinct participants signed.
    pub fn is_final(&self, quorum: usize) -> bool {
        quorum > 0 && self.signatures.len() >= quorum
    }
}

/// Merge entries per payee, sorted by payee. `None` on overflow.
pub fn normalize_billing<'a>(
    entries: impl Iterator<Item = &'a BillingEntry>,
) -> Option<Vec<BillingEntry>> {
    let mut totals: BTreeMap<AccountAddress, u64> = BTreeMap::new();
    for entry in entries {
        let total = totals.entry(entry.payee).or_insert(0);
        *total = total.checked_add(entry.amount)?;
    }
    Some(
        totals
            .into_iter()
            .filter(|(_, amount)| *amount > 0)
            .map(|(payee, amount)| BillingEntry { payee, amount })
            .collect(),
    )
}

/// Tokens held on the ledger chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    /// Pays for database usage and settles billing.
    Stable,
    /// Native token of the ledger chain.
    Covenant,
}

impl TokenType {
    pub const ALL: [TokenType; 2] = [TokenType::Stable, TokenType::Covenant];
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Stable => f.write_str("stable"),
            TokenType::Covenant => f.write_str("covenant"),
        }
    }
}

/// Ledger-visible state of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AccountState {
    pub address: AccountAddress,
    pub stable_balance: u64,
    pub covenant_balance: u64,
    /// Nonce of the last applied transaction; 0 for a fresh account.
    pub nonce: u64,
}

impl AccountState {
    pub fn balance(&self, token: TokenType) -> u64 {
        match token {
            TokenType::Stable => self.stable_balance,
            TokenType::Covenant => self.covenant_balance,
        }
    }

    pub fn balance_mut(&mut self, token: TokenType) -> &mut u64 {
        match token {
            TokenType::Stable => &mut self.stable_balance,
            TokenType::Covenant => &mut self.covenant_balance,
        }
    }
}
