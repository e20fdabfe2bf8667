//! # Shared Crypto
//!
//! Signing primitives for SQLChain participants.
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `signatures` | Ed25519 | Block, query, ack and billing attestation |
//!
//! Key storage is not handled here; callers hand in a seed.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod signatures;

pub use errors::CryptoError;
pub use signatures::{verify, Ed25519KeyPair, PublicKeyBytes, SignatureBytes};
