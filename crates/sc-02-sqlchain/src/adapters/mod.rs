//! Adapters for the outbound ports.

pub mod crypto;
pub mod policy_store;

pub use crypto::{Ed25519Signer, Ed25519Verifier};
pub use policy_store::InMemoryPolicyStore;
