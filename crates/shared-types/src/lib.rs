//! # Shared Types Crate
//!
//! This crate contains the entities and wire envelopes shared by every
//! SQLChain component: the chain multiplexer, the chain instances and the
//! global ledger chain.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-crate types are defined here.
//! - **Explicit Wrapping**: `Mux<T>` and `Enveloped<T>` compose envelope,
//!   routing key and payload as plain fields.
//! - **No Redundant Identity**: Payloads do not repeat the caller's node id;
//!   the envelope's `node_id` is authoritative.

pub mod entities;
pub mod envelope;

pub use entities::*;
pub use envelope::{Envelope, Enveloped, Mux};
