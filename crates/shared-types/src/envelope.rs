//! # Call Envelope
//!
//! Per-call metadata carried on every request and response, plus the two
//! wrappers used on the wire:
//!
//! - `Enveloped<T>`: envelope + payload, for single-service calls
//!   (e.g. the global ledger chain).
//! - `Mux<T>`: envelope + database id + payload, for calls routed through
//!   the chain multiplexer.
//!
//! ## Properties
//!
//! - **Versioning**: All envelopes include a `version` field.
//! - **Correlation**: Responses carry the `correlation_id` of their request.
//! - **Origin**: `node_id` identifies the calling node; payloads do not repeat it.

use crate::entities::{DatabaseId, NodeId};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Metadata the transport attaches to every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Protocol version for forward compatibility.
    pub version: u16,
    /// Originating node.
    pub node_id: NodeId,
    /// Correlates a response with its request.
    pub correlation_id: Uuid,
    /// Unix timestamp (seconds) when the call was created.
    pub timestamp: u64,
    /// Seconds the caller is willing to wait. 0 means unbounded.
    pub ttl_secs: u64,
}

impl Envelope {
    /// Current protocol version.
    pub const CURRENT_VERSION: u16 = 1;

    /// A fresh envelope for a new call from `node_id`.
    pub fn new(node_id: NodeId) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            node_id,
            correlation_id: Uuid::new_v4(),
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            ttl_secs: 0,
        }
    }

    pub fn with_ttl(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }
}

/// A payload with its envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enveloped<T> {
    pub envelope: Envelope,
    pub payload: T,
}

impl<T> Enveloped<T> {
    pub fn new(envelope: Envelope, payload: T) -> Self {
        Self { envelope, payload }
    }

    /// Wrap a response payload with this request's envelope.
    pub fn reply<R>(&self, payload: R) -> Enveloped<R> {
        Enveloped {
            envelope: self.envelope.clone(),
            payload,
        }
    }
}

/// A payload addressed to one chain behind a multiplexed endpoint.
///
/// The triple (envelope, database id, payload) is the unit of wire
/// compatibility for chain-scoped calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mux<T> {
    pub envelope: Envelope,
    pub database_id: DatabaseId,
    pub payload: T,
}

impl<T> Mux<T> {
    pub fn new(envelope: Envelope, database_id: DatabaseId, payload: T) -> Self {
        Self {
            envelope,
            database_id,
            payload,
        }
    }

    /// Split into routing header and payload.
    pub fn into_parts(self) -> (Envelope, DatabaseId, T) {
        (self.envelope, self.database_id, self.payload)
    }
}
