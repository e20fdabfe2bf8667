//! Ports for the chain mux.

pub mod outbound;
