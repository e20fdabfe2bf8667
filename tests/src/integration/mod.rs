//! Integration flows across the mux, chain instances, ledger and runtime.

pub mod fixtures;

mod billing_flow;
mod mux_routing;
mod node_lifecycle;
mod query_flow;
