//! Ports (hexagonal architecture) for the SQLChain instance.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
