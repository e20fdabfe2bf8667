//! # Chain Mux
//!
//! Hosts any number of independently-lived SQLChain instances behind a single
//! RPC endpoint and routes each call to the instance named by its database id.
//!
//! ## Architecture
//!
//! ```text
//! transport ──► Mux<Req> ──► MuxService ──► Arc<dyn ChainRpcService> ──► Resp
//!                               │                                         │
//!                               └── UnknownChain (no instance invoked)    │
//!                                                     Mux<Resp> ◄─────────┘
//! ```
//!
//! - [`catalog`]: request/response pairs of the chain protocol
//! - [`ports::outbound::ChainRpcService`]: the contract every chain instance implements
//! - [`MuxService`]: registry and router
//!
//! ## Error codes
//!
//! | Range | Meaning |
//! |-------|---------|
//! | 1000 | routing: database id not hosted here |
//! | 2xxx | protocol: out-of-order or inconsistent advice |
//! | 3xxx | verification: signature or content check failed |
//! | 4xxx | policy: admission denied |
//! | 5xxx | internal |

pub mod catalog;
pub mod errors;
pub mod metrics;
pub mod ports;
pub mod service;

pub use catalog::*;
pub use errors::{ChainError, ErrorKind, MuxError, ERR_UNKNOWN_CHAIN};
pub use metrics::{MuxMetrics, MuxMetricsSnapshot};
pub use ports::outbound::ChainRpcService;
pub use service::MuxService;
