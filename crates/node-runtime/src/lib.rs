//! # Node Runtime Library
//!
//! This library exposes the internal modules of the node runtime for testing.
//! The main entry point is the `main.rs` binary.
//!
//! - `container/` - configuration and wiring of mux, databases and ledger
//! - `dbms` - database open/drop with drain on drop
//! - `publisher` - periodic Prometheus export of in-process counters

pub mod container;
pub mod dbms;
pub mod publisher;

pub use container::{ConfigError, ContainerError, NodeConfig, NodeContainer};
pub use dbms::{Dbms, DbmsError};
pub use publisher::MetricsPublisher;
