//! # SQLChain Test Suite
//!
//! Cross-crate flows that need more than one component: several replicas
//! behind their own muxes, billing collection across nodes, ledger
//! settlement, and the node runtime's database lifecycle.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs        # replicas, signed blocks, mux-backed peers
//!     ├── mux_routing.rs     # routing, envelope echo, registry churn
//!     ├── query_flow.rs      # query ordering and binlog across replicas
//!     ├── billing_flow.rs    # signature collection and ledger settlement
//!     └── node_lifecycle.rs  # runtime container, drain on drop, metrics
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p sc-tests
//! cargo test -p sc-tests integration::billing_flow
//! cargo bench -p sc-tests
//! ```

pub mod integration;
