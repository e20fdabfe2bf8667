//! # SQLChain Telemetry
//!
//! Logging and metrics for SQLChain nodes.
//!
//! ## Components
//!
//! - Structured logging over `tracing-subscriber` (JSON or pretty)
//! - Prometheus metrics for the mux, the chain instances and the DBMS
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sqlchain_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> Result<(), sqlchain_telemetry::TelemetryError> {
//!     init_telemetry(&TelemetryConfig::from_env())?;
//!     // Logs and metrics are now being collected
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SC_SERVICE_NAME` | `sqlchain` | Service name in logs |
//! | `SC_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `SC_JSON_LOGS` | `false` | JSON log lines |
//! | `SC_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `SC_METRICS_INTERVAL_SECS` | `15` | Metric publish interval |

#![warn(missing_docs)]

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::{build_filter, init_logging};
pub use metrics::{encode_metrics, forget_database, register_metrics, HistogramTimer};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Global subscriber could not be installed
    #[error("Failed to initialize logger: {0}")]
    LoggerInit(String),

    /// Metric registration or encoding failed
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging and register metrics.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)
}
