//! # SQLChain Node Runtime
//!
//! The main entry point for a SQLChain node.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (logging + metrics registry)
//! 2. Load configuration from the environment
//! 3. Warn if the node seed is the default
//! 4. Open configured databases behind the mux and register ledger profiles
//! 5. Start the metrics publisher
//! 6. Wait for Ctrl+C, then drop every database with drain

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use node_runtime::{publisher, NodeConfig, NodeContainer};
use sqlchain_telemetry::{init_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    init_telemetry(&telemetry).context("Failed to initialize telemetry")?;

    let config = NodeConfig::from_env().context("Invalid node configuration")?;
    if let Err(e) = config.validate_for_production() {
        warn!("{}", e);
    }

    let node = NodeContainer::new(config).context("Failed to build node")?;

    info!("===========================================");
    info!("  SQLChain Node Runtime v{}", env!("CARGO_PKG_VERSION"));
    info!("  Mux service: {}", node.mux().service_name());
    info!("===========================================");
    info!(node_id = %node.node_id, databases = ?node.dbms.database_ids(), "Node is running. Press Ctrl+C to stop.");

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let publisher_task = tokio::spawn(publisher::run(
        Arc::clone(&node.dbms),
        Duration::from_secs(telemetry.metrics_interval_secs),
        shutdown_rx,
    ));

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    info!("Initiating graceful shutdown...");
    if let Err(e) = shutdown_tx.send(true) {
        error!("Failed to send shutdown signal: {}", e);
    }
    if let Err(e) = publisher_task.await {
        error!("Metrics publisher ended abnormally: {}", e);
    }

    let stuck = node.dbms.shutdown().await;
    if !stuck.is_empty() {
        warn!(databases = ?stuck, "Databases still had in-flight calls at shutdown");
    }

    info!("Shutdown complete");
    Ok(())
}
