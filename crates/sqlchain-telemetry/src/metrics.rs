//! Prometheus metrics for SQLChain nodes.
//!
//! All metrics follow the naming convention: `sc_<component>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., `sc_mux_dispatched_total`)
//! - **Gauge**: Value that can go up or down (e.g., `sc_chain_height`)
//! - **Histogram**: Distribution of values (e.g., `sc_dbms_drain_duration_seconds`)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, Histogram, IntCounter, IntCounterVec, IntGauge, IntGaugeVec,
    Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // MUX METRICS
    // =========================================================================

    /// Requests delivered to a registered chain
    pub static ref MUX_DISPATCHED: IntCounter = IntCounter::new(
        "sc_mux_dispatched_total",
        "Requests delivered to a registered chain instance"
    ).expect("metric creation failed");

    /// Requests naming a database with no registered chain
    pub static ref MUX_ROUTING_FAILURES: IntCounter = IntCounter::new(
        "sc_mux_routing_failures_total",
        "Requests rejected because the database id was not registered"
    ).expect("metric creation failed");

    /// Requests the chain instance itself rejected
    pub static ref MUX_CHAIN_REJECTIONS: IntCounter = IntCounter::new(
        "sc_mux_chain_rejections_total",
        "Requests rejected by the target chain instance"
    ).expect("metric creation failed");

    /// Chains currently registered
    pub static ref MUX_REGISTERED_CHAINS: IntGauge = IntGauge::new(
        "sc_mux_registered_chains",
        "Number of chain instances currently registered with the mux"
    ).expect("metric creation failed");

    // =========================================================================
    // CHAIN METRICS
    // =========================================================================

    /// Head height per database
    pub static ref CHAIN_HEIGHT: IntGaugeVec = IntGaugeVec::new(
        Opts::new("sc_chain_height", "Height of the local head block"),
        &["database"]
    ).expect("metric creation failed");

    /// Binlog offset per database
    pub static ref CHAIN_BINLOG_OFFSET: IntGaugeVec = IntGaugeVec::new(
        Opts::new("sc_chain_binlog_offset", "Next expected binlog offset"),
        &["database"]
    ).expect("metric creation failed");

    /// Chain events per database
    pub static ref CHAIN_EVENTS: IntCounterVec = IntCounterVec::new(
        Opts::new("sc_chain_events_total", "Chain events by kind"),
        &["database", "event"]  // event: block_accepted/block_rejected/query_committed/...
    ).expect("metric creation failed");

    // =========================================================================
    // DBMS METRICS
    // =========================================================================

    /// Time spent waiting for in-flight requests when dropping a database
    pub static ref DRAIN_DURATION: Histogram = Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "sc_dbms_drain_duration_seconds",
            "Time spent draining in-flight requests on database drop"
        ).buckets(exponential_buckets(0.001, 2.0, 14).expect("valid bucket layout"))
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; already-registered collectors are skipped.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Mux
        Box::new(MUX_DISPATCHED.clone()),
        Box::new(MUX_ROUTING_FAILURES.clone()),
        Box::new(MUX_CHAIN_REJECTIONS.clone()),
        Box::new(MUX_REGISTERED_CHAINS.clone()),
        // Chains
        Box::new(CHAIN_HEIGHT.clone()),
        Box::new(CHAIN_BINLOG_OFFSET.clone()),
        Box::new(CHAIN_EVENTS.clone()),
        // Dbms
        Box::new(DRAIN_DURATION.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Drop all per-database series for a database that no longer exists.
pub fn forget_database(database: &str) {
    let _ = CHAIN_HEIGHT.remove_label_values(&[database]);
    let _ = CHAIN_BINLOG_OFFSET.remove_label_values(&[database]);
    for event in CHAIN_EVENT_KINDS {
        let _ = CHAIN_EVENTS.remove_label_values(&[database, event]);
    }
}

/// Event labels used with [`CHAIN_EVENTS`].
pub const CHAIN_EVENT_KINDS: [&str; 5] = [
    "block_accepted",
    "block_rejected",
    "query_committed",
    "query_rejected",
    "billing_signed",
];

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
