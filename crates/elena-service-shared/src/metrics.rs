//! Prometheus metrics for the Elena services.
//!
//! - [`MetricsConfig`]: `METRICS_ENABLED` / `METRICS_PATH`
//! - [`init_metrics`]: install the Prometheus recorder once
//! - [`metrics_handler`]: exposition text for the metrics route
//! - business metric helpers for route and geocode requests
//!
//! ```no_run
//! use elena_service_shared::metrics::{init_metrics, metrics_handler, MetricsConfig};
//! use axum::{routing::get, Router};
//!
//! let config = MetricsConfig::from_env();
//! init_metrics(&config).expect("failed to initialize metrics");
//! let app: Router = Router::new().route(&config.path, get(metrics_handler));
//! ```

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use elena_lib::Error as LibError;

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Route serving the exposition text.
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl MetricsConfig {
    /// - `METRICS_ENABLED`: anything but "false" enables (default: true)
    /// - `METRICS_PATH`: default "/metrics"
    pub fn from_env() -> Self {
        let enabled = std::env::var("METRICS_ENABLED")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);

        let path = std::env::var("METRICS_PATH")
            .ok()
            .filter(|p| p.starts_with('/'))
            .unwrap_or_else(|| "/metrics".to_string());

        Self { enabled, path }
    }
}

/// Install the Prometheus recorder.
///
/// # Errors
///
/// Fails when metrics are disabled, when a recorder is already installed, or
/// when the exporter cannot be built.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;

    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)?;

    Ok(())
}

/// Prometheus exposition text, or a comment line before [`init_metrics`].
pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_else(|| "# Metrics not initialized\n".to_string())
}

#[derive(Debug, Clone)]
pub enum MetricsError {
    Disabled,
    AlreadyInitialized,
    InstallFailed(String),
}

impl std::fmt::Display for MetricsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsError::Disabled => write!(f, "metrics are disabled"),
            MetricsError::AlreadyInitialized => write!(f, "metrics recorder already initialized"),
            MetricsError::InstallFailed(e) => {
                write!(f, "failed to install metrics recorder: {}", e)
            }
        }
    }
}

impl std::error::Error for MetricsError {}

// =============================================================================
// Business Metrics Helpers
// =============================================================================

/// Increment `elena_routes_calculated_total`.
pub fn record_route_calculated(elevation: &str, graph: &str) {
    metrics::counter!(
        "elena_routes_calculated_total",
        "elevation" => elevation.to_string(),
        "graph" => graph.to_string()
    )
    .increment(1);
}

/// Increment `elena_routes_failed_total`; see [`failure_reason`] for labels.
pub fn record_route_failed(reason: &'static str) {
    metrics::counter!("elena_routes_failed_total", "reason" => reason).increment(1);
}

/// Record the chosen route's length and climb, in meters.
pub fn record_route_shape(length_m: i64, elevation_gain_m: i64, elevation: &str) {
    metrics::histogram!(
        "elena_route_length_meters",
        "elevation" => elevation.to_string()
    )
    .record(length_m as f64);
    metrics::histogram!(
        "elena_route_elevation_gain_meters",
        "elevation" => elevation.to_string()
    )
    .record(elevation_gain_m as f64);
}

/// Increment `elena_geocode_total` with `outcome` "found", "not_found" or "invalid".
pub fn record_geocode(outcome: &'static str) {
    metrics::counter!("elena_geocode_total", "outcome" => outcome).increment(1);
}

/// Low-cardinality label for a failed route.
pub fn failure_reason(error: &LibError) -> &'static str {
    match error {
        LibError::Validation(_) => "validation_error",
        LibError::NoNodesNearby { .. } => "no_nodes_nearby",
        LibError::RouteNotFound { .. } => "no_path",
        LibError::Timeout { .. } => "timeout",
        LibError::DatasetNotFound { .. } | LibError::UnsupportedSchema => "dataset_unavailable",
        _ => "internal_error",
    }
}
