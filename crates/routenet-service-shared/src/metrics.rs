//! Prometheus metrics for the route network services.
//!
//! This module provides:
//! - [`MetricsConfig`]: configuration for the metrics system
//! - [`init_metrics`]: install the Prometheus recorder
//! - [`metrics_handler`]: axum handler for the `/metrics` endpoint
//! - business metric helpers for plans and graph updates
//!
//! # Example
//!
//! ```no_run
//! use routenet_service_shared::metrics::{MetricsConfig, init_metrics, metrics_handler};
//! use axum::{Router, routing::get};
//!
//! let config = MetricsConfig::default();
//! init_metrics(&config).expect("failed to initialize metrics");
//!
//! let app: Router = Router::new().route(&config.path, get(metrics_handler));
//! ```

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

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
    /// - `METRICS_ENABLED`: anything but "false" enables metrics (default: true)
    /// - `METRICS_PATH`: endpoint path (default: "/metrics")
    pub fn from_env() -> Self {
        let enabled = std::env::var("METRICS_ENABLED")
            .map(|v| !v.trim().eq_ignore_ascii_case("false"))
            .unwrap_or(true);
        let path = std::env::var("METRICS_PATH")
            .ok()
            .filter(|p| p.starts_with('/'))
            .unwrap_or_else(|| "/metrics".to_string());

        Self { enabled, path }
    }
}

/// Install the Prometheus recorder. Must run before any metric is recorded
/// for the values to be exported; a second call fails.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }
    if PROMETHEUS_HANDLE.get().is_some() {
        return Err(MetricsError::AlreadyInitialized);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;

    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)
}

/// `None` until [`init_metrics`] succeeds.
pub fn prometheus_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

/// Axum handler returning Prometheus exposition text.
pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_else(|| "# Metrics not initialized\n".to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
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

/// Increment `routenet_plans_computed_total` for a successful plan.
pub fn record_plan_computed(algorithm: &str) {
    metrics::counter!(
        "routenet_plans_computed_total",
        "algorithm" => algorithm.to_string()
    )
    .increment(1);
}

/// Increment `routenet_plans_failed_total`, labelled by failure kind
/// (`graph_unavailable`, `invalid_request`, `no_path_to_goal`, `timeout`,
/// `internal`).
pub fn record_plan_failed(kind: &str) {
    metrics::counter!(
        "routenet_plans_failed_total",
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// Record the segment count of a successful plan in `routenet_plan_segments`.
pub fn record_plan_segments(segments: usize, algorithm: &str) {
    metrics::histogram!(
        "routenet_plan_segments",
        "algorithm" => algorithm.to_string()
    )
    .record(segments as f64);
}

/// Increment `routenet_network_updates_total` with `outcome` "applied" or
/// "rejected".
pub fn record_network_update(outcome: &str) {
    metrics::counter!(
        "routenet_network_updates_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Set the size gauges of the currently published network.
pub fn record_network_size(nodes: usize, segments: usize) {
    metrics::gauge!("routenet_network_nodes").set(nodes as f64);
    metrics::gauge!("routenet_network_segments").set(segments as f64);
}
