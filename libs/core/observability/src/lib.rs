//! Observability utilities for the cost intelligence platform.
//!
//! This crate provides:
//! - Prometheus metrics recording and export
//! - Custom metrics for comparison, selection, and normalization operations
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{init_metrics, ComparisonMetrics};
//!
//! // Initialize metrics recorder
//! init_metrics();
//!
//! // Record comparison operations
//! ComparisonMetrics::record_comparison("vm", "aws", 12);
//! ```

pub mod engines;

pub use engines::{CacheMetrics, ComparisonMetrics, NormalizationMetrics, SelectionMetrics};

// Re-export metrics macros for convenience
pub use metrics::{counter, gauge, histogram};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Initialize the Prometheus metrics recorder.
///
/// This should be called once at application startup.
/// Returns the PrometheusHandle for rendering metrics.
pub fn init_metrics() -> &'static PrometheusHandle {
    METRICS_HANDLE.get_or_init(|| {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .expect("Failed to install Prometheus recorder");

        info!("Prometheus metrics recorder initialized");

        // Register metric descriptions
        register_metric_descriptions();

        handle
    })
}

/// Get the metrics handle (must call init_metrics first)
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Render current metrics in the Prometheus exposition format
pub fn render_metrics() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

/// Register metric descriptions for documentation
fn register_metric_descriptions() {
    use metrics::describe_counter;
    use metrics::describe_gauge;
    use metrics::describe_histogram;

    // Comparison metrics
    describe_counter!(
        "cost_comparisons_total",
        "Total cost comparison requests by resource class and outcome"
    );
    describe_histogram!(
        "cost_comparison_duration_seconds",
        "Comparison fan-out duration in seconds"
    );
    describe_counter!(
        "comparison_provider_errors_total",
        "Providers dropped from comparisons due to adapter errors"
    );

    // Selection metrics
    describe_counter!(
        "provider_selections_total",
        "Total provider selection evaluations by outcome"
    );
    describe_histogram!(
        "provider_selection_duration_seconds",
        "Selection evaluation duration in seconds"
    );
    describe_gauge!(
        "selection_active_evaluations",
        "Selection evaluations currently in flight"
    );

    // Normalization metrics
    describe_counter!(
        "cost_entries_normalized_total",
        "Normalized cost entries produced by provider"
    );
    describe_counter!(
        "normalization_errors_total",
        "Normalization failures by provider and kind"
    );

    // Cache metrics
    describe_counter!(
        "catalog_cache_hits_total",
        "Catalog cache hits by provider"
    );
    describe_counter!(
        "catalog_cache_misses_total",
        "Catalog cache misses by provider"
    );
    describe_counter!(
        "catalog_cache_stale_served_total",
        "Stale catalog entries served after refresh failure"
    );
}
