//! Engine-specific metric recorders.

use metrics::{counter, gauge, histogram};

/// Metrics for the comparison engines (VM, storage, network).
pub struct ComparisonMetrics;

impl ComparisonMetrics {
    /// Record a completed comparison for a resource class.
    pub fn record_comparison(resource_class: &'static str, outcome: &'static str, duration_secs: f64) {
        counter!(
            "cost_comparisons_total",
            "class" => resource_class,
            "outcome" => outcome
        )
        .increment(1);
        histogram!(
            "cost_comparison_duration_seconds",
            "class" => resource_class
        )
        .record(duration_secs);
    }

    /// Record a provider dropped from a comparison due to an adapter error.
    pub fn record_provider_dropped(resource_class: &'static str, provider: String) {
        counter!(
            "comparison_provider_errors_total",
            "class" => resource_class,
            "provider" => provider
        )
        .increment(1);
    }
}

/// Metrics for the selection engine.
pub struct SelectionMetrics;

impl SelectionMetrics {
    pub fn record_selection(outcome: &'static str, duration_secs: f64) {
        counter!("provider_selections_total", "outcome" => outcome).increment(1);
        histogram!("provider_selection_duration_seconds").record(duration_secs);
    }

    pub fn set_active_evaluations(count: usize) {
        gauge!("selection_active_evaluations").set(count as f64);
    }
}

/// Metrics for the normalization engine.
pub struct NormalizationMetrics;

impl NormalizationMetrics {
    pub fn record_entries(provider: String, count: usize) {
        counter!("cost_entries_normalized_total", "provider" => provider).increment(count as u64);
    }

    pub fn record_error(provider: String, kind: &'static str) {
        counter!(
            "normalization_errors_total",
            "provider" => provider,
            "kind" => kind
        )
        .increment(1);
    }
}

/// Metrics for the catalog cache.
pub struct CacheMetrics;

impl CacheMetrics {
    pub fn record_hit(provider: String) {
        counter!("catalog_cache_hits_total", "provider" => provider).increment(1);
    }

    pub fn record_miss(provider: String) {
        counter!("catalog_cache_misses_total", "provider" => provider).increment(1);
    }

    pub fn record_stale_served(provider: String) {
        counter!("catalog_cache_stale_served_total", "provider" => provider).increment(1);
    }
}
