use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type for normalization operations
pub type NormalizationResult<T> = Result<T, NormalizationError>;

/// Errors that can occur while normalizing or aggregating cost data
#[derive(Debug, Error)]
pub enum NormalizationError {
    /// No mapping exists for a provider-specific resource type
    #[error(
        "No mapping found for {provider} resource type '{provider_type}' (available: {})",
        available_mappings.join(", ")
    )]
    ResourceMapping {
        provider: String,
        provider_type: String,
        available_mappings: Vec<String>,
    },

    /// Raw payload could not be normalized; preserves the original message
    #[error("Failed to normalize {provider} cost data: {message}")]
    DataNormalization {
        provider: String,
        message: String,
        details: HashMap<String, String>,
    },

    /// Currency conversion failed mid-entry; the entry is not emitted
    #[error("Currency conversion failed: {0}")]
    CurrencyConversion(#[from] domain_costs::CostError),

    /// Window bounds violate `end_time > start_time`
    #[error("Invalid time window: end {end_time} must be after start {start_time}")]
    InvalidWindow {
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    },

    /// Aggregation over an empty entry set has no defined window
    #[error("Cannot aggregate an empty entry set")]
    EmptyAggregation,
}
