use std::collections::HashMap;

use thiserror::Error;

/// Result type for adapter operations
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Errors surfaced by provider adapters.
///
/// Transient variants are retried by the adapter layer; everything else
/// surfaces immediately and is never retried by higher layers.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Credentials rejected or absent for the provider
    #[error("Authentication failed for {provider}: {message}")]
    Authentication { provider: String, message: String },

    /// Region unknown to or unsupported by the provider
    #[error("Region '{region}' not supported by {provider}")]
    UnsupportedRegion { provider: String, region: String },

    /// Provider throttled the request; retryable
    #[error("Rate limited by {provider}, retry after {retry_after_secs}s")]
    RateLimited {
        provider: String,
        retry_after_secs: u64,
    },

    /// Transient provider-side failure (5xx); retryable
    #[error("Provider {provider} API error: {message}")]
    Api { provider: String, message: String },

    /// Response payload did not match the expected shape
    #[error("Failed to parse {provider} response: {message}")]
    Parse { provider: String, message: String },

    /// Requested catalog entry or resource does not exist
    #[error("Not found in {provider}: {what}")]
    NotFound { provider: String, what: String },

    /// Adapter operation requires configuration that is absent
    #[error("Adapter not configured for {provider}: {message}")]
    NotConfigured { provider: String, message: String },

    /// HTTP transport failure; retryable
    #[error("HTTP request to {provider} failed: {source}")]
    Http {
        provider: String,
        #[source]
        source: reqwest::Error,
    },

    /// Pricing lookup failed for a specific catalog entry
    #[error("Pricing unavailable from {provider} for {what}")]
    PricingUnavailable {
        provider: String,
        what: String,
        details: HashMap<String, String>,
    },
}

impl AdapterError {
    /// Whether the retry policy may re-attempt the operation.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AdapterError::RateLimited { .. } | AdapterError::Api { .. } | AdapterError::Http { .. }
        )
    }
}
