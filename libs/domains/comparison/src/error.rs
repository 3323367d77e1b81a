use std::collections::HashMap;

use domain_costs::CloudProvider;
use thiserror::Error;

/// Result type for comparison operations
pub type ComparisonEngineResult<T> = Result<T, ComparisonError>;

/// Errors that can occur in the comparison engines
#[derive(Debug, Error)]
pub enum ComparisonError {
    /// Requirements violate a structural invariant; never retried
    #[error("Validation failed for '{field}' = {value}: {message}")]
    Validation {
        field: String,
        value: String,
        message: String,
        constraints: HashMap<String, String>,
    },

    /// No adapters were registered for the comparison
    #[error("No provider adapters configured")]
    NoProvidersConfigured,

    /// The fan-out missed the comparison deadline; partial results are
    /// discarded
    #[error("Comparison timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Every provider dropped out of the candidate set
    #[error("All providers failed during comparison: {}", failure_summary(failures))]
    AllProvidersFailed {
        failures: HashMap<CloudProvider, String>,
    },

    /// Filtering left no cost estimates
    #[error("No options match the requirements (providers: {providers:?}, regions: {regions:?})")]
    NoMatchingOptions {
        requirements: String,
        providers: Vec<CloudProvider>,
        regions: Vec<String>,
    },

    /// Cost composition failed for an option that passed the filters
    #[error("Pricing failed for {provider} option '{option}': {message}")]
    Pricing {
        provider: CloudProvider,
        option: String,
        message: String,
    },
}

fn failure_summary(failures: &HashMap<CloudProvider, String>) -> String {
    let mut parts: Vec<String> = failures
        .iter()
        .map(|(provider, message)| format!("{provider}: {message}"))
        .collect();
    parts.sort();
    parts.join("; ")
}

impl ComparisonError {
    pub fn validation(
        field: impl Into<String>,
        value: impl ToString,
        message: impl Into<String>,
        constraints: &[(&str, &str)],
    ) -> Self {
        Self::Validation {
            field: field.into(),
            value: value.to_string(),
            message: message.into(),
            constraints: constraints
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}
