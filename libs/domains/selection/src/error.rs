use domain_costs::CloudProvider;
use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for selection operations
pub type SelectionResult<T> = Result<T, SelectionError>;

/// Errors that can occur in the selection engine
#[derive(Debug, Error)]
pub enum SelectionError {
    /// Requirements violate a structural invariant
    #[error("Validation failed for '{field}': {message}")]
    Validation { field: String, message: String },

    /// Policy weights or rules are malformed
    #[error("Invalid selection policy: {message}")]
    PolicyValidation { message: String },

    /// The active-evaluation cap was reached before starting new work
    #[error("Maximum concurrent evaluations ({limit}) reached; rejected '{resource_name}'")]
    Concurrency { resource_name: String, limit: usize },

    /// The evaluation missed the selection deadline
    #[error("Provider selection timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Every candidate exceeded the monthly budget
    #[error("No providers meet the budget: cheapest option costs {min_observed}, budget is {budget}")]
    Budget {
        min_observed: Decimal,
        budget: Decimal,
    },

    /// Capability filtering left no providers
    #[error("No providers match the requirements (checked: {checked:?})")]
    NoMatchingProviders { checked: Vec<CloudProvider> },

    /// The underlying comparison failed
    #[error(transparent)]
    Comparison(#[from] domain_comparison::ComparisonError),
}
