use thiserror::Error;

/// Result type for budget operations
pub type BudgetResult<T> = Result<T, BudgetError>;

/// Errors that can occur in the budget subsystem
#[derive(Debug, Error)]
pub enum BudgetError {
    #[error("Budget not found: {0}")]
    NotFound(String),

    #[error("Budget already exists: {0}")]
    AlreadyExists(String),

    #[error("Alert not found: {0}")]
    AlertNotFound(uuid::Uuid),

    #[error("Invalid budget '{field}': {message}")]
    Validation { field: String, message: String },

    /// Too few historical samples to forecast from
    #[error("Insufficient data for forecasting: need {required} samples, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Forecast generation failed: {message}")]
    Forecast { message: String },
}
