use thiserror::Error;

/// Result type for recommendation operations
pub type RecommendationResult<T> = Result<T, RecommendationError>;

/// Error surfaced by an external port (inventory, optimizer, metrics).
#[derive(Debug, Error)]
#[error("{0}")]
pub struct PortError(pub String);

/// Errors that can occur in the recommendation engine
#[derive(Debug, Error)]
pub enum RecommendationError {
    /// Inventory port failure
    #[error("Inventory unavailable: {0}")]
    Inventory(PortError),

    /// Cost optimizer port failure
    #[error("Cost optimizer unavailable: {0}")]
    Optimizer(PortError),

    /// Metrics port failure
    #[error("Metrics unavailable: {0}")]
    Metrics(PortError),

    /// A resource lacks the fields needed to derive requirements
    #[error("Resource '{id}' cannot seed a migration: {message}")]
    InvalidResource { id: String, message: String },

    /// The underlying selection failed
    #[error(transparent)]
    Selection(#[from] domain_selection::SelectionError),
}
