use thiserror::Error;

/// Result type for inventory operations
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Errors that can occur in the resource inventory
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    #[error("Resource group not found: {0}")]
    GroupNotFound(String),

    #[error("Invalid tag '{key}': {message}")]
    InvalidTag { key: String, message: String },

    #[error("Invalid resource '{field}': {message}")]
    Validation { field: String, message: String },
}
