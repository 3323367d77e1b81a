use thiserror::Error;

/// Result type for requirement parsing
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors that can occur while parsing IaC inputs
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML input: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Input parsed but is not the expected document shape
    #[error("Unexpected document shape: {0}")]
    UnexpectedShape(String),
}
