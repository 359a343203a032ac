//! Error types for schemawise

use thiserror::Error;

/// Core error type for schemawise operations
#[derive(Error, Debug)]
pub enum SchemawiseError {
    #[error("Input not found: {0}")]
    InputNotFound(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Introspection error: {0}")]
    Introspection(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Invalid parameter: {0}")]
    ParameterValidation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for schemawise operations
pub type Result<T> = std::result::Result<T, SchemawiseError>;
