//! Schema error types

use thiserror::Error;

/// Schema and attribute-bundle errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Required attribute not set: {0}")]
    MissingRequired(String),

    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("Attribute {attribute} has wrong type: expected {expected}")]
    TypeMismatch { attribute: String, expected: String },

    #[error("Attribute {0} is computed and cannot be configured")]
    ComputedInput(String),

    #[error("Invalid value for {attribute}: {message}")]
    InvalidValue { attribute: String, message: String },

    #[error("Malformed persisted state at key {key}: {message}")]
    MalformedState { key: String, message: String },
}

pub type Result<T> = std::result::Result<T, SchemaError>;
