//! Error types for the Labelforge domain

use thiserror::Error;

/// Result type alias for domain operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Main error type for domain operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A record failed validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// An asset URL could not be mapped to a content identifier
    #[error("Invalid asset URL: {0}")]
    InvalidAssetUrl(String),

    /// A record references another record that is not present
    #[error("Missing reference: {0}")]
    MissingReference(String),

    /// Invalid identifier string
    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::SerializationError(err.to_string())
    }
}

impl From<url::ParseError> for CoreError {
    fn from(err: url::ParseError) -> Self {
        CoreError::InvalidAssetUrl(err.to_string())
    }
}
