//! Service-layer error types
//!
//! Failures of individual remote calls never reach callers directly; the
//! batch executor collapses them into a single [`ServiceError::AssetStore`]
//! carrying the batch kind and the last underlying cause.

use labelforge_core::CoreError;
use labelforge_db::DbError;
use thiserror::Error;

use crate::executor::BatchKind;

/// Result type alias for service operations
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Service-layer error types
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Malformed input rejected before any network call
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Remote store call failed after exhausting retries
    #[error("{kind} batch failed after {attempts} attempt(s): {message}")]
    AssetStore {
        kind: BatchKind,
        attempts: u32,
        message: String,
    },

    /// Referenced project or image is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Internal service error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Whether this error came from the remote asset store
    pub fn is_asset_store(&self) -> bool {
        matches!(self, ServiceError::AssetStore { .. })
    }
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationError(msg) => ServiceError::Validation(msg),
            CoreError::InvalidAssetUrl(msg) => {
                ServiceError::Validation(format!("Invalid asset URL: {}", msg))
            }
            CoreError::InvalidId(msg) => ServiceError::Validation(msg),
            CoreError::MissingReference(msg) => ServiceError::NotFound(msg),
            CoreError::SerializationError(msg) => ServiceError::Internal(msg),
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(msg) => ServiceError::NotFound(msg),
            DbError::AlreadyExists(msg) => ServiceError::Validation(msg),
            DbError::UniqueViolation(msg) => ServiceError::Validation(msg),
            DbError::ForeignKeyViolation(msg) => ServiceError::Validation(msg),
            DbError::InvalidData(msg) => ServiceError::Validation(msg),
            DbError::Internal(msg) => ServiceError::Database(msg),
            DbError::Domain(err) => ServiceError::from(err),
        }
    }
}

impl From<zip::result::ZipError> for ServiceError {
    fn from(err: zip::result::ZipError) -> Self {
        ServiceError::Internal(format!("Archive error: {}", err))
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::Internal(format!("I/O error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_from_db_error() {
        let db_err = DbError::NotFound("project 01H".to_string());
        let service_err: ServiceError = db_err.into();
        assert!(matches!(service_err, ServiceError::NotFound(_)));

        let db_err = DbError::UniqueViolation("category 'car'".to_string());
        assert!(matches!(ServiceError::from(db_err), ServiceError::Validation(_)));
    }

    #[test]
    fn test_missing_reference_is_not_found() {
        let err: ServiceError = CoreError::MissingReference("image 01H".to_string()).into();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn test_asset_store_display() {
        let err = ServiceError::AssetStore {
            kind: BatchKind::Fetch,
            attempts: 3,
            message: "status 404".to_string(),
        };
        assert!(err.is_asset_store());
        assert_eq!(err.to_string(), "fetch batch failed after 3 attempt(s): status 404");
    }
}
