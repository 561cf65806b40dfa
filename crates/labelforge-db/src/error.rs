//! Storage error types
//!
//! This module provides error types for repository operations, including
//! missing records and integrity-constraint violations.

use thiserror::Error;

/// Result type alias for repository operations
pub type DbResult<T> = Result<T, DbError>;

/// Repository errors
#[derive(Debug, Error)]
pub enum DbError {
    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Record already exists (duplicate)
    #[error("Record already exists: {0}")]
    AlreadyExists(String),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidData(String),

    /// Internal storage error
    #[error("Internal storage error: {0}")]
    Internal(String),

    /// Domain error from core crate
    #[error("Domain error: {0}")]
    Domain(#[from] labelforge_core::CoreError),
}

impl DbError {
    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound(_))
    }

    /// Check if this error is a constraint violation
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DbError::ForeignKeyViolation(_) | DbError::UniqueViolation(_)
        )
    }

    /// Check if this is a duplicate/already exists error
    pub fn is_already_exists(&self) -> bool {
        matches!(self, DbError::AlreadyExists(_) | DbError::UniqueViolation(_))
    }
}
