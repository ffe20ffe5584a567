// ==========================================
// Plantation Tariff Core - API Error Types
// ==========================================
// Responsibility: translate repository errors into errors a caller
// can act on. Every message carries an explicit reason.
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API layer error type
#[derive(Error, Debug)]
pub enum ApiError {
    // ===== business rule errors =====
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed: {0}")]
    ValidationError(String),

    /// Deactivation/deletion blocked by live references
    #[error("still referenced: {entity} {id} is in use by {referenced_by}")]
    StillReferenced {
        entity: String,
        id: String,
        referenced_by: String,
    },

    /// Cross-company access attempt
    #[error("company scope violation: {0}")]
    CompanyScopeViolation(String),

    // ===== data access errors =====
    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("database connection failed: {0}")]
    DatabaseConnectionError(String),

    #[error("database transaction failed: {0}")]
    DatabaseTransactionError(String),

    // ===== generic =====
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// RepositoryError conversion
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={}) does not exist", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("lock acquisition failed: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::ValidationError(format!("duplicate value: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::ValidationError(format!("referenced record missing or in use: {}", msg))
            }
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("field {}: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result type alias
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_conversion() {
        let repo_err = RepositoryError::NotFound {
            entity: "TariffRule".to_string(),
            id: "r-001".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("TariffRule"));
                assert!(msg.contains("r-001"));
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_unique_violation_becomes_validation_error() {
        let repo_err =
            RepositoryError::UniqueConstraintViolation("UNIQUE constraint failed".to_string());
        let api_err: ApiError = repo_err.into();
        assert!(matches!(api_err, ApiError::ValidationError(_)));
    }

    #[test]
    fn test_still_referenced_message() {
        let err = ApiError::StillReferenced {
            entity: "TariffRule".to_string(),
            id: "r-001".to_string(),
            referenced_by: "2 block(s)".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("r-001"));
        assert!(msg.contains("block"));
    }
}
