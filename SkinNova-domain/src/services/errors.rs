use thiserror::Error;
use tracing::error;

use skin_nova_data::repository::RepositoryError;

use crate::auth::token::SecurityError;
use crate::mail::MailError;

/// Errors returned by the domain services
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input rejected by a business rule
    #[error("{0}")]
    Validation(String),

    /// Missing or bad credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Operation clashes with the current state
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    /// Outgoing email could not be delivered
    #[error("Mail error: {0}")]
    Mail(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ServiceError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ServiceError::Conflict(message.into())
    }
}

/// Convert a repository failure into the matching service error
pub fn map_repo_error(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::NotFound(msg) => ServiceError::NotFound(msg),
        RepositoryError::Conflict(msg) => ServiceError::Conflict(msg),
        other => {
            error!("Repository failure: {}", other);
            ServiceError::Repository(other.to_string())
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        map_repo_error(err)
    }
}

impl From<SecurityError> for ServiceError {
    fn from(err: SecurityError) -> Self {
        match err {
            SecurityError::Configuration(msg) | SecurityError::Hashing(msg) => ServiceError::Internal(msg),
            other => ServiceError::Unauthorized(other.to_string()),
        }
    }
}

impl From<MailError> for ServiceError {
    fn from(err: MailError) -> Self {
        ServiceError::Mail(err.to_string())
    }
}

/// Result alias used across the services
pub type ServiceResult<T> = Result<T, ServiceError>;
