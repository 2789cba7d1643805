use thiserror::Error;

/// Failures of a backend API call.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found")]
    NotFound,

    /// The request never completed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("Backend returned {code}: {message}")]
    Status { code: u16, message: String },

    /// The backend answered but the body could not be read.
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl RepositoryError {
    /// Status answers the signed-in user can do nothing about.
    pub fn is_authorization(&self) -> bool {
        matches!(self, RepositoryError::Status { code: 401 | 403, .. })
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
