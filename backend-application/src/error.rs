use backend_domain::RepositoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not implemented: {0}")]
    NotImplemented(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound(msg) => AppError::NotFound(msg),
            RepositoryError::Integrity(msg) => AppError::Conflict(msg),
            RepositoryError::Database(msg) => {
                AppError::Internal(anyhow::anyhow!("storage failure: {}", msg))
            }
        }
    }
}
