// Typed failures surfaced by the storage and search ports

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("not found: {0}")]
    NotFound(String),
    /// Foreign key, unique or check constraint violation.
    #[error("integrity violation: {0}")]
    Integrity(String),
    #[error("database error: {0}")]
    Database(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Reason code reported by the search service for a failed call or task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchErrorCode {
    IndexNotFound,
    IndexAlreadyExists,
    Other(String),
}

impl SearchErrorCode {
    pub fn from_code(code: &str) -> Self {
        match code {
            "index_not_found" => SearchErrorCode::IndexNotFound,
            "index_already_exists" => SearchErrorCode::IndexAlreadyExists,
            other => SearchErrorCode::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SearchErrorCode::IndexNotFound => "index_not_found",
            SearchErrorCode::IndexAlreadyExists => "index_already_exists",
            SearchErrorCode::Other(code) => code,
        }
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search api error ({}): {message}", code.as_str())]
    Api {
        code: SearchErrorCode,
        message: String,
    },
    #[error("task {task_uid} failed ({}): {message}", code.as_str())]
    TaskFailed {
        task_uid: u64,
        code: SearchErrorCode,
        message: String,
    },
    #[error("task {task_uid} not finished after {waited:?}")]
    TaskTimeout { task_uid: u64, waited: Duration },
    #[error("search transport error: {0}")]
    Transport(String),
    #[error("search response decode error: {0}")]
    Decode(String),
}

impl SearchError {
    pub fn code(&self) -> Option<&SearchErrorCode> {
        match self {
            SearchError::Api { code, .. } | SearchError::TaskFailed { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self.code(), Some(SearchErrorCode::IndexAlreadyExists))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.code(), Some(SearchErrorCode::IndexNotFound))
    }
}
