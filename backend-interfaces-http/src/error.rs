use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use backend_application::AppError;

#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    NotImplemented(String),
    Timeout(String),
    Internal(String),
}

impl From<AppError> for HttpError {
    fn from(value: AppError) -> Self {
        match value {
            AppError::BadRequest(msg) => HttpError::BadRequest(msg),
            AppError::NotFound(msg) => HttpError::NotFound(msg),
            AppError::Conflict(msg) => HttpError::Conflict(msg),
            AppError::NotImplemented(msg) => HttpError::NotImplemented(msg),
            AppError::Internal(err) => HttpError::Internal(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            HttpError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            HttpError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            HttpError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            HttpError::NotImplemented(msg) => (StatusCode::NOT_IMPLEMENTED, msg),
            HttpError::Timeout(msg) => (StatusCode::REQUEST_TIMEOUT, msg),
            HttpError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
