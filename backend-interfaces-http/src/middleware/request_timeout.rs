// Request deadline with a JSON error body

use std::time::Duration;

use axum::http::{header, StatusCode};
use axum::middleware::map_response;
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tracing::warn;

use crate::error::HttpError;

/// Cuts requests off after `timeout`. The bare 408 from the timeout layer is
/// replaced by the usual `{"error": ..}` body.
pub fn with_request_timeout(router: Router, timeout: Duration) -> Router {
    router
        .layer(TimeoutLayer::new(timeout))
        .layer(map_response(move |response: Response| async move {
            timeout_as_json(response, timeout)
        }))
}

fn timeout_as_json(response: Response, timeout: Duration) -> Response {
    if response.status() != StatusCode::REQUEST_TIMEOUT
        || response.headers().contains_key(header::CONTENT_TYPE)
    {
        return response;
    }
    warn!(timeout_ms = timeout.as_millis() as u64, "request timed out");
    HttpError::Timeout(format!("request timed out after {}s", timeout.as_secs_f64())).into_response()
}
