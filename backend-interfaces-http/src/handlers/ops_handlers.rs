use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use backend_application::AppState;

const ALMANAX_STORE: &str = "almanax-sqlite";

#[derive(Debug, Serialize)]
pub struct Readiness {
    pub status: &'static str,
    pub store: &'static str,
}

impl Readiness {
    fn answer(ready: bool) -> (StatusCode, Json<Self>) {
        if ready {
            (StatusCode::OK, Json(Self { status: "ready", store: ALMANAX_STORE }))
        } else {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Self { status: "unavailable", store: ALMANAX_STORE }),
            )
        }
    }
}

pub async fn health_live() -> StatusCode {
    StatusCode::OK
}

/// Ready once the almanax store answers a ping within the request timeout.
/// The search index is not consulted: search requests report its failures
/// themselves.
pub async fn health_ready(State(state): State<AppState>) -> (StatusCode, Json<Readiness>) {
    let timeout_secs = state.config.request_timeout_seconds.max(1);
    match timeout(Duration::from_secs(timeout_secs), state.almanax_repo.ping()).await {
        Ok(Ok(())) => {
            debug!(store = ALMANAX_STORE, "almanax store ready");
            Readiness::answer(true)
        }
        Ok(Err(err)) => {
            warn!(store = ALMANAX_STORE, "almanax store ping failed: {}", err);
            Readiness::answer(false)
        }
        Err(_) => {
            warn!(store = ALMANAX_STORE, timeout_secs, "almanax store ping timed out");
            Readiness::answer(false)
        }
    }
}

pub async fn metrics_prometheus(State(state): State<AppState>) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    (headers, state.metrics.render_prometheus())
}
