use axum::routing::get;
use axum::Router;

use backend_application::AppState;

use crate::handlers::{almanax_handlers, bonus_handlers, ops_handlers};

/// Public API mounted under the configured version prefix.
pub fn build_router(state: AppState) -> Router {
    let prefix = state.config.api_prefix.clone();
    let api = Router::new()
        .route(
            "/meta/:lang/almanax/bonuses",
            get(bonus_handlers::list_bonuses),
        )
        .route(
            "/meta/:lang/almanax/bonuses/search",
            get(bonus_handlers::search_bonuses),
        )
        .route("/:lang/almanax", get(almanax_handlers::retrieve_almanax))
        .route(
            "/:lang/almanax/:target_lang",
            axum::routing::put(almanax_handlers::update_almanax),
        );

    let router = Router::new()
        .route("/health/live", get(ops_handlers::health_live))
        .route("/health/ready", get(ops_handlers::health_ready));
    let router = if prefix.trim_matches('/').is_empty() {
        router.merge(api)
    } else {
        router.nest(&prefix, api)
    };
    router.with_state(state)
}

pub fn build_metrics_router(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(ops_handlers::metrics_prometheus))
        .with_state(state)
}
