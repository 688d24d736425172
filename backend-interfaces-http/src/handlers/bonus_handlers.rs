use axum::extract::{Query, State};
use axum::Json;

use backend_application::queries::bonus_queries;
use backend_application::AppState;
use backend_domain::{AlmanaxBonusListing, BonusSearchQuery};

use crate::error::HttpError;
use crate::middleware::LangPath;

pub async fn search_bonuses(
    State(state): State<AppState>,
    LangPath(lang): LangPath,
    Query(query): Query<BonusSearchQuery>,
) -> Result<Json<Vec<AlmanaxBonusListing>>, HttpError> {
    let results = bonus_queries::search_bonuses(&state, lang, query).await?;
    Ok(Json(results))
}

pub async fn list_bonuses(
    State(state): State<AppState>,
    LangPath(lang): LangPath,
) -> Result<Json<Vec<AlmanaxBonusListing>>, HttpError> {
    let results = bonus_queries::list_bonuses(&state, lang).await?;
    Ok(Json(results))
}
