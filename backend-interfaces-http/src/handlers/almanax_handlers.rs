use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use backend_application::commands::almanax_commands;
use backend_application::queries::almanax_queries;
use backend_application::AppState;
use backend_domain::{AlmanaxRangeQuery, AlmanaxUpdatePayload, MappedAlmanax};

use crate::error::HttpError;
use crate::middleware::{parse_lang, LangPath};

pub async fn retrieve_almanax(
    State(state): State<AppState>,
    LangPath(lang): LangPath,
    Query(query): Query<AlmanaxRangeQuery>,
) -> Result<Json<Vec<MappedAlmanax>>, HttpError> {
    let results = almanax_queries::retrieve_almanax(&state, lang, query).await?;
    Ok(Json(results))
}

pub async fn update_almanax(
    State(state): State<AppState>,
    LangPath(lang): LangPath,
    Path(params): Path<HashMap<String, String>>,
    payload: Result<Json<AlmanaxUpdatePayload>, JsonRejection>,
) -> Result<StatusCode, HttpError> {
    if let Some(target) = params.get("target_lang") {
        parse_lang(target)?;
    }
    let Json(payload) = payload.map_err(|err| HttpError::BadRequest(err.body_text()))?;
    almanax_commands::update_almanax(&state, lang, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}
