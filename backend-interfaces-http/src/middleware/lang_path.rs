use std::collections::HashMap;

use axum::async_trait;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use backend_domain::Language;

use crate::error::HttpError;

pub fn parse_lang(raw: &str) -> Result<Language, HttpError> {
    raw.parse::<Language>()
        .map_err(|err| HttpError::BadRequest(err.to_string()))
}

/// The `:lang` path segment, validated before the handler runs.
#[derive(Debug, Clone, Copy)]
pub struct LangPath(pub Language);

#[async_trait]
impl<S> FromRequestParts<S> for LangPath
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|err| HttpError::BadRequest(err.body_text()))?;
        let raw = params
            .get("lang")
            .ok_or_else(|| HttpError::BadRequest("missing language".to_string()))?;
        parse_lang(raw).map(LangPath)
    }
}
