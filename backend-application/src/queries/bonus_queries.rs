use anyhow::anyhow;
use tracing::error;

use crate::AppError;
use crate::AppState;
use backend_domain::{parse_search_limit, AlmanaxBonusListing, BonusSearchQuery, Language};

fn ensure_translated(lang: Language) -> Result<(), AppError> {
    if lang.has_bonus_translations() {
        return Ok(());
    }
    Err(AppError::BadRequest(format!(
        "{}: language not translated for almanax bonuses",
        lang
    )))
}

pub async fn search_bonuses(
    state: &AppState,
    lang: Language,
    query: BonusSearchQuery,
) -> Result<Vec<AlmanaxBonusListing>, AppError> {
    ensure_translated(lang)?;
    let text = query.query.unwrap_or_default();
    if text.trim().is_empty() {
        return Err(AppError::BadRequest("query parameter is required".to_string()));
    }
    let limit = parse_search_limit(query.limit.as_deref())
        .map_err(|err| AppError::BadRequest(format!("invalid limit value: {}", err)))?;

    state.metrics.record_search();
    let result = state
        .search_index
        .search(&lang.bonus_index_uid(), &text, limit)
        .await
        .map_err(|err| {
            error!("bonus search failed: {}", err);
            AppError::Internal(anyhow!("could not search: {}", err))
        })?;
    if result.hits.is_empty() {
        return Err(AppError::NotFound("No results found.".to_string()));
    }
    Ok(result.hits.into_iter().map(Into::into).collect())
}

pub async fn list_bonuses(
    state: &AppState,
    lang: Language,
) -> Result<Vec<AlmanaxBonusListing>, AppError> {
    ensure_translated(lang)?;
    state.metrics.record_request();
    let bonus_types = state.almanax_repo.list_bonus_types().await.map_err(|err| {
        error!("failed to list bonus types: {}", err);
        AppError::from(err)
    })?;
    Ok(bonus_types
        .iter()
        .map(|bonus_type| AlmanaxBonusListing {
            id: bonus_type.name_id.clone(),
            name: bonus_type.name(lang).to_string(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{test_state, InMemoryAlmanaxRepository, InMemorySearchIndex, StaticBonusSource};
    use backend_domain::AlmanaxBonusListingMeili;

    fn state() -> (AppState, Arc<InMemorySearchIndex>, Arc<InMemoryAlmanaxRepository>) {
        let index = Arc::new(InMemorySearchIndex::new());
        index.insert_documents(
            &Language::En.bonus_index_uid(),
            vec![
                AlmanaxBonusListingMeili {
                    id: "0".to_string(),
                    slug: "experience".to_string(),
                    name: "Experience".to_string(),
                },
                AlmanaxBonusListingMeili {
                    id: "1".to_string(),
                    slug: "experience-pet".to_string(),
                    name: "Pet Experience".to_string(),
                },
            ],
        );
        let repo = Arc::new(InMemoryAlmanaxRepository::new());
        let state = test_state(repo.clone(), index.clone(), Arc::new(StaticBonusSource::new()));
        (state, index, repo)
    }

    fn query(text: &str, limit: Option<&str>) -> BonusSearchQuery {
        BonusSearchQuery {
            query: Some(text.to_string()),
            limit: limit.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn search_returns_slug_and_name() {
        let (state, _, _) = state();
        let hits = search_bonuses(&state, Language::En, query("experience", Some("")))
            .await
            .expect("hits");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "experience");

        let hits = search_bonuses(&state, Language::En, query("experience", Some("1")))
            .await
            .expect("hits");
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn search_validates_parameters() {
        let (state, _, _) = state();
        match search_bonuses(&state, Language::En, query("xp", Some("150"))).await {
            Err(AppError::BadRequest(msg)) => assert!(msg.contains("limit value is too high")),
            other => panic!("unexpected result: {:?}", other),
        }
        match search_bonuses(&state, Language::En, query("", None)).await {
            Err(AppError::BadRequest(msg)) => assert!(msg.contains("required")),
            other => panic!("unexpected result: {:?}", other),
        }
        match search_bonuses(&state, Language::Pt, query("xp", Some("500"))).await {
            Err(AppError::BadRequest(msg)) => assert!(msg.contains("language not translated")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn search_without_hits_is_not_found() {
        let (state, _, _) = state();
        match search_bonuses(&state, Language::En, query("kamas", None)).await {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "No results found."),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn search_transport_failure_is_internal() {
        let (state, index, _) = state();
        index.set_unreachable();
        match search_bonuses(&state, Language::En, query("xp", None)).await {
            Err(AppError::Internal(err)) => assert!(err.to_string().starts_with("could not search")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn list_uses_localized_names() {
        let (state, _, repo) = state();
        repo.seed_bonus("loot", "Loot");
        repo.seed_bonus("experience", "Experience");
        let listing = list_bonuses(&state, Language::Fr).await.expect("listing");
        assert_eq!(listing[0].id, "experience");
        assert_eq!(listing[0].name, "Experience (fr)");
        assert_eq!(listing[1].id, "loot");
        assert!(list_bonuses(&state, Language::Pt).await.is_err());
    }
}
