use chrono::Utc;
use chrono_tz::Tz;
use tracing::{debug, error};

use crate::AppError;
use crate::AppState;
use backend_domain::{parse_date, AlmanaxRangeQuery, DateRange, Language, MappedAlmanax};

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolves the requested range; missing bounds default to today in the
/// requested timezone, a missing end to the start.
pub fn resolve_range(query: &AlmanaxRangeQuery, server_tz: &str) -> Result<DateRange, AppError> {
    let tz_name = non_empty(query.timezone.clone()).unwrap_or_else(|| server_tz.to_string());
    let tz: Tz = tz_name
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid timezone: {}", tz_name)))?;
    let today = Utc::now().with_timezone(&tz).date_naive();

    let start = match non_empty(query.start_date.clone()) {
        Some(value) => parse_date(&value)
            .map_err(|err| AppError::BadRequest(format!("invalid start date: {}", err)))?,
        None => today,
    };
    let end = match non_empty(query.end_date.clone()) {
        Some(value) => parse_date(&value)
            .map_err(|err| AppError::BadRequest(format!("invalid end date: {}", err)))?,
        None => start,
    };
    Ok(DateRange::from_dates(start, end))
}

pub async fn retrieve_almanax(
    state: &AppState,
    lang: Language,
    query: AlmanaxRangeQuery,
) -> Result<Vec<MappedAlmanax>, AppError> {
    if non_empty(query.bonus_name.clone()).is_some() {
        return Err(AppError::NotImplemented(
            "searching almanax days by bonus name is not available yet".to_string(),
        ));
    }
    let range = resolve_range(&query, &state.config.server_tz)?;
    debug!(lang = %lang, from = %range.from, to = %range.to, "retrieving almanax");

    state.metrics.record_request();
    let rows = match non_empty(query.bonus_type.clone()) {
        Some(slug) => {
            state
                .almanax_repo
                .get_by_date_range_and_bonus_slug(&range.from, &range.to, &slug)
                .await
        }
        None => state.almanax_repo.get_by_date_range(&range.from, &range.to).await,
    }
    .map_err(|err| {
        error!("failed to fetch almanax range: {}", err);
        AppError::from(err)
    })?;

    if rows.is_empty() {
        return Err(AppError::NotFound(format!(
            "No almanax found between {} and {}.",
            range.from, range.to
        )));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{test_state, InMemoryAlmanaxRepository, InMemorySearchIndex, StaticBonusSource};
    use backend_domain::{AlmanaxRepository, NewAlmanax};

    fn range_query(start: Option<&str>, end: Option<&str>) -> AlmanaxRangeQuery {
        AlmanaxRangeQuery {
            start_date: start.map(str::to_string),
            end_date: end.map(str::to_string),
            ..Default::default()
        }
    }

    async fn seeded_state() -> (AppState, Arc<InMemoryAlmanaxRepository>) {
        let repo = Arc::new(InMemoryAlmanaxRepository::new());
        let (xp_bonus, xp_tribute) = repo.seed_bonus("experience", "Experience");
        let (loot_bonus, loot_tribute) = repo.seed_bonus("loot", "Loot");
        for (date, bonus_id, tribute_id) in [
            ("2024-05-03", xp_bonus, xp_tribute),
            ("2024-05-01", loot_bonus, loot_tribute),
            ("2024-05-02", xp_bonus, xp_tribute),
        ] {
            repo.create(&NewAlmanax {
                bonus_id,
                tribute_id,
                date: date.to_string(),
                reward_kamas: 10,
            })
            .await
            .expect("create");
        }
        let state = test_state(
            repo.clone(),
            Arc::new(InMemorySearchIndex::new()),
            Arc::new(StaticBonusSource::new()),
        );
        (state, repo)
    }

    #[test]
    fn missing_end_defaults_to_start() {
        let range = resolve_range(&range_query(Some("2024-05-01"), None), "Europe/Berlin")
            .expect("range");
        assert_eq!(range.from, "2024-05-01");
        assert_eq!(range.to, "2024-05-01");
    }

    #[test]
    fn rejects_bad_timezone_and_dates() {
        let mut query = range_query(None, None);
        query.timezone = Some("Mars/Olympus".to_string());
        assert!(matches!(
            resolve_range(&query, "Europe/Berlin"),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            resolve_range(&range_query(Some("01-05-2024"), None), "Europe/Berlin"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn retrieves_sorted_range_and_filters_by_slug() {
        let (state, _) = seeded_state().await;
        let rows = retrieve_almanax(&state, Language::En, range_query(Some("2024-05-01"), Some("2024-05-03")))
            .await
            .expect("rows");
        let dates = rows.iter().map(|r| r.almanax.date.as_str()).collect::<Vec<_>>();
        assert_eq!(dates, vec!["2024-05-01", "2024-05-02", "2024-05-03"]);

        let mut query = range_query(Some("2024-05-01"), Some("2024-05-03"));
        query.bonus_type = Some("experience".to_string());
        let rows = retrieve_almanax(&state, Language::En, query).await.expect("rows");
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.bonus_type.name_id == "experience"));
    }

    #[tokio::test]
    async fn reversed_or_deleted_range_is_not_found() {
        let (state, repo) = seeded_state().await;
        let err = retrieve_almanax(&state, Language::En, range_query(Some("2024-05-03"), Some("2024-05-01")))
            .await
            .expect_err("reversed");
        assert!(matches!(err, AppError::NotFound(_)));

        repo.soft_delete(2);
        let err = retrieve_almanax(&state, Language::En, range_query(Some("2024-05-01"), None))
            .await
            .expect_err("deleted");
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn bonus_name_search_is_not_implemented() {
        let (state, _) = seeded_state().await;
        let mut query = range_query(None, None);
        query.bonus_name = Some("Experience".to_string());
        let err = retrieve_almanax(&state, Language::En, query)
            .await
            .expect_err("not implemented");
        assert!(matches!(err, AppError::NotImplemented(_)));
    }
}
