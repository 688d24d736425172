use tracing::{error, info};

use crate::AppError;
use crate::AppState;
use backend_domain::{parse_date, AlmanaxUpdate, AlmanaxUpdatePayload, Language, RepositoryError};

pub async fn update_almanax(
    state: &AppState,
    lang: Language,
    payload: AlmanaxUpdatePayload,
) -> Result<(), AppError> {
    let date = parse_date(&payload.date)
        .map_err(|err| AppError::BadRequest(format!("invalid date: {}", err)))?;
    if payload.reward_kamas < 0 {
        return Err(AppError::BadRequest(
            "reward_kamas must not be negative".to_string(),
        ));
    }

    let update = AlmanaxUpdate {
        id: payload.id,
        bonus_id: payload.bonus_id,
        tribute_id: payload.tribute_id,
        date: date.format("%Y-%m-%d").to_string(),
        reward_kamas: payload.reward_kamas,
    };
    state.metrics.record_request();
    state.almanax_repo.update(&update).await.map_err(|err| {
        if let RepositoryError::Database(msg) = &err {
            error!("failed to update almanax {}: {}", update.id, msg);
        }
        AppError::from(err)
    })?;
    info!(id = update.id, date = %update.date, lang = %lang, "almanax updated");
    Ok(())
}
