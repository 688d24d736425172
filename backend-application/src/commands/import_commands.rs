use std::collections::BTreeSet;

use anyhow::anyhow;
use tracing::{info, warn};

use crate::AppError;
use crate::AppState;
use backend_domain::{
    localized, parse_date, ImportSummary, MappedMultilangNpcAlmanax, NewAlmanax, NewBonus,
    NewBonusType, NewTribute,
};

/// Loads the mapped almanax file of release `tag` into the store.
///
/// Days that already have a live row, or that an earlier record of the same
/// release already claimed, are skipped. Rows are written one
/// statement at a time, so a failure part way leaves earlier rows in place.
pub async fn import_release(state: &AppState, tag: &str) -> Result<ImportSummary, AppError> {
    let records = state
        .release_source
        .fetch_mapped_almanax(tag)
        .await
        .map_err(|err| AppError::Internal(anyhow!("could not load release {}: {}", tag, err)))?;
    info!(tag, records = records.len(), "importing almanax release");

    let mut summary = ImportSummary::default();
    let mut claimed = BTreeSet::new();
    for record in &records {
        import_record(state, record, &mut claimed, &mut summary).await?;
    }
    state.metrics.record_imported(summary.created);
    info!(tag, created = summary.created, skipped = summary.skipped, "almanax import finished");
    Ok(summary)
}

async fn import_record(
    state: &AppState,
    record: &MappedMultilangNpcAlmanax,
    claimed: &mut BTreeSet<String>,
    summary: &mut ImportSummary,
) -> Result<(), AppError> {
    let repo = &state.almanax_repo;

    let mut pending_days = Vec::new();
    for day in &record.days {
        let date = match parse_date(day) {
            Ok(date) => date.format("%Y-%m-%d").to_string(),
            Err(err) => {
                warn!(day = %day, "skipping malformed almanax day: {}", err);
                summary.skipped += 1;
                continue;
            }
        };
        if !claimed.insert(date.clone()) {
            warn!(day = %date, "almanax day listed twice in release");
            summary.skipped += 1;
            continue;
        }
        if repo.has_live_almanax(&date).await? {
            summary.skipped += 1;
        } else {
            pending_days.push(date);
        }
    }
    if pending_days.is_empty() {
        return Ok(());
    }

    let slug = record.bonus_type.id.trim();
    if slug.is_empty() {
        return Err(AppError::BadRequest(format!(
            "bonus type without slug for receiver '{}'",
            record.offering_receiver
        )));
    }
    let bonus_type_id = match repo.find_bonus_type_id(slug).await? {
        Some(id) => id,
        None => {
            let names = &record.bonus_type.name;
            repo.create_bonus_type(&NewBonusType {
                name_id: slug.to_string(),
                name_en: localized(names, "en"),
                name_fr: localized(names, "fr"),
                name_es: localized(names, "es"),
                name_de: localized(names, "de"),
                name_it: localized(names, "it"),
                name_pt: localized(names, "pt"),
            })
            .await?
        }
    };

    let bonus_id = repo
        .create_bonus(&NewBonus {
            bonus_type_id,
            description_en: localized(&record.bonus, "en"),
            description_fr: localized(&record.bonus, "fr"),
            description_es: localized(&record.bonus, "es"),
            description_de: localized(&record.bonus, "de"),
            description_it: localized(&record.bonus, "it"),
            description_pt: localized(&record.bonus, "pt"),
        })
        .await?;

    let offering = &record.offering;
    let tribute_id = repo
        .create_tribute(&NewTribute {
            item_name_en: localized(&offering.item_name, "en"),
            item_name_fr: localized(&offering.item_name, "fr"),
            item_name_es: localized(&offering.item_name, "es"),
            item_name_de: localized(&offering.item_name, "de"),
            item_name_it: localized(&offering.item_name, "it"),
            item_name_pt: localized(&offering.item_name, "pt"),
            item_icon: offering.image_urls.icon.clone(),
            item_sd: offering.image_urls.sd.clone(),
            item_hq: offering.image_urls.hq.clone(),
            item_hd: offering.image_urls.hd.clone(),
            item_ankama_id: offering.item_id,
            item_subtype: offering.item_subtype.clone(),
            item_doduapi_uri: format!(
                "{}/en/items/{}/{}",
                state.config.api_prefix, offering.item_subtype, offering.item_id
            ),
            quantity: offering.quantity,
        })
        .await?;

    for date in pending_days {
        repo.create(&NewAlmanax {
            bonus_id,
            tribute_id,
            date,
            reward_kamas: record.reward_kamas,
        })
        .await?;
        summary.created += 1;
    }
    Ok(())
}
