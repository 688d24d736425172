use tracing::info;

use crate::ops::BonusIndexReconciler;
use crate::AppState;
use backend_domain::{ReindexMode, ReindexReport};

pub async fn update_bonus_index(state: &AppState, mode: ReindexMode) -> ReindexReport {
    info!(mode = mode.as_str(), "starting bonus index sync");
    let reconciler = BonusIndexReconciler::new(
        state.bonus_source.clone(),
        state.search_index.clone(),
        state.config.task_timeouts(),
    );
    let report = reconciler.run(mode).await;
    state.metrics.record_reindexed(report.added);
    report
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{test_state, InMemoryAlmanaxRepository, InMemorySearchIndex, StaticBonusSource};
    use backend_domain::Language;

    #[tokio::test]
    async fn records_reindexed_documents() {
        let source = Arc::new(StaticBonusSource::new());
        source.set(Language::En, &[("experience", "Experience")]);
        let state = test_state(
            Arc::new(InMemoryAlmanaxRepository::new()),
            Arc::new(InMemorySearchIndex::new()),
            source,
        );
        let report = update_bonus_index(&state, ReindexMode::from_init(true)).await;
        assert!(report.is_completed());
        assert_eq!(report.added, 1);
        assert!(state
            .metrics
            .render_prometheus()
            .contains("dodualm_reindexed_documents_total 1\n"));
    }
}
