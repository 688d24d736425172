//! Keeps the per-language almanax bonus search indexes in line with the
//! remote bonus listing.
//!
//! Languages are processed one after another. The first failure of a fetch,
//! an index creation or an index task ends the whole run; documents committed
//! for earlier languages stay in place and are reported in the count.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{error, info, warn};

use backend_domain::{
    has_identical_hit, project_listings, BonusListingSource, Language, ReindexMode,
    ReindexReport, ReindexStatus, SearchError, SearchErrorCode, SearchIndexService,
    TaskHandle, TaskOutcome, TaskTimeouts,
};

const PRIMARY_KEY: &str = "id";
// Hits inspected per listing entry when looking for an exact name.
const IDENTICAL_HIT_WINDOW: u32 = 8;

#[derive(Debug, Error)]
enum ReconcileFailure {
    #[error("fetching bonus listing failed: {0}")]
    Fetch(anyhow::Error),
    #[error(transparent)]
    Search(#[from] SearchError),
}

pub struct BonusIndexReconciler {
    source: Arc<dyn BonusListingSource>,
    index: Arc<dyn SearchIndexService>,
    timeouts: TaskTimeouts,
}

impl BonusIndexReconciler {
    pub fn new(
        source: Arc<dyn BonusListingSource>,
        index: Arc<dyn SearchIndexService>,
        timeouts: TaskTimeouts,
    ) -> Self {
        Self {
            source,
            index,
            timeouts,
        }
    }

    pub async fn run(&self, mode: ReindexMode) -> ReindexReport {
        let mut added = 0;
        for lang in Language::bonus_languages() {
            if let Err(err) = self.reconcile_language(lang, mode, &mut added).await {
                error!(lang = %lang, mode = mode.as_str(), added, "bonus index sync aborted: {}", err);
                return ReindexReport {
                    mode,
                    added,
                    status: ReindexStatus::Aborted {
                        language: lang,
                        cause: err.to_string(),
                    },
                };
            }
        }
        info!(mode = mode.as_str(), added, "bonus index sync completed");
        ReindexReport {
            mode,
            added,
            status: ReindexStatus::Completed,
        }
    }

    async fn reconcile_language(
        &self,
        lang: Language,
        mode: ReindexMode,
        added: &mut usize,
    ) -> Result<(), ReconcileFailure> {
        let listings = self
            .source
            .fetch_bonus_listing(lang)
            .await
            .map_err(ReconcileFailure::Fetch)?;
        let uid = lang.bonus_index_uid();
        self.ensure_index(&uid).await?;

        match mode {
            ReindexMode::Full => {
                let documents = project_listings(&listings, 0);
                let task = self.index.delete_all_documents(&uid).await?;
                self.settle(task, self.timeouts.documents).await?;
                info!(index = %uid, "cleared bonus index");

                if !documents.is_empty() {
                    let task = self.index.add_documents(&uid, &documents).await?;
                    self.settle(task, self.timeouts.documents).await?;
                }
                *added += documents.len();
                info!(index = %uid, count = documents.len(), "uploaded bonus listing");
            }
            ReindexMode::Incremental => {
                // New surrogate ids continue after the existing documents so
                // no stored document is overwritten.
                let mut next_id = self.index.document_count(&uid).await?;
                for listing in &listings {
                    let hits = self.index.search(&uid, &listing.name, IDENTICAL_HIT_WINDOW).await?;
                    if has_identical_hit(&hits.hits, &listing.name) {
                        continue;
                    }
                    let document = project_listings(std::slice::from_ref(listing), next_id);
                    info!(index = %uid, slug = %listing.id, name = %listing.name, "adding bonus");
                    let task = self.index.add_documents(&uid, &document).await?;
                    self.settle(task, self.timeouts.documents).await?;
                    next_id += 1;
                    *added += 1;
                }
            }
        }
        Ok(())
    }

    async fn ensure_index(&self, uid: &str) -> Result<(), SearchError> {
        if self.index.index_exists(uid).await? {
            return Ok(());
        }
        info!(index = uid, "bonus index does not exist yet, creating");
        let task = match self.index.create_index(uid, PRIMARY_KEY).await {
            Ok(task) => task,
            Err(err) if err.is_already_exists() => return Ok(()),
            Err(err) => return Err(err),
        };
        self.settle(task, self.timeouts.index).await
    }

    /// Waits for `task` and turns a reported failure into an error, except for
    /// "already exists" which leaves the index in the wanted state.
    async fn settle(&self, task: TaskHandle, timeout: Duration) -> Result<(), SearchError> {
        match self.index.wait_for_task(task, timeout).await? {
            TaskOutcome::Succeeded => Ok(()),
            TaskOutcome::Failed {
                code: SearchErrorCode::IndexAlreadyExists,
                message,
            } => {
                warn!(task = task.task_uid, "ignoring task failure: {}", message);
                Ok(())
            }
            TaskOutcome::Failed { code, message } => Err(SearchError::TaskFailed {
                task_uid: task.task_uid,
                code,
                message,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemorySearchIndex, StaticBonusSource};
    use backend_domain::AlmanaxBonusListing;

    fn source_with_all_languages() -> Arc<StaticBonusSource> {
        let source = Arc::new(StaticBonusSource::new());
        source.set(
            Language::En,
            &[("experience", "Experience"), ("loot", "Loot"), ("harvest", "Harvest")],
        );
        source.set(Language::Fr, &[("experience", "Expérience"), ("loot", "Butin")]);
        source.set(Language::De, &[("experience", "Erfahrung")]);
        source.set(Language::Es, &[("experience", "Experiencia"), ("loot", "Botín")]);
        source.set(Language::Pt, &[("experience", "Experiência")]);
        source
    }

    fn reconciler(
        source: &Arc<StaticBonusSource>,
        index: &Arc<InMemorySearchIndex>,
    ) -> BonusIndexReconciler {
        BonusIndexReconciler::new(source.clone(), index.clone(), TaskTimeouts::default())
    }

    fn slugs(index: &InMemorySearchIndex, lang: Language) -> Vec<String> {
        let mut slugs = index
            .documents(&lang.bonus_index_uid())
            .into_iter()
            .map(|doc| doc.slug)
            .collect::<Vec<_>>();
        slugs.sort();
        slugs
    }

    #[tokio::test]
    async fn full_run_twice_keeps_one_document_per_slug() {
        let source = source_with_all_languages();
        let index = Arc::new(InMemorySearchIndex::new());
        let sync = reconciler(&source, &index);

        let first = sync.run(ReindexMode::Full).await;
        assert!(first.is_completed());
        assert_eq!(first.added, 8);

        source.set(Language::En, &[("experience", "Experience+"), ("loot", "Loot"), ("harvest", "Harvest")]);
        let second = sync.run(ReindexMode::Full).await;
        assert!(second.is_completed());
        assert_eq!(second.added, 8);

        assert_eq!(slugs(&index, Language::En), vec!["experience", "harvest", "loot"]);
        let names = index
            .documents(&Language::En.bonus_index_uid())
            .into_iter()
            .map(|doc| doc.name)
            .collect::<Vec<_>>();
        assert!(names.contains(&"Experience+".to_string()));
        assert!(!names.contains(&"Experience".to_string()));
        assert!(!index.was_touched(&Language::Pt.bonus_index_uid()));
        assert!(!source.calls().contains(&Language::Pt));
    }

    #[tokio::test]
    async fn full_run_creates_missing_indexes() {
        let source = source_with_all_languages();
        let index = Arc::new(InMemorySearchIndex::new());
        let report = reconciler(&source, &index).run(ReindexMode::Full).await;
        assert!(report.is_completed());
        assert_eq!(slugs(&index, Language::De), vec!["experience"]);
        let ids = index
            .documents(&Language::Fr.bonus_index_uid())
            .into_iter()
            .map(|doc| doc.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["0", "1"]);
    }

    #[tokio::test]
    async fn incremental_run_adds_only_missing_names() {
        let source = source_with_all_languages();
        let index = Arc::new(InMemorySearchIndex::new());
        let sync = reconciler(&source, &index);
        assert_eq!(sync.run(ReindexMode::Full).await.added, 8);

        source.set(
            Language::En,
            &[("experience", "Experience"), ("loot", "Loot"), ("harvest", "Harvest"), ("craft", "Craft")],
        );
        let report = sync.run(ReindexMode::Incremental).await;
        assert!(report.is_completed());
        assert_eq!(report.added, 1);
        assert_eq!(
            slugs(&index, Language::En),
            vec!["craft", "experience", "harvest", "loot"]
        );

        let again = sync.run(ReindexMode::Incremental).await;
        assert_eq!(again.added, 0);
        assert_eq!(index.documents(&Language::En.bonus_index_uid()).len(), 4);
    }

    #[tokio::test]
    async fn incremental_run_finds_exact_name_behind_partial_hits() {
        let source = Arc::new(StaticBonusSource::new());
        source.set(Language::En, &[("experience", "Experience")]);
        let index = Arc::new(InMemorySearchIndex::new());
        index.insert_documents(
            &Language::En.bonus_index_uid(),
            project_listings(
                &[
                    AlmanaxBonusListing { id: "xp-team".to_string(), name: "Experience Team".to_string() },
                    AlmanaxBonusListing { id: "experience".to_string(), name: "Experience".to_string() },
                ],
                0,
            ),
        );
        index.rank_exact_matches_last();

        let report = reconciler(&source, &index).run(ReindexMode::Incremental).await;
        assert!(report.is_completed());
        assert_eq!(report.added, 0);
        assert_eq!(index.documents(&Language::En.bonus_index_uid()).len(), 2);
    }

    #[tokio::test]
    async fn incremental_run_never_removes_stale_documents() {
        let source = source_with_all_languages();
        let index = Arc::new(InMemorySearchIndex::new());
        let sync = reconciler(&source, &index);
        sync.run(ReindexMode::Full).await;

        source.set(Language::En, &[("experience", "Experience")]);
        let report = sync.run(ReindexMode::Incremental).await;
        assert_eq!(report.added, 0);
        assert_eq!(slugs(&index, Language::En), vec!["experience", "harvest", "loot"]);
    }

    #[tokio::test]
    async fn fetch_failure_aborts_remaining_languages() {
        let source = source_with_all_languages();
        source.fail_for(Language::De);
        let index = Arc::new(InMemorySearchIndex::new());
        let report = reconciler(&source, &index).run(ReindexMode::Full).await;

        assert_eq!(report.added, 3 + 2);
        match &report.status {
            ReindexStatus::Aborted { language, cause } => {
                assert_eq!(*language, Language::De);
                assert!(cause.contains("fetching bonus listing failed"));
            }
            ReindexStatus::Completed => panic!("run should abort"),
        }
        assert_eq!(source.calls(), vec![Language::En, Language::Fr, Language::De]);
        assert!(!index.was_touched(&Language::Es.bonus_index_uid()));
        assert_eq!(slugs(&index, Language::Fr), vec!["experience", "loot"]);
    }

    #[tokio::test]
    async fn task_failure_aborts_with_partial_count() {
        let source = source_with_all_languages();
        let index = Arc::new(InMemorySearchIndex::new());
        index.fail_adds_for(&Language::Fr.bonus_index_uid());
        let report = reconciler(&source, &index).run(ReindexMode::Full).await;

        assert_eq!(report.added, 3);
        assert!(matches!(
            report.status,
            ReindexStatus::Aborted { language: Language::Fr, .. }
        ));
        assert!(!source.calls().contains(&Language::De));
    }

    #[tokio::test]
    async fn index_creation_tolerates_already_exists() {
        let source = source_with_all_languages();
        let index = Arc::new(InMemorySearchIndex::new());
        index.fail_creates_with(SearchErrorCode::IndexAlreadyExists);
        let report = reconciler(&source, &index).run(ReindexMode::Full).await;
        assert!(report.is_completed());
        assert_eq!(report.added, 8);
    }

    #[tokio::test]
    async fn index_creation_failure_aborts() {
        let source = source_with_all_languages();
        let index = Arc::new(InMemorySearchIndex::new());
        index.fail_creates_with(SearchErrorCode::Other("invalid_index_uid".to_string()));
        let report = reconciler(&source, &index).run(ReindexMode::Incremental).await;
        assert_eq!(report.added, 0);
        match report.status {
            ReindexStatus::Aborted { language, cause } => {
                assert_eq!(language, Language::En);
                assert!(cause.contains("invalid_index_uid"));
            }
            ReindexStatus::Completed => panic!("run should abort"),
        }
    }

    #[tokio::test]
    async fn unreachable_index_aborts_first_language() {
        let source = source_with_all_languages();
        let index = Arc::new(InMemorySearchIndex::new());
        index.set_unreachable();
        let report = reconciler(&source, &index).run(ReindexMode::Full).await;
        assert_eq!(report.added, 0);
        assert!(!report.is_completed());
        assert_eq!(source.calls(), vec![Language::En]);
    }
}
