// In-memory port implementations used by tests across the workspace

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::NaiveDateTime;

use backend_domain::{
    AlmanaxBonusListing, AlmanaxBonusListingMeili, AlmanaxRepository, AlmanaxUpdate, Bonus,
    BonusListingSource, BonusType, Language, MappedAlmanax, MappedMultilangNpcAlmanax, Almanax,
    NewAlmanax, NewBonus, NewBonusType, NewTribute, ReleaseAssetSource, RepositoryError,
    RepositoryResult, RuntimeConfig, SearchError, SearchErrorCode, SearchHits,
    SearchIndexService, TaskHandle, TaskOutcome, Tribute,
};

use crate::{AppState, Metrics};

pub fn test_config() -> RuntimeConfig {
    RuntimeConfig {
        api_port: 3000,
        api_scheme: "http".to_string(),
        api_hostname: "localhost".to_string(),
        api_prefix: "/dofus3/v1".to_string(),
        server_tz: "Europe/Berlin".to_string(),
        request_timeout_seconds: 10,
        index_task_timeout_ms: 2000,
        document_task_timeout_ms: 5000,
        task_poll_interval_ms: 50,
    }
}

pub fn test_state(
    repo: Arc<InMemoryAlmanaxRepository>,
    index: Arc<InMemorySearchIndex>,
    source: Arc<StaticBonusSource>,
) -> AppState {
    AppState {
        config: test_config(),
        almanax_repo: repo,
        search_index: index,
        bonus_source: source,
        release_source: Arc::new(StaticReleaseSource::default()),
        metrics: Arc::new(Metrics::default()),
    }
}

fn epoch() -> NaiveDateTime {
    chrono::DateTime::from_timestamp(0, 0)
        .map(|ts| ts.naive_utc())
        .unwrap_or_default()
}

// ---------------------------------------------------------------- storage

#[derive(Default)]
struct Tables {
    bonus_types: Vec<BonusType>,
    bonuses: Vec<Bonus>,
    tributes: Vec<Tribute>,
    almanax: Vec<Almanax>,
}

/// Mirrors the relational store closely enough for application tests.
#[derive(Default)]
pub struct InMemoryAlmanaxRepository {
    tables: Mutex<Tables>,
}

impl InMemoryAlmanaxRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn soft_delete(&self, almanax_id: i64) {
        let mut tables = self.tables.lock().expect("tables lock");
        if let Some(row) = tables.almanax.iter_mut().find(|row| row.id == almanax_id) {
            row.deleted_at = Some(epoch());
        }
    }

    /// Seeds one bonus type, bonus and tribute and returns (bonus_id, tribute_id).
    pub fn seed_bonus(&self, slug: &str, name_en: &str) -> (i64, i64) {
        let mut tables = self.tables.lock().expect("tables lock");
        let bonus_type_id = tables.bonus_types.len() as i64 + 1;
        tables.bonus_types.push(BonusType {
            id: bonus_type_id,
            name_id: slug.to_string(),
            name_en: name_en.to_string(),
            name_fr: format!("{} (fr)", name_en),
            name_es: format!("{} (es)", name_en),
            name_de: format!("{} (de)", name_en),
            name_it: format!("{} (it)", name_en),
            name_pt: format!("{} (pt)", name_en),
            created_at: epoch(),
            updated_at: epoch(),
            deleted_at: None,
        });
        let bonus_id = tables.bonuses.len() as i64 + 1;
        tables.bonuses.push(Bonus {
            id: bonus_id,
            bonus_type_id,
            description_en: format!("{} description", name_en),
            description_fr: String::new(),
            description_es: String::new(),
            description_de: String::new(),
            description_it: String::new(),
            description_pt: String::new(),
            created_at: epoch(),
            updated_at: epoch(),
            deleted_at: None,
        });
        let tribute_id = tables.tributes.len() as i64 + 1;
        tables.tributes.push(Tribute {
            id: tribute_id,
            item_name_en: format!("{} item", name_en),
            item_name_fr: String::new(),
            item_name_es: String::new(),
            item_name_de: String::new(),
            item_name_it: String::new(),
            item_name_pt: String::new(),
            item_icon: String::new(),
            item_sd: String::new(),
            item_hq: String::new(),
            item_hd: String::new(),
            item_ankama_id: tribute_id * 100,
            item_subtype: "resources".to_string(),
            item_doduapi_uri: String::new(),
            quantity: 1,
            created_at: epoch(),
            updated_at: epoch(),
            deleted_at: None,
        });
        (bonus_id, tribute_id)
    }

    pub fn soft_delete_bonus(&self, bonus_id: i64) {
        let mut tables = self.tables.lock().expect("tables lock");
        if let Some(bonus) = tables.bonuses.iter_mut().find(|bonus| bonus.id == bonus_id) {
            bonus.deleted_at = Some(epoch());
        }
    }

    pub fn almanax_rows(&self) -> Vec<Almanax> {
        self.tables.lock().expect("tables lock").almanax.clone()
    }

    fn mapped(&self, from: &str, to: &str, slug: Option<&str>) -> Vec<MappedAlmanax> {
        let tables = self.tables.lock().expect("tables lock");
        let mut out = tables
            .almanax
            .iter()
            .filter(|row| row.deleted_at.is_none())
            .filter(|row| row.date.as_str() >= from && row.date.as_str() <= to)
            .filter_map(|row| {
                let bonus = tables
                    .bonuses
                    .iter()
                    .find(|b| b.id == row.bonus_id && b.deleted_at.is_none())?;
                let bonus_type = tables
                    .bonus_types
                    .iter()
                    .find(|bt| bt.id == bonus.bonus_type_id && bt.deleted_at.is_none())?;
                let tribute = tables
                    .tributes
                    .iter()
                    .find(|t| t.id == row.tribute_id && t.deleted_at.is_none())?;
                Some(MappedAlmanax {
                    almanax: row.clone(),
                    bonus: bonus.clone(),
                    bonus_type: bonus_type.clone(),
                    tribute: tribute.clone(),
                })
            })
            .filter(|mapped| slug.map(|s| mapped.bonus_type.name_id == s).unwrap_or(true))
            .collect::<Vec<_>>();
        out.sort_by(|a, b| a.almanax.date.cmp(&b.almanax.date));
        out
    }
}

#[async_trait]
impl AlmanaxRepository for InMemoryAlmanaxRepository {
    async fn get_by_date_range(&self, from: &str, to: &str) -> RepositoryResult<Vec<MappedAlmanax>> {
        Ok(self.mapped(from, to, None))
    }

    async fn get_by_date_range_and_bonus_slug(
        &self,
        from: &str,
        to: &str,
        slug: &str,
    ) -> RepositoryResult<Vec<MappedAlmanax>> {
        Ok(self.mapped(from, to, Some(slug)))
    }

    async fn has_live_almanax(&self, date: &str) -> RepositoryResult<bool> {
        let tables = self.tables.lock().expect("tables lock");
        Ok(tables
            .almanax
            .iter()
            .any(|row| row.deleted_at.is_none() && row.date == date))
    }

    async fn create(&self, almanax: &NewAlmanax) -> RepositoryResult<i64> {
        let mut tables = self.tables.lock().expect("tables lock");
        let references_ok = tables.bonuses.iter().any(|b| b.id == almanax.bonus_id)
            && tables.tributes.iter().any(|t| t.id == almanax.tribute_id);
        if !references_ok {
            return Err(RepositoryError::Integrity(
                "FOREIGN KEY constraint failed".to_string(),
            ));
        }
        if tables
            .almanax
            .iter()
            .any(|row| row.deleted_at.is_none() && row.date == almanax.date)
        {
            return Err(RepositoryError::Integrity(format!(
                "almanax for {} already exists",
                almanax.date
            )));
        }
        let id = tables.almanax.len() as i64 + 1;
        tables.almanax.push(Almanax {
            id,
            bonus_id: almanax.bonus_id,
            tribute_id: almanax.tribute_id,
            date: almanax.date.clone(),
            reward_kamas: almanax.reward_kamas,
            created_at: epoch(),
            updated_at: epoch(),
            deleted_at: None,
        });
        Ok(id)
    }

    async fn update(&self, almanax: &AlmanaxUpdate) -> RepositoryResult<()> {
        let mut tables = self.tables.lock().expect("tables lock");
        let references_ok = tables.bonuses.iter().any(|b| b.id == almanax.bonus_id)
            && tables.tributes.iter().any(|t| t.id == almanax.tribute_id);
        let row = tables
            .almanax
            .iter_mut()
            .find(|row| row.id == almanax.id && row.deleted_at.is_none())
            .ok_or_else(|| RepositoryError::NotFound(format!("almanax {}", almanax.id)))?;
        if !references_ok {
            return Err(RepositoryError::Integrity(
                "FOREIGN KEY constraint failed".to_string(),
            ));
        }
        row.bonus_id = almanax.bonus_id;
        row.tribute_id = almanax.tribute_id;
        row.date = almanax.date.clone();
        row.reward_kamas = almanax.reward_kamas;
        Ok(())
    }

    async fn create_bonus_type(&self, bonus_type: &NewBonusType) -> RepositoryResult<i64> {
        let mut tables = self.tables.lock().expect("tables lock");
        if tables
            .bonus_types
            .iter()
            .any(|bt| bt.name_id == bonus_type.name_id)
        {
            return Err(RepositoryError::Integrity(format!(
                "UNIQUE constraint failed: bonus_types.name_id ({})",
                bonus_type.name_id
            )));
        }
        let id = tables.bonus_types.len() as i64 + 1;
        tables.bonus_types.push(BonusType {
            id,
            name_id: bonus_type.name_id.clone(),
            name_en: bonus_type.name_en.clone(),
            name_fr: bonus_type.name_fr.clone(),
            name_es: bonus_type.name_es.clone(),
            name_de: bonus_type.name_de.clone(),
            name_it: bonus_type.name_it.clone(),
            name_pt: bonus_type.name_pt.clone(),
            created_at: epoch(),
            updated_at: epoch(),
            deleted_at: None,
        });
        Ok(id)
    }

    async fn list_bonus_types(&self) -> RepositoryResult<Vec<BonusType>> {
        let tables = self.tables.lock().expect("tables lock");
        let mut out = tables
            .bonus_types
            .iter()
            .filter(|bt| bt.deleted_at.is_none())
            .cloned()
            .collect::<Vec<_>>();
        out.sort_by(|a, b| a.name_id.cmp(&b.name_id));
        Ok(out)
    }

    async fn find_bonus_type_id(&self, slug: &str) -> RepositoryResult<Option<i64>> {
        let tables = self.tables.lock().expect("tables lock");
        Ok(tables
            .bonus_types
            .iter()
            .find(|bt| bt.deleted_at.is_none() && bt.name_id == slug)
            .map(|bt| bt.id))
    }

    async fn create_bonus(&self, bonus: &NewBonus) -> RepositoryResult<i64> {
        let mut tables = self.tables.lock().expect("tables lock");
        if !tables.bonus_types.iter().any(|bt| bt.id == bonus.bonus_type_id) {
            return Err(RepositoryError::Integrity(
                "FOREIGN KEY constraint failed".to_string(),
            ));
        }
        let id = tables.bonuses.len() as i64 + 1;
        tables.bonuses.push(Bonus {
            id,
            bonus_type_id: bonus.bonus_type_id,
            description_en: bonus.description_en.clone(),
            description_fr: bonus.description_fr.clone(),
            description_es: bonus.description_es.clone(),
            description_de: bonus.description_de.clone(),
            description_it: bonus.description_it.clone(),
            description_pt: bonus.description_pt.clone(),
            created_at: epoch(),
            updated_at: epoch(),
            deleted_at: None,
        });
        Ok(id)
    }

    async fn create_tribute(&self, tribute: &NewTribute) -> RepositoryResult<i64> {
        if tribute.quantity < 1 {
            return Err(RepositoryError::Integrity(
                "CHECK constraint failed: quantity >= 1".to_string(),
            ));
        }
        let mut tables = self.tables.lock().expect("tables lock");
        let id = tables.tributes.len() as i64 + 1;
        tables.tributes.push(Tribute {
            id,
            item_name_en: tribute.item_name_en.clone(),
            item_name_fr: tribute.item_name_fr.clone(),
            item_name_es: tribute.item_name_es.clone(),
            item_name_de: tribute.item_name_de.clone(),
            item_name_it: tribute.item_name_it.clone(),
            item_name_pt: tribute.item_name_pt.clone(),
            item_icon: tribute.item_icon.clone(),
            item_sd: tribute.item_sd.clone(),
            item_hq: tribute.item_hq.clone(),
            item_hd: tribute.item_hd.clone(),
            item_ankama_id: tribute.item_ankama_id,
            item_subtype: tribute.item_subtype.clone(),
            item_doduapi_uri: tribute.item_doduapi_uri.clone(),
            quantity: tribute.quantity,
            created_at: epoch(),
            updated_at: epoch(),
            deleted_at: None,
        });
        Ok(id)
    }

    async fn ping(&self) -> RepositoryResult<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------- search

#[derive(Default)]
struct IndexState {
    indexes: HashMap<String, BTreeMap<String, AlmanaxBonusListingMeili>>,
    tasks: HashMap<u64, TaskOutcome>,
    next_task: u64,
    touched: HashSet<String>,
}

/// Search index whose tasks settle immediately.
#[derive(Default)]
pub struct InMemorySearchIndex {
    state: Mutex<IndexState>,
    failing_adds: Mutex<HashSet<String>>,
    create_failure: Mutex<Option<SearchErrorCode>>,
    unreachable: Mutex<bool>,
    exact_last: Mutex<bool>,
}

impl InMemorySearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add-documents tasks for `uid` report a failure.
    pub fn fail_adds_for(&self, uid: &str) {
        self.failing_adds
            .lock()
            .expect("failing lock")
            .insert(uid.to_string());
    }

    /// Index creation tasks report `code` and leave no index behind.
    pub fn fail_creates_with(&self, code: SearchErrorCode) {
        *self.create_failure.lock().expect("create lock") = Some(code);
    }

    /// Ranks exact name matches behind partial ones, as a relevance tie can.
    pub fn rank_exact_matches_last(&self) {
        *self.exact_last.lock().expect("ranking lock") = true;
    }

    pub fn set_unreachable(&self) {
        *self.unreachable.lock().expect("unreachable lock") = true;
    }

    pub fn documents(&self, uid: &str) -> Vec<AlmanaxBonusListingMeili> {
        self.state
            .lock()
            .expect("index lock")
            .indexes
            .get(uid)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn was_touched(&self, uid: &str) -> bool {
        self.state.lock().expect("index lock").touched.contains(uid)
    }

    pub fn insert_documents(&self, uid: &str, documents: Vec<AlmanaxBonusListingMeili>) {
        let mut state = self.state.lock().expect("index lock");
        let index = state.indexes.entry(uid.to_string()).or_default();
        for doc in documents {
            index.insert(doc.id.clone(), doc);
        }
    }

    fn check_reachable(&self) -> Result<(), SearchError> {
        if *self.unreachable.lock().expect("unreachable lock") {
            return Err(SearchError::Transport("connection refused".to_string()));
        }
        Ok(())
    }

    fn enqueue(state: &mut IndexState, outcome: TaskOutcome) -> TaskHandle {
        state.next_task += 1;
        let task_uid = state.next_task;
        state.tasks.insert(task_uid, outcome);
        TaskHandle { task_uid }
    }
}

#[async_trait]
impl SearchIndexService for InMemorySearchIndex {
    async fn index_exists(&self, uid: &str) -> Result<bool, SearchError> {
        self.check_reachable()?;
        let mut state = self.state.lock().expect("index lock");
        state.touched.insert(uid.to_string());
        Ok(state.indexes.contains_key(uid))
    }

    async fn create_index(&self, uid: &str, _primary_key: &str) -> Result<TaskHandle, SearchError> {
        self.check_reachable()?;
        let failure = self.create_failure.lock().expect("create lock").clone();
        let mut state = self.state.lock().expect("index lock");
        state.touched.insert(uid.to_string());
        let outcome = match failure {
            Some(code) => TaskOutcome::Failed {
                message: format!("creating index `{}` failed", uid),
                code,
            },
            None => {
                state.indexes.entry(uid.to_string()).or_default();
                TaskOutcome::Succeeded
            }
        };
        Ok(Self::enqueue(&mut state, outcome))
    }

    async fn delete_all_documents(&self, uid: &str) -> Result<TaskHandle, SearchError> {
        self.check_reachable()?;
        let mut state = self.state.lock().expect("index lock");
        state.touched.insert(uid.to_string());
        if let Some(index) = state.indexes.get_mut(uid) {
            index.clear();
        }
        Ok(Self::enqueue(&mut state, TaskOutcome::Succeeded))
    }

    async fn add_documents(
        &self,
        uid: &str,
        documents: &[AlmanaxBonusListingMeili],
    ) -> Result<TaskHandle, SearchError> {
        self.check_reachable()?;
        let failing = self.failing_adds.lock().expect("failing lock").contains(uid);
        let mut state = self.state.lock().expect("index lock");
        state.touched.insert(uid.to_string());
        if failing {
            let outcome = TaskOutcome::Failed {
                code: SearchErrorCode::Other("internal".to_string()),
                message: "document addition failed".to_string(),
            };
            return Ok(Self::enqueue(&mut state, outcome));
        }
        let index = state.indexes.entry(uid.to_string()).or_default();
        for doc in documents {
            index.insert(doc.id.clone(), doc.clone());
        }
        Ok(Self::enqueue(&mut state, TaskOutcome::Succeeded))
    }

    async fn document_count(&self, uid: &str) -> Result<u64, SearchError> {
        self.check_reachable()?;
        let state = self.state.lock().expect("index lock");
        Ok(state.indexes.get(uid).map(|docs| docs.len() as u64).unwrap_or(0))
    }

    async fn search(&self, uid: &str, query: &str, limit: u32) -> Result<SearchHits, SearchError> {
        self.check_reachable()?;
        let state = self.state.lock().expect("index lock");
        let index = state.indexes.get(uid).ok_or_else(|| SearchError::Api {
            code: SearchErrorCode::IndexNotFound,
            message: format!("Index `{}` not found.", uid),
        })?;
        let needle = query.to_lowercase();
        let mut hits = index
            .values()
            .filter(|doc| doc.name.to_lowercase().contains(&needle))
            .cloned()
            .collect::<Vec<_>>();
        if *self.exact_last.lock().expect("ranking lock") {
            hits.sort_by_key(|doc| (doc.name == query, doc.name.len()));
        } else {
            hits.sort_by_key(|doc| (doc.name != query, doc.name.len()));
        }
        let total = hits.len() as u64;
        hits.truncate(limit as usize);
        Ok(SearchHits {
            hits,
            estimated_total_hits: total,
        })
    }

    async fn wait_for_task(
        &self,
        task: TaskHandle,
        _timeout: Duration,
    ) -> Result<TaskOutcome, SearchError> {
        let state = self.state.lock().expect("index lock");
        state
            .tasks
            .get(&task.task_uid)
            .cloned()
            .ok_or_else(|| SearchError::Api {
                code: SearchErrorCode::Other("task_not_found".to_string()),
                message: format!("Task `{}` not found.", task.task_uid),
            })
    }
}

// ---------------------------------------------------------------- sources

#[derive(Default)]
pub struct StaticBonusSource {
    listings: Mutex<HashMap<Language, Vec<AlmanaxBonusListing>>>,
    failing: Mutex<HashSet<Language>>,
    calls: Mutex<Vec<Language>>,
}

impl StaticBonusSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, lang: Language, entries: &[(&str, &str)]) {
        let listing = entries
            .iter()
            .map(|(slug, name)| AlmanaxBonusListing {
                id: slug.to_string(),
                name: name.to_string(),
            })
            .collect();
        self.listings
            .lock()
            .expect("listings lock")
            .insert(lang, listing);
    }

    pub fn fail_for(&self, lang: Language) {
        self.failing.lock().expect("failing lock").insert(lang);
    }

    pub fn calls(&self) -> Vec<Language> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl BonusListingSource for StaticBonusSource {
    async fn fetch_bonus_listing(&self, lang: Language) -> anyhow::Result<Vec<AlmanaxBonusListing>> {
        self.calls.lock().expect("calls lock").push(lang);
        if self.failing.lock().expect("failing lock").contains(&lang) {
            return Err(anyhow!("GET bonuses/{}: 502 Bad Gateway", lang));
        }
        Ok(self
            .listings
            .lock()
            .expect("listings lock")
            .get(&lang)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct StaticReleaseSource {
    releases: Mutex<HashMap<String, Vec<MappedMultilangNpcAlmanax>>>,
}

impl StaticReleaseSource {
    pub fn with_release(tag: &str, records: Vec<MappedMultilangNpcAlmanax>) -> Self {
        let source = Self::default();
        source
            .releases
            .lock()
            .expect("releases lock")
            .insert(tag.to_string(), records);
        source
    }
}

#[async_trait]
impl ReleaseAssetSource for StaticReleaseSource {
    async fn fetch_mapped_almanax(&self, tag: &str) -> anyhow::Result<Vec<MappedMultilangNpcAlmanax>> {
        self.releases
            .lock()
            .expect("releases lock")
            .get(tag)
            .cloned()
            .ok_or_else(|| anyhow!("release {} not found", tag))
    }
}
