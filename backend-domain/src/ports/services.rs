use std::time::Duration;

use async_trait::async_trait;

use crate::entities::{AlmanaxBonusListing, AlmanaxBonusListingMeili, MappedMultilangNpcAlmanax};
use crate::errors::{SearchError, SearchErrorCode};
use crate::value_objects::Language;

/// Server side task enqueued by a mutating index call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskHandle {
    pub task_uid: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Succeeded,
    Failed {
        code: SearchErrorCode,
        message: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct SearchHits {
    pub hits: Vec<AlmanaxBonusListingMeili>,
    pub estimated_total_hits: u64,
}

#[async_trait]
pub trait SearchIndexService: Send + Sync {
    async fn index_exists(&self, uid: &str) -> Result<bool, SearchError>;
    async fn create_index(&self, uid: &str, primary_key: &str) -> Result<TaskHandle, SearchError>;
    async fn delete_all_documents(&self, uid: &str) -> Result<TaskHandle, SearchError>;
    async fn add_documents(
        &self,
        uid: &str,
        documents: &[AlmanaxBonusListingMeili],
    ) -> Result<TaskHandle, SearchError>;
    async fn document_count(&self, uid: &str) -> Result<u64, SearchError>;
    async fn search(&self, uid: &str, query: &str, limit: u32) -> Result<SearchHits, SearchError>;
    /// Polls until the task settles or `timeout` elapses; elapsing is an error.
    async fn wait_for_task(
        &self,
        task: TaskHandle,
        timeout: Duration,
    ) -> Result<TaskOutcome, SearchError>;
}

#[async_trait]
pub trait BonusListingSource: Send + Sync {
    async fn fetch_bonus_listing(&self, lang: Language) -> anyhow::Result<Vec<AlmanaxBonusListing>>;
}

#[async_trait]
pub trait ReleaseAssetSource: Send + Sync {
    async fn fetch_mapped_almanax(&self, tag: &str) -> anyhow::Result<Vec<MappedMultilangNpcAlmanax>>;
}
