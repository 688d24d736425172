use std::sync::Arc;

use backend_domain::ports::{
    AlmanaxRepository, BonusListingSource, ReleaseAssetSource, SearchIndexService,
};
use backend_domain::RuntimeConfig;

use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub almanax_repo: Arc<dyn AlmanaxRepository>,
    pub search_index: Arc<dyn SearchIndexService>,
    pub bonus_source: Arc<dyn BonusListingSource>,
    pub release_source: Arc<dyn ReleaseAssetSource>,
    pub metrics: Arc<Metrics>,
}
