use std::sync::Arc;

use anyhow::Result;

use backend_application::{AppState, Metrics};
use backend_infrastructure::{
    http_client, AppConfig, GithubReleaseSource, HttpBonusListingSource, MeiliSearchService,
    SqliteAlmanaxRepository,
};

pub struct AppContext {
    pub config: AppConfig,
    pub repo: Arc<SqliteAlmanaxRepository>,
    pub state: AppState,
}

impl AppContext {
    /// Loads `path`, or the default config location when `None`.
    pub async fn load(path: Option<&str>) -> Result<Self> {
        let config = match path {
            Some(path) => AppConfig::load_from(path).await?,
            None => AppConfig::load().await?,
        };
        Self::new(config)
    }

    /// Wires every port; the store itself opens lazily on first use.
    pub fn new(config: AppConfig) -> Result<Self> {
        let runtime_config = config.to_runtime_config();
        let source_config = config.to_source_config();
        let client = http_client(config.request_timeout_seconds)?;

        let repo = Arc::new(SqliteAlmanaxRepository::new(config.to_db_config()));
        let search_index = Arc::new(MeiliSearchService::new(
            &config.to_search_config(),
            client.clone(),
        ));
        let bonus_source = Arc::new(HttpBonusListingSource::new(&source_config, client.clone()));
        let release_source = Arc::new(GithubReleaseSource::new(&source_config, client));

        let state = AppState {
            config: runtime_config,
            almanax_repo: repo.clone(),
            search_index,
            bonus_source,
            release_source,
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self {
            config,
            repo,
            state,
        })
    }
}
