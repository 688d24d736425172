use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use backend_domain::{DbConfig, RuntimeConfig, SearchConfig, SourceConfig};

use crate::config::validation::{validate_scheme, validate_timezone};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub api_port: u16,
    pub api_scheme: String,
    pub api_hostname: String,
    pub api_prefix: String,
    pub server_tz: String,
    pub meili_protocol: String,
    pub meili_host: String,
    pub meili_port: u16,
    pub meili_master_key: Option<String>,
    pub database_path: String,
    pub request_timeout_seconds: u64,
    pub bonus_listing_url: String,
    pub release_owner: String,
    pub release_repo: String,
    pub release_asset: String,
    pub github_token: Option<String>,
    pub index_task_timeout_ms: u64,
    pub document_task_timeout_ms: u64,
    pub task_poll_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_port: 3000,
            api_scheme: "http".to_string(),
            api_hostname: "localhost".to_string(),
            api_prefix: "/dofus3/v1".to_string(),
            server_tz: "Europe/Berlin".to_string(),
            meili_protocol: "http".to_string(),
            meili_host: "127.0.0.1".to_string(),
            meili_port: 7700,
            meili_master_key: Some("masterKey".to_string()),
            database_path: "./almanax.db".to_string(),
            request_timeout_seconds: 10,
            bonus_listing_url: "https://api.dofusdu.de/dofus2".to_string(),
            release_owner: "dofusdude".to_string(),
            release_repo: "dofus3-main".to_string(),
            release_asset: "MAPPED_ALMANAX.json".to_string(),
            github_token: None,
            index_task_timeout_ms: 2000,
            document_task_timeout_ms: 5000,
            task_poll_interval_ms: 50,
        }
    }
}

impl AppConfig {
    /// Loads the file named by `ALMANAX_CONFIG`, or `./config.toml`.
    pub async fn load() -> Result<Self> {
        let path = env::var("ALMANAX_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        Self::load_from(&path).await
    }

    pub async fn load_from(path: &str) -> Result<Self> {
        let file_path = Path::new(path);
        let base_dir = file_path.parent();
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            toml::from_str(&content).map_err(|err| anyhow!("invalid config {}: {}", path, err))?
        } else {
            warn!(path, "config file not found, using defaults");
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.resolve_paths(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        self.meili_master_key = non_empty(self.meili_master_key.take());
        self.github_token = non_empty(self.github_token.take());
        self.api_prefix = format!("/{}", self.api_prefix.trim().trim_matches('/'));
        self.bonus_listing_url = self.bonus_listing_url.trim().trim_end_matches('/').to_string();
        self.server_tz = self.server_tz.trim().to_string();
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.database_path = resolve_path(base, &self.database_path);
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_port == 0 {
            return Err(anyhow!("api_port must be greater than 0"));
        }
        if self.meili_port == 0 {
            return Err(anyhow!("meili_port must be greater than 0"));
        }
        validate_scheme("api_scheme", &self.api_scheme)?;
        validate_scheme("meili_protocol", &self.meili_protocol)?;
        validate_timezone(&self.server_tz)?;
        if self.database_path.trim().is_empty() {
            return Err(anyhow!("database_path must not be empty"));
        }
        if self.request_timeout_seconds == 0 {
            return Err(anyhow!("request_timeout_seconds must be greater than 0"));
        }
        if self.index_task_timeout_ms == 0 || self.document_task_timeout_ms == 0 {
            return Err(anyhow!("task timeouts must be greater than 0"));
        }
        if self.task_poll_interval_ms == 0
            || self.task_poll_interval_ms >= self.index_task_timeout_ms
            || self.task_poll_interval_ms >= self.document_task_timeout_ms
        {
            return Err(anyhow!(
                "task_poll_interval_ms must be positive and below every task timeout"
            ));
        }
        Ok(())
    }

    pub fn meili_url(&self) -> String {
        format!("{}://{}:{}", self.meili_protocol, self.meili_host, self.meili_port)
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            api_port: self.api_port,
            api_scheme: self.api_scheme.clone(),
            api_hostname: self.api_hostname.clone(),
            api_prefix: self.api_prefix.clone(),
            server_tz: self.server_tz.clone(),
            request_timeout_seconds: self.request_timeout_seconds,
            index_task_timeout_ms: self.index_task_timeout_ms,
            document_task_timeout_ms: self.document_task_timeout_ms,
            task_poll_interval_ms: self.task_poll_interval_ms,
        }
    }

    pub fn to_db_config(&self) -> DbConfig {
        DbConfig {
            database_path: self.database_path.clone(),
        }
    }

    pub fn to_search_config(&self) -> SearchConfig {
        SearchConfig {
            meili_url: self.meili_url(),
            meili_key: self.meili_master_key.clone(),
            poll_interval_ms: self.task_poll_interval_ms,
        }
    }

    pub fn to_source_config(&self) -> SourceConfig {
        SourceConfig {
            bonus_listing_url: self.bonus_listing_url.clone(),
            release_owner: self.release_owner.clone(),
            release_repo: self.release_repo.clone(),
            release_asset: self.release_asset.clone(),
            github_token: self.github_token.clone(),
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("API_PORT") {
            self.api_port = value.parse().unwrap_or(self.api_port);
        }
        if let Ok(value) = env::var("API_SCHEME") {
            self.api_scheme = value;
        }
        if let Ok(value) = env::var("API_HOSTNAME") {
            self.api_hostname = value;
        }
        if let Ok(value) = env::var("ALMANAX_API_PREFIX") {
            self.api_prefix = value;
        }
        if let Ok(value) = env::var("SERVER_TZ") {
            self.server_tz = value;
        }
        if let Ok(value) = env::var("MEILI_PROTOCOL") {
            self.meili_protocol = value;
        }
        if let Ok(value) = env::var("MEILI_HOST") {
            self.meili_host = value;
        }
        if let Ok(value) = env::var("MEILI_PORT") {
            self.meili_port = value.parse().unwrap_or(self.meili_port);
        }
        if let Ok(value) = env::var("MEILI_MASTER_KEY") {
            self.meili_master_key = Some(value);
        }
        if let Ok(value) = env::var("ALMANAX_DATABASE_PATH") {
            self.database_path = value;
        }
        if let Ok(value) = env::var("ALMANAX_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Ok(value) = env::var("ALMANAX_BONUS_LISTING_URL") {
            self.bonus_listing_url = value;
        }
        if let Ok(value) = env::var("ALMANAX_RELEASE_OWNER") {
            self.release_owner = value;
        }
        if let Ok(value) = env::var("ALMANAX_RELEASE_REPO") {
            self.release_repo = value;
        }
        if let Ok(value) = env::var("ALMANAX_RELEASE_ASSET") {
            self.release_asset = value;
        }
        if let Ok(value) = env::var("GITHUB_TOKEN") {
            self.github_token = Some(value);
        }
        if let Ok(value) = env::var("ALMANAX_INDEX_TASK_TIMEOUT_MS") {
            self.index_task_timeout_ms = value.parse().unwrap_or(self.index_task_timeout_ms);
        }
        if let Ok(value) = env::var("ALMANAX_DOCUMENT_TASK_TIMEOUT_MS") {
            self.document_task_timeout_ms = value.parse().unwrap_or(self.document_task_timeout_ms);
        }
        if let Ok(value) = env::var("ALMANAX_TASK_POLL_INTERVAL_MS") {
            self.task_poll_interval_ms = value.parse().unwrap_or(self.task_poll_interval_ms);
        }
    }
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.starts_with(':') {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() || base.as_os_str().is_empty() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let mut config = AppConfig::default();
        config.normalize();
        config.validate().expect("defaults validate");
        assert_eq!(config.meili_url(), "http://127.0.0.1:7700");
        let runtime = config.to_runtime_config();
        assert_eq!(runtime.bind_addr(), "0.0.0.0:3000");
        assert_eq!(runtime.task_timeouts().index.as_millis(), 2000);
        assert_eq!(config.to_search_config().meili_key.as_deref(), Some("masterKey"));
    }

    #[test]
    fn normalize_trims_prefix_and_blank_secrets() {
        let mut config = AppConfig {
            api_prefix: "dofus3/v1/".to_string(),
            github_token: Some("  ".to_string()),
            bonus_listing_url: "https://api.dofusdu.de/dofus2/".to_string(),
            ..AppConfig::default()
        };
        config.normalize();
        assert_eq!(config.api_prefix, "/dofus3/v1");
        assert!(config.github_token.is_none());
        assert_eq!(config.bonus_listing_url, "https://api.dofusdu.de/dofus2");
    }

    #[test]
    fn validate_rejects_bad_values() {
        let config = AppConfig {
            server_tz: "Mars/Olympus".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            task_poll_interval_ms: 2000,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            meili_protocol: "tcp".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn load_from_file_resolves_database_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "database_path = \"data/almanax.db\"\nrelease_repo = \"dofus3-beta\"\n",
        )
        .expect("write config");

        let config = AppConfig::load_from(path.to_str().expect("utf8 path"))
            .await
            .expect("load");
        assert_eq!(
            config.database_path,
            dir.path().join("data/almanax.db").to_string_lossy()
        );
        assert_eq!(config.to_source_config().release_repo, "dofus3-beta");
    }
}
