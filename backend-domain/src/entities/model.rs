use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct BonusSearchQuery {
    pub query: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct AlmanaxRangeQuery {
    #[serde(rename = "range[start_date]")]
    pub start_date: Option<String>,
    #[serde(rename = "range[end_date]")]
    pub end_date: Option<String>,
    pub timezone: Option<String>,
    #[serde(rename = "filter[bonus.type]")]
    pub bonus_type: Option<String>,
    #[serde(rename = "query[bonus.name]")]
    pub bonus_name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AlmanaxUpdatePayload {
    pub id: i64,
    pub bonus_id: i64,
    pub tribute_id: i64,
    pub date: String,
    pub reward_kamas: i64,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub api_port: u16,
    pub api_scheme: String,
    pub api_hostname: String,
    pub api_prefix: String,
    pub server_tz: String,
    pub request_timeout_seconds: u64,
    pub index_task_timeout_ms: u64,
    pub document_task_timeout_ms: u64,
    pub task_poll_interval_ms: u64,
}

impl RuntimeConfig {
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.api_port)
    }

    pub fn public_base_url(&self) -> String {
        format!("{}://{}:{}", self.api_scheme, self.api_hostname, self.api_port)
    }

    pub fn task_timeouts(&self) -> TaskTimeouts {
        TaskTimeouts {
            index: Duration::from_millis(self.index_task_timeout_ms),
            documents: Duration::from_millis(self.document_task_timeout_ms),
        }
    }
}

/// Bounded waits for asynchronous index tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskTimeouts {
    pub index: Duration,
    pub documents: Duration,
}

impl Default for TaskTimeouts {
    fn default() -> Self {
        Self {
            index: Duration::from_millis(2000),
            documents: Duration::from_millis(5000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_path: String,
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub meili_url: String,
    pub meili_key: Option<String>,
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub bonus_listing_url: String,
    pub release_owner: String,
    pub release_repo: String,
    pub release_asset: String,
    pub github_token: Option<String>,
    pub request_timeout_seconds: u64,
}
