// Meilisearch REST client backing the bonus search indexes

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tokio::time::{sleep, Instant};
use tracing::debug;

use backend_domain::{
    AlmanaxBonusListingMeili, SearchConfig, SearchError, SearchErrorCode, SearchHits,
    SearchIndexService, TaskHandle, TaskOutcome,
};

use crate::utils::join_url;

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnqueuedTask {
    task_uid: u64,
}

#[derive(Debug, Deserialize)]
struct TaskView {
    status: String,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexStats {
    number_of_documents: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    hits: Vec<AlmanaxBonusListingMeili>,
    #[serde(default)]
    estimated_total_hits: u64,
}

pub struct MeiliSearchService {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    poll_interval: Duration,
}

impl MeiliSearchService {
    pub fn new(config: &SearchConfig, client: Client) -> Self {
        Self {
            client,
            base_url: config.meili_url.clone(),
            api_key: config.meili_key.clone(),
            poll_interval: Duration::from_millis(config.poll_interval_ms.max(1)),
        }
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, SearchError> {
        let response = self
            .request(builder)
            .send()
            .await
            .map_err(|err| SearchError::Transport(err.to_string()))?;
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(api_error(status, &body))
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, SearchError> {
        self.send(builder)
            .await?
            .json::<T>()
            .await
            .map_err(|err| SearchError::Decode(err.to_string()))
    }

    async fn enqueue(&self, builder: RequestBuilder) -> Result<TaskHandle, SearchError> {
        let task: EnqueuedTask = self.send_json(builder).await?;
        Ok(TaskHandle {
            task_uid: task.task_uid,
        })
    }
}

/// Turns a non-2xx reply into a typed error using the body's `code` field.
fn api_error(status: StatusCode, body: &str) -> SearchError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) if !parsed.code.is_empty() => SearchError::Api {
            code: SearchErrorCode::from_code(&parsed.code),
            message: parsed.message,
        },
        _ => SearchError::Api {
            code: SearchErrorCode::Other(format!("http_{}", status.as_u16())),
            message: body.to_string(),
        },
    }
}

/// `None` while the task is still queued or processing.
fn settled_outcome(task: TaskView) -> Option<TaskOutcome> {
    match task.status.as_str() {
        "succeeded" => Some(TaskOutcome::Succeeded),
        "failed" | "canceled" => {
            let (code, message) = match task.error {
                Some(err) => (SearchErrorCode::from_code(&err.code), err.message),
                None => (
                    SearchErrorCode::Other(format!("task_{}", task.status)),
                    format!("task {}", task.status),
                ),
            };
            Some(TaskOutcome::Failed { code, message })
        }
        _ => None,
    }
}

#[async_trait]
impl SearchIndexService for MeiliSearchService {
    async fn index_exists(&self, uid: &str) -> Result<bool, SearchError> {
        match self.send(self.client.get(self.url(&format!("indexes/{}", uid)))).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn create_index(&self, uid: &str, primary_key: &str) -> Result<TaskHandle, SearchError> {
        let builder = self
            .client
            .post(self.url("indexes"))
            .json(&json!({ "uid": uid, "primaryKey": primary_key }));
        self.enqueue(builder).await
    }

    async fn delete_all_documents(&self, uid: &str) -> Result<TaskHandle, SearchError> {
        let builder = self
            .client
            .delete(self.url(&format!("indexes/{}/documents", uid)));
        self.enqueue(builder).await
    }

    async fn add_documents(
        &self,
        uid: &str,
        documents: &[AlmanaxBonusListingMeili],
    ) -> Result<TaskHandle, SearchError> {
        let builder = self
            .client
            .post(self.url(&format!("indexes/{}/documents", uid)))
            .query(&[("primaryKey", "id")])
            .json(documents);
        self.enqueue(builder).await
    }

    async fn document_count(&self, uid: &str) -> Result<u64, SearchError> {
        let stats: IndexStats = self
            .send_json(self.client.get(self.url(&format!("indexes/{}/stats", uid))))
            .await?;
        Ok(stats.number_of_documents)
    }

    async fn search(&self, uid: &str, query: &str, limit: u32) -> Result<SearchHits, SearchError> {
        let builder = self
            .client
            .post(self.url(&format!("indexes/{}/search", uid)))
            .json(&json!({ "q": query, "limit": limit }));
        let response: SearchResponse = self.send_json(builder).await?;
        Ok(SearchHits {
            hits: response.hits,
            estimated_total_hits: response.estimated_total_hits,
        })
    }

    async fn wait_for_task(
        &self,
        task: TaskHandle,
        timeout: Duration,
    ) -> Result<TaskOutcome, SearchError> {
        let started = Instant::now();
        let url = self.url(&format!("tasks/{}", task.task_uid));
        loop {
            let view: TaskView = self.send_json(self.client.get(&url)).await?;
            if let Some(outcome) = settled_outcome(view) {
                debug!(task = task.task_uid, elapsed_ms = started.elapsed().as_millis() as u64, "task settled");
                return Ok(outcome);
            }
            if started.elapsed() >= timeout {
                return Err(SearchError::TaskTimeout {
                    task_uid: task.task_uid,
                    waited: started.elapsed(),
                });
            }
            sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_reads_code_field() {
        let err = api_error(
            StatusCode::NOT_FOUND,
            r#"{"message":"Index `alm-bonuses-en` not found.","code":"index_not_found","type":"invalid_request","link":"https://docs.meilisearch.com/errors#index_not_found"}"#,
        );
        assert!(err.is_not_found());

        let err = api_error(StatusCode::BAD_GATEWAY, "upstream down");
        match err {
            SearchError::Api { code, message } => {
                assert_eq!(code, SearchErrorCode::Other("http_502".to_string()));
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn task_status_mapping() {
        let view: TaskView = serde_json::from_str(r#"{"uid":3,"status":"processing","error":null}"#)
            .expect("task");
        assert!(settled_outcome(view).is_none());

        let view: TaskView = serde_json::from_str(r#"{"uid":3,"status":"succeeded"}"#).expect("task");
        assert_eq!(settled_outcome(view), Some(TaskOutcome::Succeeded));

        let view: TaskView = serde_json::from_str(
            r#"{"uid":4,"status":"failed","error":{"message":"Index `alm-bonuses-fr` already exists.","code":"index_already_exists","type":"invalid_request"}}"#,
        )
        .expect("task");
        match settled_outcome(view) {
            Some(TaskOutcome::Failed { code, .. }) => {
                assert_eq!(code, SearchErrorCode::IndexAlreadyExists)
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        let view: TaskView = serde_json::from_str(r#"{"uid":5,"status":"canceled"}"#).expect("task");
        assert!(matches!(settled_outcome(view), Some(TaskOutcome::Failed { .. })));
    }

    #[test]
    fn enqueued_task_uses_camel_case() {
        let task: EnqueuedTask = serde_json::from_str(
            r#"{"taskUid":12,"indexUid":"alm-bonuses-en","status":"enqueued","type":"documentAdditionOrUpdate"}"#,
        )
        .expect("task");
        assert_eq!(task.task_uid, 12);
        let stats: IndexStats =
            serde_json::from_str(r#"{"numberOfDocuments":42,"isIndexing":false}"#).expect("stats");
        assert_eq!(stats.number_of_documents, 42);
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        let service = MeiliSearchService::new(
            &SearchConfig {
                meili_url: "http://127.0.0.1:9".to_string(),
                meili_key: Some("masterKey".to_string()),
                poll_interval_ms: 10,
            },
            Client::new(),
        );
        let err = service.index_exists("alm-bonuses-en").await.expect_err("no server");
        assert!(matches!(err, SearchError::Transport(_)));
    }
}
