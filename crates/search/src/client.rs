//! REST client for the Meilisearch HTTP API.
//!
//! Covers the handful of endpoints the project index needs: health, index
//! lookup/creation, settings, document writes and search. Write endpoints are
//! asynchronous on the Meilisearch side and answer with a [`TaskInfo`]; the
//! client does not wait for the task to be processed.

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// HTTP client for a single Meilisearch instance.
#[derive(Clone)]
pub struct MeiliSearchClient {
    client: reqwest::Client,
    host_url: String,
    api_key: Option<String>,
}

/// Summary of an enqueued Meilisearch task.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInfo {
    pub task_uid: u64,
    pub index_uid: Option<String>,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Index metadata as returned by `GET /indexes/{uid}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexInfo {
    pub uid: String,
    pub primary_key: Option<String>,
}

/// The subset of index settings the project index configures.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub searchable_attributes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filterable_attributes: Option<Vec<String>>,
}

/// Body of `POST /indexes/{uid}/search`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub q: String,
    pub limit: i64,
    pub offset: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// Search results in offset/limit mode.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse<T> {
    pub hits: Vec<T>,
    #[serde(default)]
    pub estimated_total_hits: i64,
}

impl MeiliSearchClient {
    /// Create a client for the instance at `host_url`, e.g. `http://localhost:7700`.
    ///
    /// `api_key` is sent as a bearer token when present.
    pub fn new(host_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self::with_client(reqwest::Client::new(), host_url, api_key)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        host_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            host_url: host_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// `GET /health`.
    pub async fn health(&self) -> Result<(), SearchError> {
        let response = self.request(Method::GET, "/health").send().await?;
        Self::check_status(response).await
    }

    /// `GET /indexes/{uid}`. Returns `None` when the index does not exist.
    pub async fn get_index(&self, uid: &str) -> Result<Option<IndexInfo>, SearchError> {
        let response = self
            .request(Method::GET, &format!("/indexes/{uid}"))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::parse_response(response).await.map(Some)
    }

    /// `POST /indexes`.
    pub async fn create_index(&self, uid: &str, primary_key: &str) -> Result<TaskInfo, SearchError> {
        let body = serde_json::json!({
            "uid": uid,
            "primaryKey": primary_key,
        });
        let response = self
            .request(Method::POST, "/indexes")
            .json(&body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `PATCH /indexes/{uid}/settings`.
    pub async fn update_settings(
        &self,
        uid: &str,
        settings: &IndexSettings,
    ) -> Result<TaskInfo, SearchError> {
        let response = self
            .request(Method::PATCH, &format!("/indexes/{uid}/settings"))
            .json(settings)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `POST /indexes/{uid}/documents`: add or replace whole documents.
    pub async fn add_documents<T: Serialize>(
        &self,
        uid: &str,
        documents: &[T],
        primary_key: &str,
    ) -> Result<TaskInfo, SearchError> {
        let response = self
            .request(Method::POST, &format!("/indexes/{uid}/documents"))
            .query(&[("primaryKey", primary_key)])
            .json(documents)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `PUT /indexes/{uid}/documents`: add or merge documents by primary key.
    pub async fn update_documents<T: Serialize>(
        &self,
        uid: &str,
        documents: &[T],
        primary_key: &str,
    ) -> Result<TaskInfo, SearchError> {
        let response = self
            .request(Method::PUT, &format!("/indexes/{uid}/documents"))
            .query(&[("primaryKey", primary_key)])
            .json(documents)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `DELETE /indexes/{uid}/documents/{id}`.
    pub async fn delete_document(&self, uid: &str, id: &str) -> Result<TaskInfo, SearchError> {
        let response = self
            .request(Method::DELETE, &format!("/indexes/{uid}/documents/{id}"))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `POST /indexes/{uid}/search`.
    pub async fn search<T: DeserializeOwned>(
        &self,
        uid: &str,
        request: &SearchRequest,
    ) -> Result<SearchResponse<T>, SearchError> {
        let response = self
            .request(Method::POST, &format!("/indexes/{uid}/search"))
            .json(request)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    // ---- private helpers ----

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.host_url, path));
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    /// Return the response unchanged on success, or a [`SearchError::Api`]
    /// carrying the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, SearchError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SearchError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, SearchError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn check_status(response: reqwest::Response) -> Result<(), SearchError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}
