//! HTTP implementation of [`SearchService`].
//!
//! Talks to the remote search service with `reqwest`:
//!
//! | Call | Request |
//! |------|---------|
//! | search | `POST {base}/search` with `{"query", "top_k"}` |
//! | suggestions | `GET {base}/search-suggestions?q=<partial>` |
//! | document stats | `GET {base}/document-stats` |
//! | index | `POST {base}/index` with `[{"id", "content"}]` |
//! | upload | `POST {base}/upload-document`, multipart field `file` |
//!
//! Any non-2xx status is reported as the operation's `Status` error; the
//! response body is logged at debug level. No retries: every failure is
//! handed straight back to the controller, which decides how to degrade.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Response;
use std::time::Duration;
use tracing::debug;

use quarry_core::error::{IndexError, SearchError, StatsError, SuggestionError, UploadError};
use quarry_core::models::{
    DocumentStats, IndexDocument, IndexReceipt, SearchHit, SearchRequest, Suggestion,
    UploadCandidate, UploadReceipt,
};
use quarry_core::service::SearchService;

use crate::config::ServiceConfig;

pub struct HttpSearchService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSearchService {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Consume a failed response, logging its body, and return the status code.
async fn failed_status(endpoint: &str, response: Response) -> u16 {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    debug!(endpoint, %status, body = %body.trim(), "service returned an error");
    status.as_u16()
}

#[async_trait]
impl SearchService for HttpSearchService {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>, SearchError> {
        let response = self
            .client
            .post(self.url("/search"))
            .json(request)
            .send()
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SearchError::Status(failed_status("/search", response).await));
        }
        response
            .json::<Vec<SearchHit>>()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))
    }

    async fn suggestions(&self, partial: &str) -> Result<Vec<Suggestion>, SuggestionError> {
        let response = self
            .client
            .get(self.url("/search-suggestions"))
            .query(&[("q", partial)])
            .send()
            .await
            .map_err(|e| SuggestionError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SuggestionError::Status(
                failed_status("/search-suggestions", response).await,
            ));
        }
        response
            .json::<Vec<Suggestion>>()
            .await
            .map_err(|e| SuggestionError::Decode(e.to_string()))
    }

    async fn document_stats(&self) -> Result<DocumentStats, StatsError> {
        let response = self
            .client
            .get(self.url("/document-stats"))
            .send()
            .await
            .map_err(|e| StatsError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StatsError::Status(
                failed_status("/document-stats", response).await,
            ));
        }
        response
            .json::<DocumentStats>()
            .await
            .map_err(|e| StatsError::Decode(e.to_string()))
    }

    async fn index(&self, documents: &[IndexDocument]) -> Result<IndexReceipt, IndexError> {
        let response = self
            .client
            .post(self.url("/index"))
            .json(documents)
            .send()
            .await
            .map_err(|e| IndexError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IndexError::Status(failed_status("/index", response).await));
        }
        // The receipt is informational; an unexpected body still means success.
        let body = response.text().await.unwrap_or_default();
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    async fn upload(&self, candidate: &UploadCandidate) -> Result<UploadReceipt, UploadError> {
        let bytes = tokio::fs::read(&candidate.path)
            .await
            .map_err(|e| UploadError::Read {
                path: candidate.path.display().to_string(),
                reason: e.to_string(),
            })?;

        let part = reqwest::multipart::Part::bytes(bytes).file_name(candidate.file_name());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("/upload-document"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(UploadError::Status(
                failed_status("/upload-document", response).await,
            ));
        }
        response
            .json::<UploadReceipt>()
            .await
            .map_err(|e| UploadError::Decode(e.to_string()))
    }
}
