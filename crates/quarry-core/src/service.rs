//! Contract of the remote search and indexing service.
//!
//! | Method | Endpoint |
//! |--------|----------|
//! | [`search`](SearchService::search) | `POST /search` |
//! | [`suggestions`](SearchService::suggestions) | `GET /search-suggestions?q=` |
//! | [`document_stats`](SearchService::document_stats) | `GET /document-stats` |
//! | [`index`](SearchService::index) | `POST /index` |
//! | [`upload`](SearchService::upload) | `POST /upload-document` (multipart) |
//!
//! The application crate implements this over HTTP; tests substitute
//! scripted fakes to control completion order.

use async_trait::async_trait;

use crate::error::{IndexError, SearchError, StatsError, SuggestionError, UploadError};
use crate::models::{
    DocumentStats, IndexDocument, IndexReceipt, SearchHit, SearchRequest, Suggestion,
    UploadCandidate, UploadReceipt,
};

#[async_trait]
pub trait SearchService: Send + Sync {
    /// Run a search. Hits come back in the service's ranking order.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>, SearchError>;

    /// Completions for a partial query.
    async fn suggestions(&self, partial: &str) -> Result<Vec<Suggestion>, SuggestionError>;

    /// Current corpus snapshot.
    async fn document_stats(&self) -> Result<DocumentStats, StatsError>;

    /// Submit a batch of documents for indexing.
    async fn index(&self, documents: &[IndexDocument]) -> Result<IndexReceipt, IndexError>;

    /// Upload one file as a multipart payload.
    async fn upload(&self, candidate: &UploadCandidate) -> Result<UploadReceipt, UploadError>;
}
