//! Data models exchanged with the remote search service and rendered by
//! the client.
//!
//! Wire shapes follow the service's JSON contracts. Everything here is a
//! plain value: the [`ViewModel`](crate::view::ViewModel) owns the copies
//! used for rendering and replaces them wholesale on every refresh.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Body of `POST /search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Trimmed, non-empty query text.
    pub query: String,
    /// Number of results requested.
    pub top_k: usize,
}

/// Default `top_k` when neither config nor caller overrides it.
pub const DEFAULT_TOP_K: usize = 5;

/// One ranked item of a search response.
///
/// Ordering of a `Vec<SearchHit>` is authoritative as returned by the
/// service and is never re-sorted on the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Document identifier.
    pub id: String,
    /// Distance to the query; lower is more relevant.
    pub score: f64,
    /// Query-aware summary generated by the service.
    #[serde(default)]
    pub summary: String,
    /// Source content of the document.
    #[serde(default)]
    pub content: String,
}

impl SearchHit {
    /// Relevance shown to the user: `1 - distance`.
    pub fn relevance(&self) -> f64 {
        1.0 - self.score
    }

    /// Relevance formatted to three decimal places, e.g. `"0.900"`.
    pub fn relevance_label(&self) -> String {
        format!("{:.3}", self.relevance())
    }
}

/// 1-based rank label for the hit at `index` in a result list, e.g. `"#1"`.
pub fn rank_label(index: usize) -> String {
    format!("#{}", index + 1)
}

/// A candidate completion for the current partial query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub query: String,
}

/// Corpus snapshot returned by `GET /document-stats`.
///
/// Always replaced on refresh, never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub total_documents: u64,
    /// Extra fields the service chose to report, kept verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
    /// When the client received this snapshot.
    #[serde(skip, default = "Utc::now")]
    pub fetched_at: DateTime<Utc>,
}

impl DocumentStats {
    pub fn new(total_documents: u64) -> Self {
        Self {
            total_documents,
            extra: serde_json::Map::new(),
            fetched_at: Utc::now(),
        }
    }
}

/// A document submitted through `POST /index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDocument {
    pub id: String,
    pub content: String,
}

impl IndexDocument {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

/// Response of `POST /index`. Both fields are optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexReceipt {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub count: Option<usize>,
}

/// The single file pending upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    pub path: PathBuf,
}

impl UploadCandidate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File name sent in the multipart part, falling back to `"upload"`.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string())
    }
}

/// Response of `POST /upload-document`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub document_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relevance_is_one_minus_distance() {
        let hit = SearchHit {
            id: "1".into(),
            score: 0.1,
            summary: "s".into(),
            content: "c".into(),
        };
        assert_eq!(hit.relevance_label(), "0.900");
        assert_eq!(rank_label(0), "#1");
    }

    #[test]
    fn stats_keep_unknown_fields() {
        let stats: DocumentStats =
            serde_json::from_str(r#"{"total_documents": 7, "collection": "documents"}"#).unwrap();
        assert_eq!(stats.total_documents, 7);
        assert_eq!(stats.extra["collection"], "documents");
    }

    #[test]
    fn index_receipt_tolerates_missing_fields() {
        let receipt: IndexReceipt = serde_json::from_str("{}").unwrap();
        assert_eq!(receipt, IndexReceipt::default());
    }

    #[test]
    fn candidate_file_name() {
        assert_eq!(UploadCandidate::new("/tmp/notes.txt").file_name(), "notes.txt");
        assert_eq!(UploadCandidate::new("/").file_name(), "upload");
    }
}
