//! Search interaction controller.
//!
//! [`SearchController`] owns the [`ViewModel`] and the [`HistoryStore`] and
//! drives the remote [`SearchService`]. All state changes are synchronous
//! reducer transitions; the only suspension points are the service calls,
//! and no lock is held across them, so any number of operations may be in
//! flight at once while typing and other actions stay responsive.
//!
//! # Flows
//!
//! | Operation | Remote call | State effect |
//! |-----------|-------------|--------------|
//! | [`suggest`](SearchController::suggest) | `suggestions` (skipped below `min_chars`) | latest-issued response wins |
//! | [`execute`](SearchController::execute) / [`submit`](SearchController::submit) | `search` | `loading`, results or error, history recorded up front |
//! | [`refresh_stats`](SearchController::refresh_stats) | `document_stats` | replace on success, keep on failure |
//! | [`index_batch`](SearchController::index_batch) | `index` | notice, then stats refresh |
//! | [`upload_file`](SearchController::upload_file) | `upload` | notice, clears candidate, stats refresh |

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::error::{IndexError, SearchError, UploadError};
use crate::history::HistoryStore;
use crate::models::{
    DocumentStats, IndexDocument, IndexReceipt, SearchHit, SearchRequest, Suggestion,
    UploadCandidate, UploadReceipt, DEFAULT_TOP_K,
};
use crate::samples::sample_documents;
use crate::service::SearchService;
use crate::view::{is_suggestible, Action, ViewModel};

/// Tunables taken from application config.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    /// Results requested by [`SearchController::submit`].
    pub top_k: usize,
    /// Shortest partial query that triggers a suggestion request.
    pub min_suggestion_chars: usize,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            min_suggestion_chars: 2,
        }
    }
}

/// Result of a user-initiated [`SearchController::submit`].
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The query was blank; nothing was sent.
    Blank,
    /// A search is already loading; the submit control is disabled.
    Busy,
    /// The search ran; the view holds either the new results or the error.
    Completed(Result<Vec<SearchHit>, SearchError>),
}

/// Apply `action` to the shared view and return a snapshot of the result.
fn transition(view: &Mutex<ViewModel>, action: Action) -> ViewModel {
    let mut guard = view.lock().unwrap_or_else(|e| e.into_inner());
    let next = std::mem::take(&mut *guard).apply(action);
    *guard = next.clone();
    next
}

/// Releases the `loading` flag if a search future is dropped before it
/// reports an outcome.
struct InFlight<'a> {
    view: &'a Mutex<ViewModel>,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn begin(view: &'a Mutex<ViewModel>) -> Self {
        transition(view, Action::SearchStarted);
        Self::adopt(view)
    }

    /// Guard a search whose `SearchStarted` was already applied.
    fn adopt(view: &'a Mutex<ViewModel>) -> Self {
        Self {
            view,
            settled: false,
        }
    }

    fn settle(mut self, action: Action) {
        self.settled = true;
        transition(self.view, action);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            debug!("search abandoned before completion");
            transition(self.view, Action::SearchAbandoned);
        }
    }
}

pub struct SearchController {
    service: Arc<dyn SearchService>,
    history: Mutex<HistoryStore>,
    view: Mutex<ViewModel>,
    settings: ControllerSettings,
}

impl SearchController {
    /// Create a controller whose initial view is seeded from `history`.
    pub fn new(
        service: Arc<dyn SearchService>,
        history: HistoryStore,
        settings: ControllerSettings,
    ) -> Self {
        let view = ViewModel::with_history(history.entries().to_vec());
        Self {
            service,
            history: Mutex::new(history),
            view: Mutex::new(view),
            settings,
        }
    }

    /// Snapshot of the current view.
    pub fn view(&self) -> ViewModel {
        self.view.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn dispatch(&self, action: Action) -> ViewModel {
        transition(&self.view, action)
    }

    /// Startup work: fetch the initial corpus stats.
    pub async fn start(&self) -> ViewModel {
        self.refresh_stats().await;
        self.view()
    }

    // ============ Suggestions ============

    /// Update the query text and fetch completions for it.
    ///
    /// Inputs shorter than `min_suggestion_chars` yield nothing and make no
    /// request. A response is applied only if no newer edit (or search)
    /// happened while it was in flight; a stale response yields an empty
    /// list, so the return value always matches the panel. Failures are
    /// logged and yield an empty list.
    pub async fn suggest(&self, partial: &str) -> Vec<Suggestion> {
        let issued = self.set_query(partial);
        if !is_suggestible(partial, self.settings.min_suggestion_chars) {
            return Vec::new();
        }

        let seq = issued.suggestion_seq;
        debug!(seq, partial, "fetching suggestions");
        let suggestions = match self.service.suggestions(partial).await {
            Ok(suggestions) => suggestions,
            Err(e) => {
                warn!("suggestions for {:?} unavailable: {}", partial, e);
                Vec::new()
            }
        };

        let applied = self.dispatch(Action::SuggestionsResolved { seq, suggestions });
        if applied.suggestion_seq != seq {
            debug!(
                seq,
                latest = applied.suggestion_seq,
                "discarded stale suggestions"
            );
            return Vec::new();
        }
        applied.suggestions
    }

    /// Replace the query text without fetching completions. Any suggestion
    /// request still in flight is invalidated.
    pub fn set_query(&self, text: &str) -> ViewModel {
        self.dispatch(Action::QueryEdited {
            text: text.to_string(),
            min_chars: self.settings.min_suggestion_chars,
        })
    }

    /// Make the suggestion at `index` the query. Returns `false` if there
    /// is no such suggestion.
    pub fn accept_suggestion(&self, index: usize) -> bool {
        let picked = self
            .view()
            .suggestions
            .get(index)
            .map(|s| s.query.clone());
        match picked {
            Some(query) => {
                self.dispatch(Action::SuggestionAccepted(query));
                true
            }
            None => false,
        }
    }

    pub fn dismiss_suggestions(&self) {
        self.dispatch(Action::SuggestionsDismissed);
    }

    // ============ Search ============

    /// Submit the current query, as the search button would.
    ///
    /// Refused while a search is loading or when the query is blank.
    pub async fn submit(&self) -> SubmitOutcome {
        self.submit_with(None).await
    }

    /// Replace the query with `text` and submit it in one step, so no other
    /// edit can slip in between.
    pub async fn submit_query(&self, text: &str) -> SubmitOutcome {
        self.submit_with(Some(text)).await
    }

    async fn submit_with(&self, text: Option<&str>) -> SubmitOutcome {
        // The check and `SearchStarted` share one lock: two concurrent
        // submits cannot both pass.
        let query = {
            let mut guard = self.view.lock().unwrap_or_else(|e| e.into_inner());
            let mut view = std::mem::take(&mut *guard);
            if let Some(text) = text {
                view = view.apply(Action::QueryEdited {
                    text: text.to_string(),
                    min_chars: self.settings.min_suggestion_chars,
                });
            }
            let outcome = if view.query.trim().is_empty() {
                Err(SubmitOutcome::Blank)
            } else if !view.can_submit() {
                Err(SubmitOutcome::Busy)
            } else {
                view = view.apply(Action::SearchStarted);
                Ok(view.query.trim().to_string())
            };
            *guard = view;
            match outcome {
                Ok(query) => query,
                Err(refused) => return refused,
            }
        };

        let in_flight = InFlight::adopt(&self.view);
        SubmitOutcome::Completed(self.run_search(in_flight, &query, self.settings.top_k).await)
    }

    /// Run a search for `query`.
    ///
    /// Blank queries are rejected with [`SearchError::EmptyQuery`] before any
    /// state change. Otherwise the trimmed query is recorded in history
    /// before the request is sent, so slow or failed searches still count.
    /// `loading` is released on success, failure, and when this future is
    /// dropped early.
    pub async fn execute(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let in_flight = InFlight::begin(&self.view);
        self.run_search(in_flight, query, top_k).await
    }

    async fn run_search(
        &self,
        in_flight: InFlight<'_>,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        self.record_history(query);

        let request = SearchRequest {
            query: query.to_string(),
            top_k,
        };
        info!(query, top_k, "searching");
        match self.service.search(&request).await {
            Ok(hits) => {
                info!(query, count = hits.len(), "search completed");
                in_flight.settle(Action::SearchSucceeded {
                    query: request.query,
                    hits: hits.clone(),
                });
                Ok(hits)
            }
            Err(e) => {
                warn!("search for {:?} failed: {}", query, e);
                in_flight.settle(Action::SearchFailed {
                    message: e.user_message(),
                });
                Err(e)
            }
        }
    }

    fn record_history(&self, query: &str) {
        let recorded = self
            .history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .record(query);
        match recorded {
            Ok(entries) => {
                self.dispatch(Action::HistoryChanged(entries));
            }
            Err(e) => warn!("history not updated: {}", e),
        }
    }

    pub fn dismiss_error(&self) {
        self.dispatch(Action::ErrorDismissed);
    }

    // ============ Stats ============

    /// Fetch a fresh corpus snapshot.
    ///
    /// On failure the previous snapshot stays in place and is returned.
    pub async fn refresh_stats(&self) -> Option<DocumentStats> {
        match self.service.document_stats().await {
            Ok(stats) => {
                debug!(total = stats.total_documents, "stats refreshed");
                self.dispatch(Action::StatsRefreshed(stats)).stats
            }
            Err(e) => {
                warn!("stats refresh failed, keeping previous snapshot: {}", e);
                self.view().stats
            }
        }
    }

    // ============ Index / Upload ============

    /// Submit a batch of documents for indexing.
    ///
    /// Success and failure both raise a notice; success also refreshes
    /// stats. The search error banner is never touched.
    pub async fn index_batch(
        &self,
        documents: &[IndexDocument],
    ) -> Result<IndexReceipt, IndexError> {
        info!(count = documents.len(), "indexing documents");
        match self.service.index(documents).await {
            Ok(receipt) => {
                self.dispatch(Action::IndexSucceeded(receipt.clone()));
                self.refresh_stats().await;
                Ok(receipt)
            }
            Err(e) => {
                warn!("indexing failed: {}", e);
                self.dispatch(Action::IndexFailed {
                    message: "Failed to index documents. Make sure the backend is running."
                        .to_string(),
                });
                Err(e)
            }
        }
    }

    /// Index the built-in sample batch.
    pub async fn index_samples(&self) -> Result<IndexReceipt, IndexError> {
        self.index_batch(&sample_documents()).await
    }

    /// Select the file to upload, replacing any earlier selection.
    pub fn select_file(&self, path: impl Into<PathBuf>) {
        self.dispatch(Action::FileSelected(UploadCandidate::new(path)));
    }

    pub fn clear_file(&self) {
        self.dispatch(Action::FileCleared);
    }

    /// Upload the selected file.
    ///
    /// Returns `Ok(None)` without any request when nothing is selected. On
    /// success the selection is cleared (unless it changed meanwhile) and
    /// stats are refreshed; on failure the selection stays for a retry.
    pub async fn upload_file(&self) -> Result<Option<UploadReceipt>, UploadError> {
        let candidate = match self.view().upload {
            Some(candidate) => candidate,
            None => return Ok(None),
        };

        info!(path = %candidate.path.display(), "uploading document");
        match self.service.upload(&candidate).await {
            Ok(receipt) => {
                self.dispatch(Action::UploadSucceeded {
                    candidate,
                    receipt: receipt.clone(),
                });
                self.refresh_stats().await;
                Ok(Some(receipt))
            }
            Err(e) => {
                warn!("upload of {} failed: {}", candidate.path.display(), e);
                self.dispatch(Action::UploadFailed {
                    message: format!("Failed to upload {}: {}", candidate.file_name(), e),
                });
                Err(e)
            }
        }
    }

    pub fn dismiss_notice(&self) {
        self.dispatch(Action::NoticeDismissed);
    }
}
