//! Reconciled client state.
//!
//! [`ViewModel`] is a plain value. Every transition goes through
//! [`ViewModel::apply`], which consumes the current value and returns the
//! next one; the controller swaps the result in under a lock. Nothing else
//! mutates it, so the ordering rules for concurrent remote calls live in
//! one place:
//!
//! - Each query edit bumps `suggestion_seq`. A suggestion response is
//!   applied only if it carries the latest sequence number and the panel is
//!   still open, so responses take effect in issue order.
//! - Starting a search closes the panel and bumps the sequence, so a
//!   suggestion response still in flight can never reopen it.
//! - `loading` tracks searches in flight and is released on every exit path.
//! - Search errors and index/upload notices are separate channels.

use crate::models::{
    DocumentStats, IndexReceipt, SearchHit, Suggestion, UploadCandidate, UploadReceipt,
};

/// Whether `partial` is long enough to ask the service for completions.
///
/// Length is counted in characters of the raw input.
pub fn is_suggestible(partial: &str, min_chars: usize) -> bool {
    partial.chars().count() >= min_chars
}

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Failure,
}

/// A user notification from the index/upload channel. Requires
/// acknowledgement and never touches the search error banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Failure,
            message: message.into(),
        }
    }
}

/// A state transition.
#[derive(Debug, Clone)]
pub enum Action {
    /// The query text changed.
    QueryEdited { text: String, min_chars: usize },
    /// A suggestion request tagged `seq` completed. Failures arrive as an
    /// empty list.
    SuggestionsResolved {
        seq: u64,
        suggestions: Vec<Suggestion>,
    },
    /// The user picked a suggestion; it becomes the query.
    SuggestionAccepted(String),
    /// The suggestion panel was closed without picking.
    SuggestionsDismissed,
    /// A search was submitted.
    SearchStarted,
    SearchSucceeded { query: String, hits: Vec<SearchHit> },
    SearchFailed { message: String },
    /// A search future was dropped before it produced an outcome.
    SearchAbandoned,
    HistoryChanged(Vec<String>),
    StatsRefreshed(DocumentStats),
    FileSelected(UploadCandidate),
    FileCleared,
    /// `candidate` is the selection the upload was started with; a newer
    /// selection made meanwhile is kept.
    UploadSucceeded {
        candidate: UploadCandidate,
        receipt: UploadReceipt,
    },
    UploadFailed { message: String },
    IndexSucceeded(IndexReceipt),
    IndexFailed { message: String },
    ErrorDismissed,
    NoticeDismissed,
}

#[derive(Debug, Clone, Default)]
pub struct ViewModel {
    pub query: String,
    pub suggestions: Vec<Suggestion>,
    pub suggestions_visible: bool,
    /// Sequence number of the most recently issued suggestion request.
    pub suggestion_seq: u64,
    pub history: Vec<String>,
    pub results: Vec<SearchHit>,
    /// Query that produced `results`.
    pub results_query: Option<String>,
    /// Searches currently in flight.
    pub searches_in_flight: usize,
    pub error: Option<String>,
    pub stats: Option<DocumentStats>,
    pub upload: Option<UploadCandidate>,
    pub notice: Option<Notice>,
}

impl ViewModel {
    /// Initial state seeded with persisted history.
    pub fn with_history(history: Vec<String>) -> Self {
        Self {
            history,
            ..Self::default()
        }
    }

    pub fn loading(&self) -> bool {
        self.searches_in_flight > 0
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        !self.loading() && !self.query.trim().is_empty()
    }

    /// Apply one transition, producing the next state.
    pub fn apply(mut self, action: Action) -> Self {
        match action {
            Action::QueryEdited { text, min_chars } => {
                self.suggestion_seq += 1;
                if is_suggestible(&text, min_chars) {
                    self.suggestions_visible = true;
                } else {
                    self.suggestions.clear();
                    self.suggestions_visible = false;
                }
                self.query = text;
            }
            Action::SuggestionsResolved { seq, suggestions } => {
                if seq == self.suggestion_seq && self.suggestions_visible {
                    self.suggestions = suggestions;
                }
            }
            Action::SuggestionAccepted(text) => {
                self.query = text;
                self.close_suggestions();
            }
            Action::SuggestionsDismissed => self.close_suggestions(),
            Action::SearchStarted => {
                self.searches_in_flight += 1;
                self.error = None;
                self.close_suggestions();
            }
            Action::SearchSucceeded { query, hits } => {
                self.finish_search();
                self.results = hits;
                self.results_query = Some(query);
            }
            Action::SearchFailed { message } => {
                self.finish_search();
                self.error = Some(message);
            }
            Action::SearchAbandoned => self.finish_search(),
            Action::HistoryChanged(history) => self.history = history,
            Action::StatsRefreshed(stats) => self.stats = Some(stats),
            Action::FileSelected(candidate) => self.upload = Some(candidate),
            Action::FileCleared => self.upload = None,
            Action::UploadSucceeded { candidate, receipt } => {
                if self.upload.as_ref() == Some(&candidate) {
                    self.upload = None;
                }
                self.notice = Some(Notice::info(format!(
                    "Document uploaded (id: {})",
                    receipt.document_id
                )));
            }
            Action::UploadFailed { message } => {
                self.notice = Some(Notice::failure(message));
            }
            Action::IndexSucceeded(receipt) => {
                let message = match receipt.count {
                    Some(n) => format!("Indexed {} document{}", n, if n == 1 { "" } else { "s" }),
                    None => "Documents indexed successfully".to_string(),
                };
                self.notice = Some(Notice::info(message));
            }
            Action::IndexFailed { message } => {
                self.notice = Some(Notice::failure(message));
            }
            Action::ErrorDismissed => self.error = None,
            Action::NoticeDismissed => self.notice = None,
        }
        self
    }

    fn close_suggestions(&mut self) {
        self.suggestion_seq += 1;
        self.suggestions.clear();
        self.suggestions_visible = false;
    }

    fn finish_search(&mut self) {
        self.searches_in_flight = self.searches_in_flight.saturating_sub(1);
    }
}
