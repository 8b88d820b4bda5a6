//! Recent-query history.
//!
//! History is a bounded, most-recent-first list of unique, non-empty
//! queries. The durable copy lives in a single named slot behind the
//! [`HistorySlot`] trait and holds the JSON-encoded list; the file-backed
//! slot lives in the application crate, [`MemorySlot`] is the in-memory
//! fake used by tests.
//!
//! [`HistoryStore::record`] encodes and persists the new list before
//! updating its in-memory copy, so after it returns both copies are equal.
//! A slot whose content is missing or cannot be decoded is treated as empty.

use std::sync::RwLock;

use anyhow::Result;
use tracing::warn;

use crate::error::HistoryError;

/// Maximum entries kept when no limit is configured.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// One named slot of durable storage for the encoded history list.
///
/// `save` must replace the slot atomically: a later `load` sees either
/// the previous content or the new content, never a partial write.
pub trait HistorySlot: Send + Sync {
    /// Read the slot. `Ok(None)` means nothing has been stored yet.
    fn load(&self) -> Result<Option<String>>;

    /// Replace the slot's content.
    fn save(&self, contents: &str) -> Result<()>;
}

/// Produce the history that results from submitting `query`.
///
/// `query` goes to the front, any earlier occurrence is removed, and the
/// list is cut to `limit`. Blank queries leave `entries` unchanged.
pub fn push_front(entries: &[String], query: &str, limit: usize) -> Vec<String> {
    let query = query.trim();
    if query.is_empty() {
        return entries.to_vec();
    }
    std::iter::once(query.to_string())
        .chain(entries.iter().filter(|e| e.as_str() != query).cloned())
        .take(limit)
        .collect()
}

/// Decode slot content, normalising anything a previous version or another
/// writer may have left behind. Returns `None` if the content is not a JSON
/// array of strings.
fn decode(raw: &str, limit: usize) -> Option<Vec<String>> {
    let stored: Vec<String> = serde_json::from_str(raw).ok()?;
    let mut entries: Vec<String> = Vec::with_capacity(stored.len().min(limit));
    for entry in stored {
        let entry = entry.trim();
        if entry.is_empty() || entries.iter().any(|e| e == entry) {
            continue;
        }
        entries.push(entry.to_string());
        if entries.len() == limit {
            break;
        }
    }
    Some(entries)
}

/// History backed by a [`HistorySlot`].
pub struct HistoryStore {
    slot: Box<dyn HistorySlot>,
    limit: usize,
    entries: Vec<String>,
}

impl HistoryStore {
    /// Read the persisted history.
    ///
    /// Never fails: unreadable or corrupt content is logged and treated as
    /// an empty history.
    pub fn load(slot: Box<dyn HistorySlot>, limit: usize) -> Self {
        let limit = limit.max(1);
        let entries = match slot.load() {
            Ok(Some(raw)) => decode(&raw, limit).unwrap_or_else(|| {
                warn!("stored history is not a list of queries; starting empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("failed to read history: {:#}", e);
                Vec::new()
            }
        };
        Self {
            slot,
            limit,
            entries,
        }
    }

    /// Current history, most recent first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Record a submitted query and persist the new history.
    ///
    /// Blank queries are a no-op returning the unchanged history. On a
    /// persistence failure the in-memory history is left as it was.
    pub fn record(&mut self, query: &str) -> Result<Vec<String>, HistoryError> {
        if query.trim().is_empty() {
            return Ok(self.entries.clone());
        }
        let next = push_front(&self.entries, query, self.limit);
        // Written even when unchanged: the slot may still hold content that
        // was normalised on load.
        let encoded = serde_json::to_string(&next)?;
        self.slot
            .save(&encoded)
            .map_err(|e| HistoryError::Persist(format!("{:#}", e)))?;
        self.entries = next.clone();
        Ok(next)
    }
}

/// In-memory [`HistorySlot`] for tests and embedders without a filesystem.
#[derive(Default)]
pub struct MemorySlot {
    contents: RwLock<Option<String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot pre-filled with raw content (which need not be valid JSON).
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: RwLock::new(Some(contents.into())),
        }
    }

    /// Raw content currently stored.
    pub fn contents(&self) -> Option<String> {
        self.contents
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl HistorySlot for MemorySlot {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.contents())
    }

    fn save(&self, contents: &str) -> Result<()> {
        *self.contents.write().unwrap_or_else(|e| e.into_inner()) = Some(contents.to_string());
        Ok(())
    }
}

impl<T: HistorySlot + ?Sized> HistorySlot for std::sync::Arc<T> {
    fn load(&self) -> Result<Option<String>> {
        (**self).load()
    }

    fn save(&self, contents: &str) -> Result<()> {
        (**self).save(contents)
    }
}
