//! Terminal rendering of the view model.
//!
//! Every function returns a `String` so output can be asserted in tests;
//! callers decide whether it goes to stdout.

use chrono::{DateTime, Utc};
use std::fmt::Write;

use quarry_core::models::{rank_label, DocumentStats, IndexReceipt, SearchHit, Suggestion};
use quarry_core::view::{NoticeKind, ViewModel};

/// Result cards in service order: rank, relevance, summary, content.
pub fn results(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "No results.\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(out, "Search Results ({})", hits.len());
    let _ = writeln!(out);
    for (i, hit) in hits.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}  Relevance: {}  [{}]",
            rank_label(i),
            hit.relevance_label(),
            hit.id
        );
        let _ = writeln!(out, "    summary: {}", one_line(&hit.summary));
        let _ = writeln!(out, "    content: {}", one_line(&hit.content));
        let _ = writeln!(out);
    }
    out
}

pub fn suggestions(items: &[Suggestion]) -> String {
    let mut out = String::new();
    for (i, s) in items.iter().enumerate() {
        let _ = writeln!(out, "  {}) {}", i + 1, s.query);
    }
    out
}

pub fn history(entries: &[String]) -> String {
    if entries.is_empty() {
        return "No recent searches.\n".to_string();
    }
    let mut out = String::from("Recent searches:\n");
    for entry in entries {
        let _ = writeln!(out, "  {}", entry);
    }
    out
}

pub fn stats(stats: Option<&DocumentStats>) -> String {
    match stats {
        Some(s) => format!(
            "Documents: {}  (updated {})\n",
            s.total_documents,
            format_relative(s.fetched_at, Utc::now())
        ),
        None => "Documents: unknown\n".to_string(),
    }
}

pub fn index_receipt(receipt: &IndexReceipt) -> String {
    match (&receipt.status, receipt.count) {
        (Some(status), Some(count)) => format!("{}: {} document(s)\n", status, count),
        (None, Some(count)) => format!("indexed: {} document(s)\n", count),
        _ => "Documents indexed successfully.\n".to_string(),
    }
}

/// Full screen for the interactive shell: stats line, error banner,
/// notice, suggestion panel, pending upload, and results.
pub fn screen(view: &ViewModel) -> String {
    let mut out = stats(view.stats.as_ref());
    if let Some(error) = &view.error {
        let _ = writeln!(out, "! {}  (:dismiss to clear)", error);
    }
    if let Some(notice) = &view.notice {
        let tag = match notice.kind {
            NoticeKind::Info => "ok",
            NoticeKind::Failure => "failed",
        };
        let _ = writeln!(out, "[{}] {}  (:ack to acknowledge)", tag, notice.message);
    }
    if let Some(candidate) = &view.upload {
        let _ = writeln!(out, "Selected file: {}", candidate.path.display());
    }
    if view.loading() {
        let _ = writeln!(out, "Searching...");
    }
    if view.suggestions_visible && !view.suggestions.is_empty() {
        let _ = writeln!(out, "Suggestions:");
        out.push_str(&suggestions(&view.suggestions));
    }
    if !view.results.is_empty() {
        if let Some(query) = &view.results_query {
            let _ = writeln!(out, "Results for \"{}\":", query);
        }
        out.push_str(&results(&view.results));
    }
    out
}

fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Format a timestamp relative to `now` (e.g. "3 mins ago").
fn format_relative(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = (now - ts).num_seconds();
    if delta < 0 {
        return ts.format("%Y-%m-%d %H:%M").to_string();
    }
    if delta < 60 {
        "just now".to_string()
    } else if delta < 3600 {
        let mins = delta / 60;
        format!("{} min{} ago", mins, if mins == 1 { "" } else { "s" })
    } else if delta < 86400 {
        let hours = delta / 3600;
        format!("{} hour{} ago", hours, if hours == 1 { "" } else { "s" })
    } else {
        ts.format("%Y-%m-%d %H:%M").to_string()
    }
}
