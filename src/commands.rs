//! One-shot command implementations for the `qry` binary.
//!
//! Each `run_*` function builds a controller from the config, performs a
//! single operation, and prints the outcome to stdout. Failures come back
//! as `anyhow` errors so `main` can report them and exit non-zero.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::Arc;

use quarry_core::controller::SearchController;
use quarry_core::history::HistoryStore;
use quarry_core::models::IndexDocument;

use crate::config::Config;
use crate::history_file::FileSlot;
use crate::http::HttpSearchService;
use crate::render;
use crate::shell::{self, Console};

/// Wire the HTTP service and the file-backed history into a controller.
pub fn build_controller(cfg: &Config) -> Result<SearchController> {
    let service = HttpSearchService::new(&cfg.service)?;
    let history = open_history(cfg);
    Ok(SearchController::new(
        Arc::new(service),
        history,
        cfg.controller_settings(),
    ))
}

fn open_history(cfg: &Config) -> HistoryStore {
    let slot = FileSlot::new(cfg.history.resolved_path());
    HistoryStore::load(Box::new(slot), cfg.history.limit)
}

pub async fn run_search(cfg: &Config, query: &str, top_k: Option<usize>) -> Result<()> {
    let controller = build_controller(cfg)?;
    let top_k = top_k.unwrap_or(cfg.search.top_k);
    if top_k == 0 {
        bail!("--top-k must be >= 1");
    }

    match controller.execute(query, top_k).await {
        Ok(hits) => {
            print!("{}", render::results(&hits));
            Ok(())
        }
        Err(e) => bail!("{}", e.user_message()),
    }
}

pub async fn run_suggest(cfg: &Config, partial: &str) -> Result<()> {
    let controller = build_controller(cfg)?;
    let suggestions = controller.suggest(partial).await;
    if suggestions.is_empty() {
        println!("No suggestions.");
    } else {
        print!("{}", render::suggestions(&suggestions));
    }
    Ok(())
}

pub async fn run_stats(cfg: &Config) -> Result<()> {
    let controller = build_controller(cfg)?;
    match controller.refresh_stats().await {
        Some(stats) => {
            print!("{}", render::stats(Some(&stats)));
            Ok(())
        }
        None => bail!(
            "Could not fetch document stats from {}",
            cfg.service.base_url
        ),
    }
}

pub async fn run_index_samples(cfg: &Config) -> Result<()> {
    let controller = build_controller(cfg)?;
    let receipt = controller
        .index_samples()
        .await
        .context("Failed to index documents. Make sure the backend is running.")?;
    print!("{}", render::index_receipt(&receipt));
    print!("{}", render::stats(controller.view().stats.as_ref()));
    Ok(())
}

/// Index a JSON batch file of the form `[{"id": "...", "content": "..."}]`.
pub async fn run_index_file(cfg: &Config, path: &Path) -> Result<()> {
    let documents = read_batch(path)?;
    if documents.is_empty() {
        println!("No documents in {}", path.display());
        return Ok(());
    }

    let controller = build_controller(cfg)?;
    let receipt = controller
        .index_batch(&documents)
        .await
        .context("Failed to index documents. Make sure the backend is running.")?;
    print!("{}", render::index_receipt(&receipt));
    print!("{}", render::stats(controller.view().stats.as_ref()));
    Ok(())
}

fn read_batch(path: &Path) -> Result<Vec<IndexDocument>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch file: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of {{id, content}}", path.display()))
}

pub async fn run_upload(cfg: &Config, path: &Path) -> Result<()> {
    let controller = build_controller(cfg)?;
    controller.select_file(path);
    match controller.upload_file().await? {
        Some(receipt) => {
            println!("Document uploaded (id: {})", receipt.document_id);
            Ok(())
        }
        None => bail!("No file selected"),
    }
}

pub fn run_history(cfg: &Config) -> Result<()> {
    let history = open_history(cfg);
    print!("{}", render::history(history.entries()));
    Ok(())
}

pub async fn run_shell(cfg: &Config) -> Result<()> {
    let controller = Arc::new(build_controller(cfg)?);
    let interactive = atty::is(atty::Stream::Stdin);
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    shell::run(controller, stdin, Console::stdout(), interactive).await
}
