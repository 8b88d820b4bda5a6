//! End-to-end tests against a stand-in search service.
//!
//! Each test starts a small `axum` server on a free port that speaks the
//! same HTTP contract as the real service, then drives
//! [`HttpSearchService`] through the [`SearchController`].

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use quarry::config::ServiceConfig;
use quarry::http::HttpSearchService;
use quarry::render;
use quarry::shell::{self, Console};
use quarry_core::controller::{ControllerSettings, SearchController};
use quarry_core::error::SearchError;
use quarry_core::history::{HistoryStore, MemorySlot};
use quarry_core::models::Suggestion;

// ─── Stand-in service ───────────────────────────────────────────────

#[derive(Default)]
struct StandIn {
    documents: Mutex<Vec<Value>>,
    searches: Mutex<Vec<Value>>,
    uploads: Mutex<Vec<(String, Vec<u8>)>>,
    fail_search: AtomicBool,
}

type Shared = Arc<StandIn>;

async fn search(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    state.searches.lock().unwrap().push(body.clone());
    if state.fail_search.load(Ordering::SeqCst) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(json!([
        {"id": "1", "score": 0.1, "summary": "s", "content": "c"}
    ])))
}

/// Partials starting with "slo" answer late, so an earlier request can
/// complete after a later one.
async fn suggestions(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let q = params.get("q").cloned().unwrap_or_default();
    if q.starts_with("slo") {
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    Json(json!([{ "query": format!("{} learning", q) }]))
}

async fn document_stats(State(state): State<Shared>) -> Json<Value> {
    let total = state.documents.lock().unwrap().len();
    Json(json!({ "total_documents": total, "index_size": 42 }))
}

async fn index(State(state): State<Shared>, Json(docs): Json<Vec<Value>>) -> Json<Value> {
    let count = docs.len();
    state.documents.lock().unwrap().extend(docs);
    Json(json!({ "status": "indexed", "count": count }))
}

async fn upload(
    State(state): State<Shared>,
    mut multipart: Multipart,
) -> Result<Json<Value>, StatusCode> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
        let mut uploads = state.uploads.lock().unwrap();
        uploads.push((name, bytes.to_vec()));
        state
            .documents
            .lock()
            .unwrap()
            .push(json!({ "id": format!("upload-{}", uploads.len()) }));
        return Ok(Json(json!({ "document_id": format!("upload-{}", uploads.len()) })));
    }
    Err(StatusCode::BAD_REQUEST)
}

fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn wait_for_server(port: u16) {
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
    }
    panic!("Stand-in service did not become ready within 5 seconds");
}

async fn start_stand_in() -> (Shared, String) {
    let state: Shared = Arc::new(StandIn::default());
    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", post(search))
        .route("/search-suggestions", get(suggestions))
        .route("/document-stats", get(document_stats))
        .route("/index", post(index))
        .route("/upload-document", post(upload))
        .with_state(state.clone());

    let port = find_free_port();
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    wait_for_server(port).await;
    (state, format!("http://127.0.0.1:{}", port))
}

fn controller_for(base_url: &str) -> (SearchController, Arc<MemorySlot>) {
    let service = HttpSearchService::new(&ServiceConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
    })
    .unwrap();
    let slot = Arc::new(MemorySlot::new());
    let history = HistoryStore::load(Box::new(slot.clone()), 10);
    let controller = SearchController::new(
        Arc::new(service),
        history,
        ControllerSettings::default(),
    );
    (controller, slot)
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn search_for_ai_shows_one_ranked_card() {
    let (state, url) = start_stand_in().await;
    let (controller, slot) = controller_for(&url);

    let hits = controller.execute("AI", 5).await.unwrap();
    assert_eq!(hits.len(), 1);

    let view = controller.view();
    assert!(!view.loading());
    assert_eq!(view.results_query.as_deref(), Some("AI"));
    let out = render::results(&view.results);
    assert!(out.contains("#1  Relevance: 0.900"), "{}", out);

    assert_eq!(view.history, vec!["AI".to_string()]);
    assert_eq!(slot.contents().as_deref(), Some(r#"["AI"]"#));

    let sent = state.searches.lock().unwrap().clone();
    assert_eq!(sent, vec![json!({ "query": "AI", "top_k": 5 })]);
}

#[tokio::test]
async fn non_200_search_is_reported_and_history_kept() {
    let (state, url) = start_stand_in().await;
    state.fail_search.store(true, Ordering::SeqCst);
    let (controller, _slot) = controller_for(&url);

    let err = controller.execute("neural nets", 5).await.unwrap_err();
    assert!(matches!(err, SearchError::Status(500)));

    let view = controller.view();
    assert!(!view.loading());
    assert!(view.results.is_empty());
    assert_eq!(
        view.error.as_deref(),
        Some("Search failed. Make sure the backend is running.")
    );
    assert_eq!(view.history, vec!["neural nets".to_string()]);
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let url = format!("http://127.0.0.1:{}", find_free_port());
    let (controller, _slot) = controller_for(&url);

    let err = controller.execute("AI", 5).await.unwrap_err();
    assert!(matches!(err, SearchError::Transport(_)));
    assert!(!controller.view().loading());
    assert!(controller.view().error.is_some());
}

#[tokio::test]
async fn late_suggestions_do_not_overwrite_newer_ones() {
    let (_state, url) = start_stand_in().await;
    let (controller, _slot) = controller_for(&url);

    let (slow, fast) = tokio::join!(controller.suggest("slo"), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        controller.suggest("fast").await
    });
    assert!(slow.is_empty(), "stale suggestions returned: {:?}", slow);
    assert_eq!(fast[0].query, "fast learning");

    let view = controller.view();
    assert_eq!(view.query, "fast");
    assert_eq!(
        view.suggestions,
        vec![Suggestion {
            query: "fast learning".to_string()
        }]
    );
}

#[tokio::test]
async fn indexing_samples_updates_stats() {
    let (state, url) = start_stand_in().await;
    let (controller, _slot) = controller_for(&url);

    let before = controller.start().await;
    assert_eq!(before.stats.as_ref().unwrap().total_documents, 0);

    let receipt = controller.index_samples().await.unwrap();
    assert_eq!(receipt.count, Some(5));
    assert_eq!(receipt.status.as_deref(), Some("indexed"));
    assert_eq!(state.documents.lock().unwrap().len(), 5);

    let view = controller.view();
    let stats = view.stats.unwrap();
    assert_eq!(stats.total_documents, 5);
    assert_eq!(stats.extra["index_size"], 42);
    assert_eq!(view.notice.unwrap().message, "Indexed 5 documents");
    assert!(view.error.is_none());
}

#[tokio::test]
async fn upload_sends_file_as_multipart() {
    let (state, url) = start_stand_in().await;
    let (controller, _slot) = controller_for(&url);

    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("notes.txt");
    std::fs::write(&path, "transformers and attention").unwrap();

    controller.select_file(&path);
    let receipt = controller.upload_file().await.unwrap().unwrap();
    assert_eq!(receipt.document_id, "upload-1");

    let uploads = state.uploads.lock().unwrap().clone();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].0, "notes.txt");
    assert_eq!(uploads[0].1, b"transformers and attention");

    let view = controller.view();
    assert!(view.upload.is_none());
    assert_eq!(view.stats.unwrap().total_documents, 1);
}

#[tokio::test]
async fn upload_of_missing_file_keeps_selection() {
    let (state, url) = start_stand_in().await;
    let (controller, _slot) = controller_for(&url);

    controller.select_file("/definitely/not/here.pdf");
    assert!(controller.upload_file().await.is_err());

    let view = controller.view();
    assert!(view.upload.is_some());
    assert!(view.notice.unwrap().message.contains("here.pdf"));
    assert!(state.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn shell_session_runs_scripted_input() {
    let (_state, url) = start_stand_in().await;
    let (controller, slot) = controller_for(&url);

    let input: &[u8] = b":index\nAI\n:frobnicate\n:quit\nnever reached\n";
    let buffer = Arc::new(Mutex::new(Vec::<u8>::new()));
    let console = Console::new(buffer.clone());

    shell::run(Arc::new(controller), input, console, false)
        .await
        .unwrap();

    let out = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    assert!(out.contains("Indexed 5 documents"), "{}", out);
    assert!(out.contains("#1  Relevance: 0.900"), "{}", out);
    assert!(out.contains("unknown command ':frobnicate'"), "{}", out);
    assert!(!out.contains("never reached"), "{}", out);
    assert!(!out.contains("qry> "));
    assert_eq!(slot.contents().as_deref(), Some(r#"["AI"]"#));
}
