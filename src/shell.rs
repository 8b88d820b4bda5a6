//! Interactive line-oriented session (`qry shell`).
//!
//! Each input line is one user action:
//!
//! | Input | Action |
//! |-------|--------|
//! | `?text` | set the query to `text` and fetch suggestions in the background |
//! | `:pick N` | accept suggestion `N` (1-based) |
//! | `:close` | hide the suggestion panel |
//! | `/search` | submit the current query |
//! | any other text | set the query and submit it |
//! | `:file <path>` / `:clear` | select / clear the upload candidate |
//! | `:upload` | upload the selected file |
//! | `:index` | index the built-in sample documents |
//! | `:stats` | refresh document stats |
//! | `:history` | list recent searches |
//! | `:show` | redraw the whole view |
//! | `:dismiss` / `:ack` | dismiss the search error / the notice |
//! | `:help`, `:quit` | |
//!
//! Every remote call (suggestions, search, upload, index, stats) runs as a
//! background task, so input keeps being read while it is in flight. The
//! controller drops late suggestion responses for an outdated query and
//! answers a second submit with "busy" while a search is loading. No failure
//! ends the session: it is reported and the prompt returns.

use std::io::Write;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinSet;

use quarry_core::controller::{SearchController, SubmitOutcome};
use quarry_core::view::ViewModel;

use crate::render;

const HELP: &str = "\
  ?text          suggest completions for text
  :pick N        use suggestion N as the query
  :close         hide suggestions
  /search        search for the current query
  <text>         search for text
  :file <path>   select a file to upload
  :clear         clear the selected file
  :upload        upload the selected file
  :index         index the sample documents
  :stats         refresh document stats
  :history       show recent searches
  :show          redraw the view
  :dismiss       dismiss the search error
  :ack           acknowledge the last notice
  :quit          leave the shell
";

/// One parsed input line.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Suggest(String),
    Pick(usize),
    CloseSuggestions,
    Submit,
    SearchFor(String),
    SelectFile(String),
    ClearFile,
    Upload,
    Index,
    Stats,
    History,
    Show,
    DismissError,
    DismissNotice,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

pub fn parse_line(line: &str) -> Command {
    let line = line.trim_end_matches(['\r', '\n']);
    if let Some(partial) = line.strip_prefix('?') {
        return Command::Suggest(partial.to_string());
    }
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    }
    if trimmed == "/search" {
        return Command::Submit;
    }
    let Some(rest) = trimmed.strip_prefix(':') else {
        return Command::SearchFor(trimmed.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    match name {
        "pick" => match arg.parse::<usize>() {
            Ok(n) if n >= 1 => Command::Pick(n),
            _ => Command::Invalid("usage: :pick N (N >= 1)".to_string()),
        },
        "close" => Command::CloseSuggestions,
        "file" if arg.is_empty() => Command::Invalid("usage: :file <path>".to_string()),
        "file" => Command::SelectFile(arg.to_string()),
        "clear" => Command::ClearFile,
        "upload" => Command::Upload,
        "index" => Command::Index,
        "stats" => Command::Stats,
        "history" => Command::History,
        "show" => Command::Show,
        "dismiss" => Command::DismissError,
        "ack" => Command::DismissNotice,
        "help" | "h" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => Command::Invalid(format!("unknown command ':{}' (try :help)", other)),
    }
}

/// Shared output sink; background tasks write to it too.
#[derive(Clone)]
pub struct Console {
    out: Arc<Mutex<dyn Write + Send>>,
}

impl Console {
    pub fn new(out: Arc<Mutex<dyn Write + Send>>) -> Self {
        Self { out }
    }

    pub fn stdout() -> Self {
        Self::new(Arc::new(Mutex::new(std::io::stdout())))
    }

    fn emit(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }

    fn line(&self, text: &str) {
        self.emit(&format!("{}\n", text));
    }
}

/// Run the session until `:quit` or end of input.
///
/// Background tasks still in flight are awaited before returning.
pub async fn run<R>(
    controller: Arc<SearchController>,
    input: R,
    console: Console,
    interactive: bool,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let view = controller.start().await;
    console.emit(&render::stats(view.stats.as_ref()));
    if interactive {
        console.line("Type :help for commands.");
    }

    let mut pending = JoinSet::new();
    let mut lines = input.lines();
    loop {
        if interactive {
            console.emit("qry> ");
        }
        let Some(line) = lines.next_line().await? else {
            break;
        };
        while pending.try_join_next().is_some() {}

        match parse_line(&line) {
            Command::Empty => {}
            Command::Quit => break,
            Command::Help => console.emit(HELP),
            Command::Invalid(msg) => console.line(&msg),
            Command::Suggest(partial) => {
                let controller = Arc::clone(&controller);
                let console = console.clone();
                pending.spawn(async move {
                    let suggestions = controller.suggest(&partial).await;
                    if !suggestions.is_empty() {
                        console.emit(&format!(
                            "Suggestions for \"{}\":\n{}",
                            partial,
                            render::suggestions(&suggestions)
                        ));
                    }
                });
            }
            Command::Pick(n) => {
                if controller.accept_suggestion(n - 1) {
                    console.line(&format!("Query: {}", controller.view().query));
                } else {
                    console.line(&format!("No suggestion {}.", n));
                }
            }
            Command::CloseSuggestions => controller.dismiss_suggestions(),
            Command::Submit => {
                let controller = Arc::clone(&controller);
                let console = console.clone();
                pending.spawn(async move {
                    report_search(&console, controller.submit().await);
                });
            }
            Command::SearchFor(text) => {
                let controller = Arc::clone(&controller);
                let console = console.clone();
                pending.spawn(async move {
                    report_search(&console, controller.submit_query(&text).await);
                });
            }
            Command::SelectFile(path) => {
                controller.select_file(path);
                if let Some(candidate) = controller.view().upload {
                    console.line(&format!("Selected file: {}", candidate.file_name()));
                }
            }
            Command::ClearFile => controller.clear_file(),
            Command::Upload => {
                if controller.view().upload.is_none() {
                    console.line("No file selected (use :file <path>).");
                    continue;
                }
                let controller = Arc::clone(&controller);
                let console = console.clone();
                pending.spawn(async move {
                    if let Ok(None) = controller.upload_file().await {
                        return;
                    }
                    report_notice(&console, &controller.view());
                });
            }
            Command::Index => {
                let controller = Arc::clone(&controller);
                let console = console.clone();
                pending.spawn(async move {
                    let _ = controller.index_samples().await;
                    report_notice(&console, &controller.view());
                });
            }
            Command::Stats => {
                let controller = Arc::clone(&controller);
                let console = console.clone();
                pending.spawn(async move {
                    let stats = controller.refresh_stats().await;
                    console.emit(&render::stats(stats.as_ref()));
                });
            }
            Command::History => console.emit(&render::history(&controller.view().history)),
            Command::Show => console.emit(&render::screen(&controller.view())),
            Command::DismissError => controller.dismiss_error(),
            Command::DismissNotice => controller.dismiss_notice(),
        }
    }

    while pending.join_next().await.is_some() {}
    Ok(())
}

fn report_search(console: &Console, outcome: SubmitOutcome) {
    match outcome {
        SubmitOutcome::Blank => console.line("Enter a search query."),
        SubmitOutcome::Busy => console.line("A search is already running."),
        SubmitOutcome::Completed(Ok(hits)) => console.emit(&render::results(&hits)),
        SubmitOutcome::Completed(Err(e)) => console.line(&e.user_message()),
    }
}

fn report_notice(console: &Console, view: &ViewModel) {
    if let Some(notice) = &view.notice {
        console.line(&notice.message);
    }
    console.emit(&render::stats(view.stats.as_ref()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quarry_core::controller::ControllerSettings;
    use quarry_core::error::{IndexError, SearchError, StatsError, SuggestionError, UploadError};
    use quarry_core::history::{HistoryStore, MemorySlot};
    use quarry_core::models::{
        DocumentStats, IndexDocument, IndexReceipt, SearchHit, SearchRequest, Suggestion,
        UploadCandidate, UploadReceipt,
    };
    use quarry_core::service::SearchService;
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Search answers only once a suggestion request has arrived, so a
    /// session that stops reading input during a search times out.
    #[derive(Default)]
    struct SuggestThenSearch {
        suggested: Notify,
    }

    #[async_trait]
    impl SearchService for SuggestThenSearch {
        async fn search(&self, _request: &SearchRequest) -> Result<Vec<SearchHit>, SearchError> {
            tokio::time::timeout(Duration::from_secs(2), self.suggested.notified())
                .await
                .map_err(|_| SearchError::Transport("timed out".into()))?;
            Ok(vec![SearchHit {
                id: "1".into(),
                score: 0.1,
                summary: "s".into(),
                content: "c".into(),
            }])
        }

        async fn suggestions(&self, partial: &str) -> Result<Vec<Suggestion>, SuggestionError> {
            self.suggested.notify_one();
            Ok(vec![Suggestion {
                query: format!("{} learning", partial),
            }])
        }

        async fn document_stats(&self) -> Result<DocumentStats, StatsError> {
            Ok(DocumentStats::new(0))
        }

        async fn index(&self, _documents: &[IndexDocument]) -> Result<IndexReceipt, IndexError> {
            Err(IndexError::Status(500))
        }

        async fn upload(&self, _candidate: &UploadCandidate) -> Result<UploadReceipt, UploadError> {
            Err(UploadError::Status(500))
        }
    }

    async fn run_script(script: &'static [u8]) -> (String, Arc<SearchController>) {
        let history = HistoryStore::load(Box::new(MemorySlot::new()), 10);
        let controller = Arc::new(SearchController::new(
            Arc::new(SuggestThenSearch::default()),
            history,
            ControllerSettings::default(),
        ));
        let buffer = Arc::new(Mutex::new(Vec::<u8>::new()));
        run(controller.clone(), script, Console::new(buffer.clone()), false)
            .await
            .unwrap();
        let out = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        (out, controller)
    }

    #[tokio::test]
    async fn input_is_read_while_a_search_is_pending() {
        let (out, controller) = run_script(b"AI\n?deep\n").await;
        assert!(out.contains("deep learning"), "{}", out);
        assert!(out.contains("#1  Relevance: 0.900"), "{}", out);

        let view = controller.view();
        assert!(view.error.is_none());
        assert!(!view.loading());
        assert_eq!(view.history, vec!["AI"]);
    }

    #[tokio::test]
    async fn second_search_while_loading_is_refused() {
        let (out, controller) = run_script(b"AI\nML\n?deep\n").await;
        assert!(out.contains("A search is already running."), "{}", out);
        assert!(out.contains("#1  Relevance: 0.900"), "{}", out);
        assert_eq!(controller.view().history, vec!["AI"]);
    }

    #[test]
    fn suggest_keeps_raw_text() {
        assert_eq!(parse_line("?ma"), Command::Suggest("ma".into()));
        assert_eq!(parse_line("? m"), Command::Suggest(" m".into()));
        assert_eq!(parse_line("?"), Command::Suggest(String::new()));
    }

    #[test]
    fn bare_text_searches() {
        assert_eq!(parse_line("  deep learning "), Command::SearchFor("deep learning".into()));
        assert_eq!(parse_line("/search"), Command::Submit);
        assert_eq!(parse_line("   "), Command::Empty);
    }

    #[test]
    fn colon_commands() {
        assert_eq!(parse_line(":pick 2"), Command::Pick(2));
        assert_eq!(parse_line(":file ./notes/a b.txt"), Command::SelectFile("./notes/a b.txt".into()));
        assert_eq!(parse_line(":q"), Command::Quit);
        assert_eq!(parse_line(":ack"), Command::DismissNotice);
    }

    #[test]
    fn bad_commands_are_reported() {
        assert!(matches!(parse_line(":pick 0"), Command::Invalid(_)));
        assert!(matches!(parse_line(":pick x"), Command::Invalid(_)));
        assert!(matches!(parse_line(":file"), Command::Invalid(_)));
        assert!(matches!(parse_line(":frobnicate"), Command::Invalid(_)));
    }
}
