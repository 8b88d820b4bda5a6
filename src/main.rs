//! # Quarry CLI (`qry`)
//!
//! The `qry` binary is the terminal front end for a remote semantic search
//! service. It can run single operations or an interactive session.
//!
//! ## Usage
//!
//! ```bash
//! qry --config ./config/quarry.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `qry search "<query>"` | Search and print ranked results |
//! | `qry suggest "<partial>"` | Print query completions |
//! | `qry stats` | Print the number of indexed documents |
//! | `qry index-samples` | Index the built-in sample documents |
//! | `qry index <file.json>` | Index a batch of `{id, content}` documents |
//! | `qry upload <path>` | Upload one file for indexing |
//! | `qry history` | Show recent searches |
//! | `qry shell` | Interactive session |
//! | `qry completions <shell>` | Print a shell completion script |
//!
//! ## Examples
//!
//! ```bash
//! # Seed an empty service and search it
//! qry index-samples
//! qry search "neural networks" --top-k 3
//!
//! # Interactive session
//! qry shell
//! ```

use anyhow::{bail, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::{Path, PathBuf};
use tracing::debug;

use quarry::config::{self, Config};
use quarry::{commands, logging};

const DEFAULT_CONFIG: &str = "./config/quarry.toml";

/// Quarry, a terminal client for a semantic search service.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/quarry.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "qry",
    about = "Quarry, a terminal client for a semantic search service",
    version,
    long_about = "Quarry queries a remote semantic search service: ranked search with \
    relevance scores, query suggestions, recent-search history, corpus statistics, \
    and document indexing or upload."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/quarry.toml`. When that default file does not
    /// exist, built-in defaults for a service on `http://localhost:8000`
    /// are used.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Log debug diagnostics to stderr (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search indexed documents.
    ///
    /// The query is recorded in history before the request is sent.
    /// Results are printed in the order the service ranks them.
    Search {
        query: String,

        /// Number of results to request (defaults to `search.top_k`).
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Print completions for a partial query.
    Suggest { partial: String },

    /// Print document statistics.
    Stats,

    /// Index the five built-in sample documents.
    IndexSamples,

    /// Index documents from a JSON file (`[{"id": ..., "content": ...}]`).
    Index { file: PathBuf },

    /// Upload a file to be indexed by the service.
    Upload { path: PathBuf },

    /// Show recent searches, most recent first.
    History,

    /// Start an interactive session.
    Shell,

    /// Print a completion script for the given shell.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn resolve_config(path: &Path) -> Result<Config> {
    if path.exists() {
        return config::load_config(path);
    }
    if path == Path::new(DEFAULT_CONFIG) {
        debug!("no config at {}, using defaults", path.display());
        return Ok(Config::minimal());
    }
    bail!("Config file not found: {}", path.display())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    // Commands that don't require config
    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "qry", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = resolve_config(&cli.config)?;
    debug!(base_url = %cfg.service.base_url, "configuration loaded");

    match cli.command {
        Commands::Search { query, top_k } => {
            commands::run_search(&cfg, &query, top_k).await?;
        }
        Commands::Suggest { partial } => {
            commands::run_suggest(&cfg, &partial).await?;
        }
        Commands::Stats => {
            commands::run_stats(&cfg).await?;
        }
        Commands::IndexSamples => {
            commands::run_index_samples(&cfg).await?;
        }
        Commands::Index { file } => {
            commands::run_index_file(&cfg, &file).await?;
        }
        Commands::Upload { path } => {
            commands::run_upload(&cfg, &path).await?;
        }
        Commands::History => {
            commands::run_history(&cfg)?;
        }
        Commands::Shell => {
            commands::run_shell(&cfg).await?;
        }
        Commands::Completions { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
