//! Configuration parsing and validation.
//!
//! Quarry reads a TOML file (default `./config/quarry.toml`):
//!
//! ```toml
//! [service]
//! base_url = "http://localhost:8000"
//! timeout_secs = 30
//!
//! [search]
//! top_k = 5
//!
//! [suggestions]
//! min_chars = 2
//!
//! [history]
//! path = "~/.local/share/quarry/history.json"
//! limit = 10
//! ```
//!
//! Only `[service].base_url` is required. When no file exists at the
//! default location, [`Config::minimal`] is used instead.

use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};
use quarry_core::controller::ControllerSettings;
use quarry_core::history::DEFAULT_HISTORY_LIMIT;
use quarry_core::models::DEFAULT_TOP_K;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub suggestions: SuggestionsConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
        }
    }
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

#[derive(Debug, Deserialize, Clone)]
pub struct SuggestionsConfig {
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,
}

impl Default for SuggestionsConfig {
    fn default() -> Self {
        Self {
            min_chars: default_min_chars(),
        }
    }
}

fn default_min_chars() -> usize {
    2
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    /// History file. Defaults to the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_history_limit")]
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: None,
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

impl HistoryConfig {
    /// Where the history file lives, with a leading `~/` expanded.
    pub fn resolved_path(&self) -> PathBuf {
        match &self.path {
            Some(path) => expand_home(path),
            None => ProjectDirs::from("", "", "quarry")
                .map(|dirs| dirs.data_dir().join("history.json"))
                .unwrap_or_else(|| PathBuf::from(".quarry/history.json")),
        }
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), BaseDirs::new()) {
        (Ok(rest), Some(dirs)) => dirs.home_dir().join(rest),
        _ => path.to_path_buf(),
    }
}

impl Config {
    /// Defaults for a service on `http://localhost:8000`.
    pub fn minimal() -> Self {
        Self {
            service: ServiceConfig {
                base_url: "http://localhost:8000".to_string(),
                timeout_secs: default_timeout_secs(),
            },
            search: SearchConfig::default(),
            suggestions: SuggestionsConfig::default(),
            history: HistoryConfig::default(),
        }
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            top_k: self.search.top_k,
            min_suggestion_chars: self.suggestions.min_chars,
        }
    }

    fn validate(&self) -> Result<()> {
        let url = self.service.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            anyhow::bail!(
                "service.base_url must start with http:// or https:// (got '{}')",
                self.service.base_url
            );
        }
        if self.service.timeout_secs == 0 {
            anyhow::bail!("service.timeout_secs must be >= 1");
        }
        if self.search.top_k == 0 {
            anyhow::bail!("search.top_k must be >= 1");
        }
        if self.suggestions.min_chars == 0 {
            anyhow::bail!("suggestions.min_chars must be >= 1");
        }
        if self.history.limit == 0 {
            anyhow::bail!("history.limit must be >= 1");
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_file_fills_defaults() {
        let cfg = parse_config("[service]\nbase_url = \"http://search.local:8000\"\n").unwrap();
        assert_eq!(cfg.service.timeout_secs, 30);
        assert_eq!(cfg.search.top_k, 5);
        assert_eq!(cfg.suggestions.min_chars, 2);
        assert_eq!(cfg.history.limit, 10);
        assert!(cfg.history.path.is_none());
    }

    #[test]
    fn rejects_non_http_url() {
        let err = parse_config("[service]\nbase_url = \"ftp://x\"\n").unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn rejects_zero_limits() {
        for section in [
            "[search]\ntop_k = 0",
            "[suggestions]\nmin_chars = 0",
            "[history]\nlimit = 0",
        ] {
            let text = format!("[service]\nbase_url = \"http://x\"\n{}\n", section);
            assert!(parse_config(&text).is_err(), "accepted: {}", section);
        }
    }

    #[test]
    fn missing_service_section_is_an_error() {
        assert!(parse_config("[search]\ntop_k = 3\n").is_err());
    }

    #[test]
    fn explicit_history_path_is_used() {
        let cfg = parse_config(
            "[service]\nbase_url = \"http://x\"\n[history]\npath = \"/tmp/q/history.json\"\n",
        )
        .unwrap();
        assert_eq!(
            cfg.history.resolved_path(),
            PathBuf::from("/tmp/q/history.json")
        );
    }

    #[test]
    fn example_config_parses() {
        let cfg = parse_config(include_str!("../config/quarry.example.toml")).unwrap();
        assert_eq!(cfg.service.base_url, "http://localhost:8000");
        assert_eq!(cfg.history.limit, 10);
    }

    #[test]
    fn minimal_is_valid() {
        let cfg = Config::minimal();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.controller_settings().top_k, 5);
    }
}
