//! # Quarry
//!
//! A terminal client for a remote semantic search service.
//!
//! The interaction logic (query state, suggestion ordering, search history,
//! loading and error handling) lives in [`quarry_core`] and is independent of
//! any transport. This crate supplies the pieces that touch the outside
//! world: the HTTP client, the history file, configuration, and the
//! terminal front end.
//!
//! ```text
//! ┌──────────────┐    ┌──────────────────┐    ┌───────────────┐
//! │ qry / shell  │───▶│ SearchController │───▶│ HTTP service  │
//! │ (render)     │◀───│ ViewModel        │    │ /search ...   │
//! └──────────────┘    └────────┬─────────┘    └───────────────┘
//!                              ▼
//!                       history.json
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`http`] | `reqwest` implementation of the service contract |
//! | [`history_file`] | Durable storage for recent searches |
//! | [`commands`] | One-shot CLI commands |
//! | [`shell`] | Interactive session |
//! | [`render`] | Terminal output |
//! | [`logging`] | `tracing` subscriber setup |

pub mod commands;
pub mod config;
pub mod history_file;
pub mod http;
pub mod logging;
pub mod render;
pub mod shell;

pub use quarry_core;
