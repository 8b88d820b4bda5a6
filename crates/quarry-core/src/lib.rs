//! # Quarry Core
//!
//! Runtime-free logic for the Quarry search client: data models, the
//! reducer-style view model, the persisted history rules, the remote
//! service trait, and the [`controller::SearchController`] that reconciles
//! concurrent remote calls into one consistent view.
//!
//! This crate contains no tokio, reqwest, or filesystem I/O. Transport and
//! persistence are injected through [`service::SearchService`] and
//! [`history::HistorySlot`].

pub mod controller;
pub mod error;
pub mod history;
pub mod models;
pub mod samples;
pub mod service;
pub mod view;
