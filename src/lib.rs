//! Trello board sync
//!
//! Mirrors a Trello board into an ordered node graph: the board, its cards,
//! their checklists and checklist items, with card attachments resolved to
//! cached local files.
//!
//! # Architecture
//!
//! - [`fetch`] - Board API client and the list/checklist join
//! - [`media`] - Attachment download and at-most-once resolution
//! - [`graph`] - Typed node construction and emission order
//! - [`sync`] - Run orchestration
//! - [`cache`] - Persistent key-value cache (SQLite)
//! - [`store`] - Node store port and adapters (JSONL, in-memory)
//! - [`model`] - API payloads, enriched entities, node types
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - Configuration management
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod cli;
pub mod config;
pub mod digest;
pub mod error;
pub mod fetch;
pub mod graph;
pub mod media;
pub mod model;
pub mod slug;
pub mod store;
pub mod sync;

pub use error::{Error, Result};
