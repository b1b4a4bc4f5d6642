//! Command implementations.

pub mod cache;
pub mod completions;
pub mod config;
pub mod sync;
pub mod version;
