//! Error types for the Trello board sync.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=cache, 4=validation, 6=node store, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers
//!
//! Pipeline components (fetcher, media resolver) contain their own failures
//! and only log them. The variants here are what reaches the CLI boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Cache (exit 2)
    CacheError,

    // Validation (exit 4)
    InvalidArgument,

    // Node store (exit 6)
    StoreError,

    // Config (exit 7)
    ConfigError,
    MissingCredentials,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::CacheError => "CACHE_ERROR",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::StoreError => "STORE_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::MissingCredentials => "MISSING_CREDENTIALS",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::CacheError => 2,
            Self::InvalidArgument => 4,
            Self::StoreError => 6,
            Self::ConfigError | Self::MissingCredentials => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether retrying the same command may succeed.
    ///
    /// True for a busy or locked cache. Nothing retries on its own; this
    /// only informs the caller.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::CacheError)
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can reach the caller of a sync operation.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing {field}: pass --{flag} or set {env}")]
    MissingCredential {
        field: &'static str,
        flag: &'static str,
        env: &'static str,
    },

    #[error("Could not determine a cache directory")]
    NoCacheDir,

    #[error("Cache error: {0}")]
    Cache(#[from] rusqlite::Error),

    #[error("Node store error at {path}: {message}")]
    Store { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::MissingCredential { .. } => ErrorCode::MissingCredentials,
            Self::NoCacheDir | Self::Config(_) => ErrorCode::ConfigError,
            Self::Cache(_) => ErrorCode::CacheError,
            Self::Store { .. } => ErrorCode::StoreError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::MissingCredential { field, .. } => Some(format!(
                "Generate an API {field} at https://trello.com/app-key, \
                 or add it to ~/.trello-sync/config.json"
            )),
            Self::NoCacheDir => {
                Some("Pass --cache-dir or set TRELLO_SYNC_CACHE_DIR".to_string())
            }
            Self::Cache(_) => Some(
                "The media cache may be corrupt. Run `trello-sync cache clear` to reset it."
                    .to_string(),
            ),
            Self::Store { path, .. } => Some(format!(
                "Check that {} is writable and the disk is not full",
                path.display()
            )),
            Self::Io(_) | Self::Json(_) | Self::InvalidArgument(_) | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
