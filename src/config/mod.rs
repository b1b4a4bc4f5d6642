//! Configuration management.
//!
//! Settings come from three layers, highest priority first:
//!
//! 1. CLI flags
//! 2. Environment variables (`TRELLO_KEY`, `TRELLO_TOKEN`, `TRELLO_BOARD_ID`,
//!    `TRELLO_API_URL`, `TRELLO_SYNC_CACHE_DIR`), bound by clap
//! 3. The config file, `~/.trello-sync/config.json` by default
//!
//! The media cache (SQLite database plus downloaded files) lives in
//! `~/.trello-sync/cache` unless overridden.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::fetch::DEFAULT_API_URL;

/// Name of the SQLite cache database inside the cache directory.
pub const CACHE_DB_FILE: &str = "cache.db";

/// Directory for downloaded media inside the cache directory.
pub const FILES_DIR: &str = "files";

/// Contents of the config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub key: Option<String>,
    pub token: Option<String>,
    pub board_id: Option<String>,
    pub api_url: Option<String>,
    pub cache_dir: Option<PathBuf>,
}

/// Fully resolved settings for a sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub key: String,
    pub token: String,
    pub board_id: String,
    pub api_url: String,
    pub cache_dir: PathBuf,
}

impl SyncSettings {
    /// Path of the SQLite cache database.
    #[must_use]
    pub fn cache_db_path(&self) -> PathBuf {
        self.cache_dir.join(CACHE_DB_FILE)
    }

    /// Directory downloaded media is written to.
    #[must_use]
    pub fn files_dir(&self) -> PathBuf {
        self.cache_dir.join(FILES_DIR)
    }
}

/// The global `~/.trello-sync` directory.
#[must_use]
pub fn global_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".trello-sync"))
}

/// Default config file location.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    global_dir().map(|dir| dir.join("config.json"))
}

/// Load the config file at `path`. A missing file is an empty config.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;

    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {e}", path.display())))
}

/// Load the config file from an explicit path or the default location.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config_or_default(explicit: Option<&Path>) -> Result<FileConfig> {
    match explicit.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => load_config(&path),
        None => Ok(FileConfig::default()),
    }
}

/// Resolve the cache directory.
///
/// Priority: explicit flag/env, then config file, then `~/.trello-sync/cache`.
///
/// # Errors
///
/// Returns `NoCacheDir` if no home directory can be determined.
pub fn resolve_cache_dir(explicit: Option<&Path>, file: &FileConfig) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = &file.cache_dir {
        return Ok(dir.clone());
    }
    global_dir()
        .map(|dir| dir.join("cache"))
        .ok_or(Error::NoCacheDir)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Board ids and short links are ASCII letters, digits, `-` and `_`. The id
/// becomes a URL path segment, so anything else is rejected.
fn validate_board_id(board_id: &str) -> Result<()> {
    if board_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "board id `{board_id}` may only contain letters, digits, `-` and `_`"
        )))
    }
}

/// Merge overrides over the config file into complete settings.
///
/// # Errors
///
/// Returns `MissingCredential` when the key, token or board id is set
/// nowhere, `InvalidArgument` for a malformed board id, or `NoCacheDir`
/// when no cache directory can be determined.
pub fn resolve_settings(overrides: Overrides, file: FileConfig) -> Result<SyncSettings> {
    let cache_dir = resolve_cache_dir(overrides.cache_dir.as_deref(), &file)?;

    let key = non_empty(overrides.key)
        .or_else(|| non_empty(file.key))
        .ok_or(Error::MissingCredential {
            field: "key",
            flag: "key",
            env: "TRELLO_KEY",
        })?;

    let token = non_empty(overrides.token)
        .or_else(|| non_empty(file.token))
        .ok_or(Error::MissingCredential {
            field: "token",
            flag: "token",
            env: "TRELLO_TOKEN",
        })?;

    let board_id = non_empty(overrides.board_id)
        .or_else(|| non_empty(file.board_id))
        .ok_or(Error::MissingCredential {
            field: "board id",
            flag: "board-id",
            env: "TRELLO_BOARD_ID",
        })?;
    validate_board_id(&board_id)?;

    let api_url = non_empty(overrides.api_url)
        .or_else(|| non_empty(file.api_url))
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    Ok(SyncSettings {
        key,
        token,
        board_id,
        api_url,
        cache_dir,
    })
}

/// Mask a secret for display, keeping the last four characters.
#[must_use]
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{visible}", "*".repeat(chars.len() - 4))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_overrides() -> Overrides {
        Overrides {
            key: Some("cli-key".into()),
            token: Some("cli-token".into()),
            board_id: Some("cli-board".into()),
            api_url: None,
            cache_dir: Some(PathBuf::from("/tmp/tbs-cache")),
        }
    }

    #[test]
    fn test_overrides_win_over_file() {
        let file = FileConfig {
            key: Some("file-key".into()),
            token: Some("file-token".into()),
            board_id: Some("file-board".into()),
            api_url: Some("http://file".into()),
            cache_dir: Some(PathBuf::from("/file/cache")),
        };

        let settings = resolve_settings(full_overrides(), file).unwrap();

        assert_eq!(settings.key, "cli-key");
        assert_eq!(settings.board_id, "cli-board");
        assert_eq!(settings.api_url, "http://file");
        assert_eq!(settings.cache_dir, PathBuf::from("/tmp/tbs-cache"));
        assert_eq!(settings.cache_db_path(), PathBuf::from("/tmp/tbs-cache/cache.db"));
        assert_eq!(settings.files_dir(), PathBuf::from("/tmp/tbs-cache/files"));
    }

    #[test]
    fn test_file_fills_gaps() {
        let overrides = Overrides {
            token: None,
            ..full_overrides()
        };
        let file = FileConfig {
            token: Some("file-token".into()),
            ..FileConfig::default()
        };

        let settings = resolve_settings(overrides, file).unwrap();

        assert_eq!(settings.token, "file-token");
        assert_eq!(settings.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_missing_token_is_error() {
        let overrides = Overrides {
            token: Some("   ".into()),
            ..full_overrides()
        };

        let err = resolve_settings(overrides, FileConfig::default()).unwrap_err();

        assert!(matches!(err, Error::MissingCredential { field: "token", .. }));
    }

    #[test]
    fn test_board_id_is_trimmed() {
        let overrides = Overrides {
            board_id: Some("  5e8f0c1a  ".into()),
            ..full_overrides()
        };

        let settings = resolve_settings(overrides, FileConfig::default()).unwrap();

        assert_eq!(settings.board_id, "5e8f0c1a");
    }

    #[test]
    fn test_malformed_board_id_is_invalid_argument() {
        for bad in ["abc/../members", "board id", "b?x=1"] {
            let overrides = Overrides {
                board_id: Some(bad.into()),
                ..full_overrides()
            };

            let err = resolve_settings(overrides, FileConfig::default()).unwrap_err();

            assert!(matches!(err, Error::InvalidArgument(_)), "{bad}");
            assert_eq!(err.exit_code(), 4);
        }
    }

    #[test]
    fn test_load_missing_config_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"key":"k","board_id":"b"}"#).unwrap();

        let config = load_config(&path).unwrap();

        assert_eq!(config.key.as_deref(), Some("k"));
        assert_eq!(config.board_id.as_deref(), Some("b"));
        assert!(config.token.is_none());
    }

    #[test]
    fn test_load_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(load_config(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("abcdefgh"), "****efgh");
        assert_eq!(mask_secret("abc"), "***");
        assert_eq!(mask_secret(""), "");
    }
}
