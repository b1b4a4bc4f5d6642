//! Cache command implementations.

use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::cache::SqliteCache;
use crate::cli::CacheCommands;
use crate::config::{load_config_or_default, resolve_cache_dir, CACHE_DB_FILE, FILES_DIR};
use crate::error::Result;

#[derive(Debug, Serialize)]
struct CacheStats {
    cache_dir: String,
    entries: usize,
    files: usize,
    bytes: u64,
}

/// Execute cache commands.
///
/// # Errors
///
/// Returns an error if the cache directory cannot be resolved or the cache
/// database cannot be opened.
pub fn execute(
    command: &CacheCommands,
    config_path: Option<&Path>,
    cache_dir: Option<&Path>,
    json: bool,
) -> Result<()> {
    let file = load_config_or_default(config_path)?;
    let dir = resolve_cache_dir(cache_dir, &file)?;

    match command {
        CacheCommands::Stats => stats(&dir, json),
        CacheCommands::Clear => clear(&dir, json),
    }
}

/// Count regular files and their total size in `dir`.
fn dir_usage(dir: &Path) -> Result<(usize, u64)> {
    if !dir.exists() {
        return Ok((0, 0));
    }

    let mut files = 0;
    let mut bytes = 0;
    for entry in fs::read_dir(dir)? {
        let meta = entry?.metadata()?;
        if meta.is_file() {
            files += 1;
            bytes += meta.len();
        }
    }
    Ok((files, bytes))
}

fn stats(dir: &Path, json: bool) -> Result<()> {
    let db_path = dir.join(CACHE_DB_FILE);
    let entries = if db_path.exists() {
        SqliteCache::open(&db_path)?.len()?
    } else {
        0
    };
    let (files, bytes) = dir_usage(&dir.join(FILES_DIR))?;

    let stats = CacheStats {
        cache_dir: dir.display().to_string(),
        entries,
        files,
        bytes,
    };

    if json {
        println!("{}", serde_json::to_string(&stats)?);
    } else {
        println!("Cache: {}", stats.cache_dir);
        println!("  Entries: {}", stats.entries);
        println!("  Files:   {} ({} bytes)", stats.files, stats.bytes);
    }
    Ok(())
}

fn clear(dir: &Path, json: bool) -> Result<()> {
    let db_path = dir.join(CACHE_DB_FILE);
    let entries = if db_path.exists() {
        SqliteCache::open(&db_path)?.clear()?
    } else {
        0
    };

    let files_dir = dir.join(FILES_DIR);
    let (files, _) = dir_usage(&files_dir)?;
    if files_dir.exists() {
        fs::remove_dir_all(&files_dir)?;
    }

    if json {
        let output = serde_json::json!({
            "cleared_entries": entries,
            "removed_files": files,
        });
        println!("{output}");
    } else {
        println!("Cleared {entries} cache entries and {files} files");
    }
    Ok(())
}
