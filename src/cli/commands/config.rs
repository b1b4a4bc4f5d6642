//! Config command implementation.

use serde::Serialize;
use std::path::Path;

use crate::cli::{BoardArgs, ConfigCommands};
use crate::config::{
    default_config_path, load_config_or_default, mask_secret, resolve_cache_dir, FileConfig,
};
use crate::error::Result;
use crate::fetch::DEFAULT_API_URL;

#[derive(Debug, Serialize)]
struct EffectiveConfig {
    config_file: Option<String>,
    board_id: Option<String>,
    key: Option<String>,
    token: Option<String>,
    api_url: String,
    cache_dir: String,
}

/// Execute config commands.
///
/// # Errors
///
/// Returns an error if the config file cannot be parsed or no cache
/// directory can be determined.
pub fn execute(
    command: &ConfigCommands,
    config_path: Option<&Path>,
    cache_dir: Option<&Path>,
    json: bool,
) -> Result<()> {
    match command {
        ConfigCommands::Show(args) => show(args, config_path, cache_dir, json),
    }
}

fn effective(args: &BoardArgs, file: FileConfig, cache_dir: String, config_file: Option<String>) -> EffectiveConfig {
    EffectiveConfig {
        config_file,
        board_id: args.board_id.clone().or(file.board_id),
        key: args.key.clone().or(file.key).map(|k| mask_secret(&k)),
        token: args.token.clone().or(file.token).map(|t| mask_secret(&t)),
        api_url: args
            .api_url
            .clone()
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        cache_dir,
    }
}

fn show(args: &BoardArgs, config_path: Option<&Path>, cache_dir: Option<&Path>, json: bool) -> Result<()> {
    let file = load_config_or_default(config_path)?;
    let dir = resolve_cache_dir(cache_dir, &file)?;
    let config_file = config_path
        .map(Path::to_path_buf)
        .or_else(default_config_path)
        .map(|p| p.display().to_string());

    let config = effective(args, file, dir.display().to_string(), config_file);

    if json {
        println!("{}", serde_json::to_string(&config)?);
        return Ok(());
    }

    let unset = "(not set)";
    println!("Config file: {}", config.config_file.as_deref().unwrap_or(unset));
    println!("Board id:    {}", config.board_id.as_deref().unwrap_or(unset));
    println!("API key:     {}", config.key.as_deref().unwrap_or(unset));
    println!("API token:   {}", config.token.as_deref().unwrap_or(unset));
    println!("API URL:     {}", config.api_url);
    println!("Cache dir:   {}", config.cache_dir);
    Ok(())
}
