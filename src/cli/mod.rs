//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// Trello board sync - mirror a board into an ordered node graph
#[derive(Parser, Debug)]
#[command(name = "trello-sync", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (default: ~/.trello-sync/config.json)
    #[arg(long, global = true, env = "TRELLO_SYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Media cache directory (default: ~/.trello-sync/cache)
    #[arg(long, global = true, env = "TRELLO_SYNC_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the board and emit its node graph
    Sync(SyncArgs),

    /// Inspect or reset the media cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },

    /// Show the effective configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Credentials and board selection shared by commands that talk to Trello.
#[derive(Args, Debug, Clone, Default)]
pub struct BoardArgs {
    /// Board id (or short link) to sync
    #[arg(long, env = "TRELLO_BOARD_ID")]
    pub board_id: Option<String>,

    /// Trello API key
    #[arg(long, env = "TRELLO_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Trello API token
    #[arg(long, env = "TRELLO_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Trello API base URL
    #[arg(long, env = "TRELLO_API_URL")]
    pub api_url: Option<String>,
}

#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub board: BoardArgs,

    /// Write node operations to this JSONL file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Run the pipeline but do not write node operations
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show cache entry count and disk usage
    Stats,

    /// Remove all cache entries and downloaded files
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the resolved configuration with secrets masked
    Show(BoardArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_sync_flags() {
        let cli = Cli::parse_from([
            "trello-sync",
            "sync",
            "--board-id",
            "b1",
            "--key",
            "k",
            "--token",
            "t",
            "--output",
            "nodes.jsonl",
            "-vv",
        ]);

        assert_eq!(cli.verbose, 2);
        let Commands::Sync(args) = cli.command else {
            panic!("expected sync command");
        };
        assert_eq!(args.board.board_id.as_deref(), Some("b1"));
        assert_eq!(args.output, Some(PathBuf::from("nodes.jsonl")));
        assert!(!args.dry_run);
    }
}
