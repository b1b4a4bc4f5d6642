//! Shell completions command implementation.

use clap::CommandFactory;
use clap_complete::generate;
use std::io;

use crate::cli::{Cli, Shell};
use crate::error::Result;

const BIN_NAME: &str = "trello-sync";

fn generator(shell: &Shell) -> clap_complete::Shell {
    match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    }
}

/// Write the completion script for `shell` to stdout.
///
/// # Errors
///
/// Never fails; returns `Result` to match the other commands.
pub fn execute(shell: &Shell) -> Result<()> {
    generate(generator(shell), &mut Cli::command(), BIN_NAME, &mut io::stdout());
    Ok(())
}
