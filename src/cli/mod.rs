//! CLI module for scenebase
//!
//! Provides command-line interface for:
//! - init: Create directories and a default configuration file
//! - start: Boot the server and enter the serving loop

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{init, run_command, start};
pub use errors::{CliError, CliResult};

/// Parse arguments and dispatch. Entry point called from `main`.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli)
}
