//! CLI command implementations

use std::fs;
use std::path::Path;

use crate::config::ServerConfig;
use crate::http_server::HttpServer;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};

/// Dispatch a parsed command.
pub fn run_command(cli: Cli) -> CliResult<()> {
    match cli.command {
        Command::Init { config } => init(&config),
        Command::Start { config } => start(&config),
    }
}

/// Create the data directories and write a default configuration file if
/// none exists. Running init twice is harmless.
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = if config_path.exists() {
        ServerConfig::load(config_path)?
    } else {
        let config = ServerConfig::default();
        config.write(config_path)?;
        config
    };

    for dir in [&config.data_dir, &config.bundle_dir] {
        fs::create_dir_all(dir)
            .map_err(|e| CliError::Io(format!("failed to create {}: {}", dir.display(), e)))?;
    }

    println!("Initialized scenebase at {}", config_path.display());
    Ok(())
}

/// Load configuration and run the server until shutdown.
pub fn start(config_path: &Path) -> CliResult<()> {
    let config = ServerConfig::load(config_path)?;
    let server = HttpServer::new(config)?;

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Runtime(format!("failed to start runtime: {}", e)))?;

    runtime
        .block_on(server.start())
        .map_err(|e| CliError::Io(e.to_string()))
}
