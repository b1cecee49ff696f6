//! CLI argument definitions using clap
//!
//! Commands:
//! - scenebase init --config <path>
//! - scenebase start --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// scenebase - A self-hostable backend for a web 3D scene editor
#[derive(Parser, Debug)]
#[command(name = "scenebase")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the data directories and a default configuration file
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./scenebase.json")]
        config: PathBuf,
    },

    /// Start the scenebase server
    Start {
        /// Path to configuration file
        #[arg(long, default_value = "./scenebase.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
