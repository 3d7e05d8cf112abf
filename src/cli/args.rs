//! CLI argument definitions using clap
//!
//! Commands:
//! - corm run --config <path>
//! - corm config --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// corm - object-document mapper for CouchDB-style stores
#[derive(Parser, Debug)]
#[command(name = "corm")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute JSON operation requests read line by line from stdin
    Run {
        /// Path to configuration file
        #[arg(long, default_value = "./corm.json")]
        config: PathBuf,
    },

    /// Validate a configuration file and print it with defaults filled in
    Config {
        /// Path to configuration file
        #[arg(long, default_value = "./corm.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
