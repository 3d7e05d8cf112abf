//! CLI module for corm
//!
//! Provides command-line interface for:
//! - run: execute operation requests from stdin against the configured database
//! - config: validate and print a configuration file

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{execute, print_config, run_command, serve, Request};
pub use errors::{CliError, CliResult};
pub use io::{read_lines, write_error, write_response};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}
