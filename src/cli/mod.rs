//! CLI module for faultinjector
//!
//! Provides command-line interface for:
//! - serve: Run the HTTP control server
//! - points: Print the control vocabularies
//! - check-config: Validate a configuration file

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check_config, points_report, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::write_response;
