//! CLI argument definitions using clap
//!
//! Commands:
//! - faultinjector serve [--config <path>] [--port <port>]
//! - faultinjector points [--config <path>]
//! - faultinjector check-config --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// faultinjector - deterministic fault injection for database test suites
#[derive(Parser, Debug)]
#[command(name = "faultinjector")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP control server
    Serve {
        /// Path to configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the fault point, type and DDL vocabularies
    Points {
        /// Path to configuration file, to include extra fault names
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a configuration file and print the effective settings
    CheckConfig {
        /// Path to configuration file
        #[arg(long, default_value = "./faultinjector.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
