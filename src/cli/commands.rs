//! CLI command implementations

use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::config::FaultInjectorConfig;
use crate::fault::{points, DdlStatement, FaultCommand};
use crate::http_server::HttpServer;
use crate::registry::FaultRegistry;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(config.as_deref(), port),
        Command::Points { config } => write_response(points_report(config.as_deref())?),
        Command::CheckConfig { config } => write_response(check_config(&config)?),
    }
}

fn load_or_default(path: Option<&Path>) -> CliResult<FaultInjectorConfig> {
    match path {
        Some(path) => Ok(FaultInjectorConfig::load(path)?),
        None => Ok(FaultInjectorConfig::default()),
    }
}

/// Run the HTTP control server until it fails
pub fn serve(config_path: Option<&Path>, port: Option<u16>) -> CliResult<()> {
    let mut config = load_or_default(config_path)?;
    if let Some(port) = port {
        config.server.port = port;
    }

    let server_config = config.server.clone();
    let registry = Arc::new(FaultRegistry::new(config));
    let server = HttpServer::with_config(server_config, registry);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::serve_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::serve_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Vocabularies a control caller may use
pub fn points_report(config_path: Option<&Path>) -> CliResult<Value> {
    let config = load_or_default(config_path)?;
    let ddl: Vec<&str> = DdlStatement::ALL
        .iter()
        .map(|d| d.as_str())
        .filter(|d| !d.is_empty())
        .collect();

    Ok(json!({
        "points": points::all(),
        "extra_points": config.extra_fault_names,
        "types": FaultCommand::vocabulary(),
        "ddl_statements": ddl,
    }))
}

/// Load, validate and echo a configuration file
pub fn check_config(config_path: &Path) -> CliResult<Value> {
    let config = FaultInjectorConfig::load(config_path)?;
    Ok(json!({
        "valid": true,
        "config": serde_json::to_value(&config)?,
    }))
}
