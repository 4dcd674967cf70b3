//! kicad-pcb-mcp: MCP server exposing step-by-step PCB editing flows
//!
//! Publishes the create, edit, move, remove and verify flows plus the board
//! analyzer over stdio, backed by an in-memory board.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use kicad_pcb_mcp::config::{self, Config};
use kicad_pcb_mcp::error::ConfigError;
use kicad_pcb_mcp::mcp::{McpServer, ToolRegistry};
use kicad_pcb_mcp::pcb::{MemoryBoard, MemoryEngine, RasterRenderer};
use kicad_pcb_mcp::tools::{self, Services};

/// MCP server exposing step-by-step PCB editing flows.
///
/// Each flow is published as a chain of tools whose answers name the next
/// step, so an AI assistant can create, edit, move, remove and inspect board
/// items one decision at a time.
#[derive(Parser, Debug)]
#[command(name = "kicad-pcb-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN, // Default to warn for unknown levels
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the configuration. A missing default config file means defaults.
fn load_config(path: Option<&std::path::Path>) -> Result<Config, ConfigError> {
    match config::load_config(path) {
        Err(ConfigError::NotFound { .. }) if path.is_none() => Ok(Config::default()),
        other => other,
    }
}

/// Builds the domain services from the configuration.
fn build_services(cfg: &Config) -> Result<Services, String> {
    let board = match &cfg.board_path {
        Some(path) => MemoryBoard::open(path, &cfg.board_name, cfg.autosave)
            .map_err(|e| format!("Board error: {e}"))?,
        None => MemoryBoard::new(cfg.board_name.clone()),
    };
    info!(items = board.len(), "Board ready");

    let renderer = RasterRenderer::new(cfg.render.width, cfg.render.height, cfg.render.margin_px)
        .map_err(|e| format!("Render configuration error: {e}"))?;

    Ok(Services {
        cad: Arc::new(MemoryEngine::new(board)),
        renderer: Arc::new(renderer),
        next_action: cfg.flow.next_action,
    })
}

/// Entry point for the kicad-pcb-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration
    let config_path = args.config.as_deref();
    let cfg = match load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    // Display GPL license notice (required by GPLv3 Section 5d)
    eprintln!(
        "kicad-pcb-mcp {}  Copyright (C) 2026  The kicad-pcb-mcp Developers",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("This program comes with ABSOLUTELY NO WARRANTY.");
    eprintln!("This is free software, licensed under GPL-3.0-or-later.");
    eprintln!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
    eprintln!();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting kicad-pcb-mcp server"
    );

    let services = match build_services(&cfg) {
        Ok(services) => services,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    // A partial tool table is never served
    let mut registry = ToolRegistry::new();
    if let Err(e) = tools::register_all(&services, &mut registry) {
        error!(error = %e, "Tool registration failed");
        eprintln!("Tool registration failed: {e}");
        return ExitCode::FAILURE;
    }

    let mut server = McpServer::new(registry);

    info!("MCP server ready, waiting for client connection...");

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create Tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(server.run());

    match result {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn log_level_precedence() {
        assert_eq!(get_log_level(0, true, "trace"), Level::ERROR);
        assert_eq!(get_log_level(2, false, "error"), Level::DEBUG);
        assert_eq!(get_log_level(0, false, "info"), Level::INFO);
        assert_eq!(get_log_level(0, false, "loud"), Level::WARN);
    }

    #[test]
    fn default_services_register_every_tool() {
        let services = build_services(&Config::default()).unwrap();
        let mut registry = ToolRegistry::new();
        tools::register_all(&services, &mut registry).unwrap();
        assert!(registry.contains("verify_pcb_step_1"));
        assert!(registry.contains("get_board_status"));
    }
}
