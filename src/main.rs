//! mcp-test-server: minimal MCP server for protocol conformance testing
//!
//! Binds the protocol core to one of two transports: line-delimited stdio
//! (one session for the process lifetime) or a WebSocket endpoint (one
//! session per accepted connection).

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use mcp_test_server::config;
use mcp_test_server::mcp::protocol::{STDIO_PROTOCOL_VERSION, WEBSOCKET_PROTOCOL_VERSION};
use mcp_test_server::mcp::{websocket, Dispatcher, ServerContext, Session, StdioTransport};
use mcp_test_server::shutdown;

/// Transport binding to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TransportKind {
    /// One JSON object per stdin/stdout line.
    Stdio,
    /// One JSON object per WebSocket text frame.
    Websocket,
}

/// Minimal MCP server for protocol conformance testing.
///
/// Advertises a fixed tool catalog and executes tool calls over stdio or
/// WebSocket, so MCP clients under test have a deterministic peer.
#[derive(Parser, Debug)]
#[command(name = "mcp-test-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Transport binding to serve
    #[arg(short, long, value_enum, default_value = "stdio")]
    transport: TransportKind,

    /// Host to bind the WebSocket listener on (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind the WebSocket listener on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

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
///
/// Diagnostics go to stderr so they never interleave with protocol output
/// on stdout.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs the single stdio session until EOF or a shutdown signal.
async fn run_stdio(dispatcher: Arc<Dispatcher>) -> std::io::Result<()> {
    let mut session = Session::new(StdioTransport::new(), dispatcher);

    tokio::select! {
        result = session.run() => result,
        signal = shutdown::wait() => signal,
    }
}

/// Entry point for the mcp-test-server.
fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration (optional; defaults apply when absent)
    let cfg = match config::load_config(args.config.as_deref()) {
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
        "mcp-test-server {}  Copyright (C) 2026  The Embedded Society",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("This program comes with ABSOLUTELY NO WARRANTY.");
    eprintln!("This is free software, licensed under GPL-3.0-or-later.");
    eprintln!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
    eprintln!();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        transport = ?args.transport,
        "Starting mcp-test-server"
    );

    // Each binding keeps its own default protocol version unless the
    // config pins one explicitly.
    let protocol_version = cfg.server.protocol_version.clone().unwrap_or_else(|| {
        match args.transport {
            TransportKind::Stdio => STDIO_PROTOCOL_VERSION.to_string(),
            TransportKind::Websocket => WEBSOCKET_PROTOCOL_VERSION.to_string(),
        }
    });

    let context = ServerContext::new(protocol_version, cfg.server.name.clone());
    let dispatcher = Arc::new(Dispatcher::new(context));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create Tokio runtime");

    let result = match args.transport {
        TransportKind::Stdio => {
            info!("MCP server ready, waiting for client on stdio...");
            runtime.block_on(run_stdio(dispatcher))
        }
        TransportKind::Websocket => {
            let host = args.host.unwrap_or(cfg.websocket.host);
            let port = args.port.unwrap_or(cfg.websocket.port);
            let addr = format!("{host}:{port}");
            runtime.block_on(websocket::serve(&addr, dispatcher))
        }
    };

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
