//! group-router
//!
//! Serves a nested route table over HTTP, or resolves a single request from
//! the command line.
//!
//! # Architecture Overview
//!
//! ```text
//!     config.toml ──▶ loader ──▶ validation ──▶ RouteTable
//!                                                   │
//!     Client Request                                ▼
//!     ──────────────▶ http server ──▶ per-request Router ──▶ registry ──▶ controller
//!     ◀────────────── 200 / 404 / 403 / 500 ◀───────┘
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use group_router::builtin::default_registry;
use group_router::config::{load_config, RouterConfig};
use group_router::http::server::handle;
use group_router::http::{AppState, HttpServer};
use group_router::lifecycle::Shutdown;
use group_router::observability::init_logging;
use group_router::routing::Outcome;

#[derive(Parser)]
#[command(name = "group-router")]
#[command(about = "Serve or inspect a nested route table", long_about = None)]
struct Cli {
    /// Path to the TOML route configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the route table over HTTP
    Serve {
        /// Override the configured bind address
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Resolve one request and print the handler output
    Resolve {
        /// Request method, e.g. GET
        method: String,
        /// Request URI, e.g. /api/users/7?x=1
        uri: String,
    },
    /// Validate the configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };

    init_logging(&config.observability);

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.listener.bind_address = bind;
            }

            tracing::info!(
                bind_address = %config.listener.bind_address,
                request_timeout_secs = config.timeouts.request_secs,
                "Configuration loaded"
            );

            let listener = TcpListener::bind(&config.listener.bind_address).await?;
            let server = HttpServer::new(config, default_registry())?;

            let shutdown = Shutdown::new();
            let signal = shutdown.subscribe();
            tokio::spawn(shutdown.trigger_on_ctrl_c());

            server.run(listener, signal).await?;
        }
        Commands::Resolve { method, uri } => {
            let state = AppState::new(&config, default_registry())?;
            match handle(&state, &method, &uri)? {
                Outcome::Dispatched(body) => println!("{}", body),
                Outcome::NotFound => {
                    return Err(format!("No route matched {} {}", method, uri).into());
                }
            }
        }
        Commands::Check => {
            let state = AppState::new(&config, default_registry())?;
            println!("Configuration OK: {} top-level entries", state.table.len());
        }
    }

    Ok(())
}
