//! REST router binary.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ context path strip ──▶ dispatcher
//!                                                              │
//!                              routing table (registration order, full match)
//!                                                              │
//!                                    access gate ──▶ parameter binding
//!                                                              │
//!                                                              ▼
//!     Client Response ◀── error translation ◀── worker pool ──▶ handler operation
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use rest_router::config::{load_config, RouterConfig};
use rest_router::handlers::default_handlers;
use rest_router::lifecycle::{signals::shutdown_on_signal, startup::build_module};
use rest_router::observability::{logging::init_logging, metrics::init_metrics};
use rest_router::{HttpServer, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "rest-router", version, about = "REST routing and dispatch server")]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };

    init_logging(&config.observability.log_level);
    tracing::info!("rest-router v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        context_path = %config.listener.context_path,
        max_concurrent = config.workers.max_concurrent,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let module = build_module(&config, default_handlers())?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    let rx = shutdown.subscribe();
    let signal = shutdown.clone();
    tokio::spawn(async move { shutdown_on_signal(&signal).await });

    HttpServer::new(config, module).run(listener, rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
