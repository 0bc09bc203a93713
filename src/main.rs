//! Load-balancing reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌────────────────────────────────────────────────┐
//!                 │                  BACKHAUL                      │
//!  Client ────────┼─▶ http server ─▶ dispatcher ─▶ policy          │
//!                 │        │             │    (rr / wrr / least)   │
//!                 │        ▼             ▼                         │
//!  Client ◀───────┼─ relay response ◀─ forward to backend ─────────┼──▶ Backends
//!                 │                                                │
//!                 │  health probes (one task per backend)          │
//!                 │  config · observability · lifecycle            │
//!                 └────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use backhaul::config::load_config;
use backhaul::http::HttpServer;
use backhaul::lifecycle::{listen_for_ctrl_c, startup, Shutdown};
use backhaul::load_balancer::Dispatcher;
use backhaul::observability::{logging, metrics};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "backhaul", about = "Load-balancing reverse proxy", version)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    logging::init(&config.observability);
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backends = config.backends.len(),
        "configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "failed to parse metrics address"
            ),
        }
    }

    let backends = startup::build_registry(&config)?;
    let dispatcher = Arc::new(Dispatcher::new(backends, config.policy));
    tracing::info!(policy = dispatcher.policy_name(), "dispatcher ready");

    let shutdown = Shutdown::new();
    startup::spawn_probes(&config, dispatcher.backends(), &shutdown)?;
    listen_for_ctrl_c(shutdown.clone());

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(&config, dispatcher);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
