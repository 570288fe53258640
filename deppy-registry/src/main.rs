//! deppy entity registry server
//!
//! Serves an in-memory set of entities as a newline-delimited JSON stream,
//! sorted by entity ID. Entities can be seeded from a JSON-lines file, one
//! entity object per line.
//!
//! Usage:
//!   deppy-registry --listen-addr localhost:8080 --entities cluster.jsonl
//!
//! The registry keeps nothing on disk; every restart starts from the seed.

use std::{fs::File, io::BufReader, path::{Path, PathBuf}, sync::Arc};
use anyhow::{Context, Result};
use clap::Parser;
use deppy_registry::{build_router, Registry};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "deppy-registry")]
#[command(about = "Serve an in-memory entity registry as a JSON-lines stream")]
struct Args {
    /// Listen address of the entity service
    #[arg(short, long, default_value = "localhost:8080")]
    listen_addr: String,

    /// JSON-lines file of entities to load at start-up
    #[arg(short, long)]
    entities: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let registry = Arc::new(Registry::new());
    if let Some(path) = &args.entities {
        let loaded = load_entities(&registry, path)?;
        info!("Loaded {} entities from {:?}", loaded, path);
    }

    let listener = tokio::net::TcpListener::bind(&args.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", args.listen_addr))?;
    info!(
        "Serving {} entities on http://{}",
        registry.len(),
        listener.local_addr()?
    );

    axum::serve(listener, build_router(registry))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Registry shut down");
    Ok(())
}

fn load_entities(registry: &Registry, path: &Path) -> Result<usize> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    registry
        .load_json_lines(BufReader::new(file))
        .with_context(|| format!("Failed to load entities from {:?}", path))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
