//! gdx-lb (Library Browser) - Main entry point
//!
//! Serves normalized game records parsed from a folder of Markdown documents.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use gdx_common::config::{CliOverrides, ServiceConfig};
use gdx_common::RecordCache;
use gdx_lb::{build_router, AppState};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for gdx-lb
///
/// `GDX_*` environment variables are read by `ServiceConfig`, below these.
#[derive(Parser, Debug)]
#[command(name = "gdx-lb")]
#[command(about = "Game library browser service")]
#[command(version)]
struct Args {
    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level for gdx crates and request tracing (overridden by RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,

    /// Folder of Markdown documents to parse at startup
    #[arg(long)]
    preload_folder: Option<PathBuf>,

    /// Config file (default: <config_dir>/gamedex/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl From<Args> for CliOverrides {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            log_level: args.log_level,
            preload_folder: args.preload_folder,
            config_file: args.config,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (config, config_notes) = ServiceConfig::resolve_with_notes(&args.into());

    let default_filter = format!(
        "gdx_lb={level},gdx_common={level},tower_http={level}",
        level = config.log_level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any folder parsing delays
    info!(
        "Starting Game Library Browser (gdx-lb) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    for note in config_notes {
        warn!("{}", note);
    }

    let cache = Arc::new(RecordCache::new());

    if let Some(folder) = config.preload_folder.clone() {
        preload(Arc::clone(&cache), folder).await;
    }

    let app = build_router(AppState::new(cache));

    let addr = config.bind_addr();
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Warm the cache; failure only logs
async fn preload(cache: Arc<RecordCache>, folder: PathBuf) {
    let Some(folder) = folder.to_str().map(str::to_string) else {
        warn!("Preload folder {} is not valid UTF-8, skipping", folder.display());
        return;
    };
    info!("Preloading records from {}", folder);

    match tokio::task::spawn_blocking(move || cache.rebuild(&folder)).await {
        Ok(Ok(snapshot)) => info!("✓ Preloaded {} records", snapshot.len()),
        Ok(Err(e)) => error!("Preload failed: {}", e),
        Err(e) => error!("Preload task failed: {}", e),
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
