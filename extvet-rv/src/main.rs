//! extvet-rv (Request Vetting) - Main entry point
//!
//! HTTP service that decides browser-extension requests: catalog lookup
//! first, AI-assisted analysis for unlisted extensions, fail-closed on any
//! AI-path failure.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use extvet_common::config::{resolve_gemini_api_key, Settings};
use extvet_rv::services::providers::ProviderRegistry;
use extvet_rv::services::Catalog;
use extvet_rv::{build_router, AppState};

const DEFAULT_PORT: u16 = 5761;

/// Command-line arguments for extvet-rv
#[derive(Parser, Debug)]
#[command(name = "extvet-rv")]
#[command(about = "Request Vetting microservice for extvet")]
#[command(version)]
struct Args {
    /// Port to listen on (default 5761)
    #[arg(short, long, env = "EXTVET_RV_PORT")]
    port: Option<u16>,

    /// Path to TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "extvet_rv=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting extvet Request Vetting (extvet-rv) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    // Parse command-line arguments
    let args = Args::parse();

    // Settings: explicit path, then EXTVET_CONFIG, then the platform default
    let settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;

    // Port priority: CLI / EXTVET_RV_PORT, then config file, then default
    let port = args.port.or(settings.port).unwrap_or(DEFAULT_PORT);

    // Catalog: configured file replaces the embedded seed data
    let catalog = match settings.catalog_path.as_deref() {
        Some(path) => {
            info!("Loading catalog from {}", path.display());
            Catalog::from_file(path).context("Failed to load catalog file")?
        }
        None => Catalog::builtin().context("Failed to load built-in catalog")?,
    };

    // Default credential feeds lazy provider initialization on first use
    let credential = resolve_gemini_api_key(&settings);
    let registry = ProviderRegistry::new(credential);

    let state = AppState::new(catalog, registry);
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);
    info!("Health check: http://127.0.0.1:{}/health", port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}
