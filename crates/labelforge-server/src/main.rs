//! Labelforge Server
//!
//! Main entry point for the Labelforge HTTP server.
//! This binary loads configuration, wires the asset pipeline and serves the
//! HTTP API with graceful shutdown.

mod config;
mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use labelforge_api::{build_api_server_with_config, MiddlewareConfig};
use labelforge_db::InMemoryProjectRepository;
use labelforge_service::{HttpAssetStore, ServiceRegistry};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

use config::ServerConfig;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration directory
    #[arg(short, long, env = "CONFIG_DIR", default_value = "config")]
    config_dir: String,

    /// Environment (development, production, etc.)
    #[arg(short, long, env = "ENVIRONMENT", default_value = "development")]
    environment: String,

    /// Server host
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,

    /// Server port
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Remote asset store base URL
    #[arg(long, env = "ASSET_STORE_BASE_URL")]
    asset_store_url: Option<String>,

    /// Log level
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut config = ServerConfig::load(&args.config_dir, &args.environment)
        .context("Failed to load configuration")?;

    // Override with command-line arguments
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(url) = args.asset_store_url {
        config.asset_store.base_url = url;
    }
    if let Some(log_level) = args.log_level {
        config.logging.level = log_level;
    }

    telemetry::init_with_config(telemetry::TelemetryConfig::from(&config.logging));

    info!("Starting Labelforge Server");
    info!("Environment: {}", args.environment);
    info!("Server: {}", config.bind_address());
    info!(
        "Asset store: {} (cloud {}, root folder {})",
        config.asset_store.base_url, config.asset_store.cloud_name, config.asset_store.root_folder
    );

    config
        .asset_store
        .validate()
        .context("Invalid asset store configuration")?;

    let store = HttpAssetStore::new(config.asset_store.clone())
        .context("Failed to create asset store client")?;
    let repository = Arc::new(InMemoryProjectRepository::new());
    let services = ServiceRegistry::new(config.asset_store.clone(), repository, Arc::new(store));

    let app = build_api_server_with_config(
        services,
        MiddlewareConfig::new().with_max_body_bytes(config.server.max_body_bytes),
    );

    let http_addr: SocketAddr = config
        .bind_address()
        .parse()
        .context("Invalid HTTP bind address")?;

    let listener = tokio::net::TcpListener::bind(http_addr)
        .await
        .context("Failed to bind HTTP server")?;

    info!("HTTP Server listening on http://{}", http_addr);

    if config.server.graceful_shutdown {
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP Server error")?;
    } else {
        axum::serve(listener, app.into_make_service())
            .await
            .context("HTTP Server error")?;
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
///
/// Waits for SIGTERM or SIGINT (Ctrl+C).
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
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
