//! Marathon Bot
//!
//! LINE chatbot answering Taiwan marathon race queries from a scraped and
//! periodically refreshed race calendar.

mod bot;
mod cli;
mod config;
mod line;
mod query;
mod retry;
mod routes;
mod scheduler;
mod scraper;
mod store;
mod types;

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::line::LineClient;
use crate::routes::AppState;
use crate::scheduler::Refresher;
use crate::scraper::ScrapePipeline;
use crate::store::SnapshotStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => run_server(host, port).await,
        Commands::Scrape { format } => cli::run_scrape(format).await,
        Commands::Query { mode, value } => cli::run_query(mode, value).await,
    }
}

/// Run the webhook server with the background refresh task.
async fn run_server(host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marathon_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let mut config = AppConfig::load()?;

    // Override with CLI args
    if let Some(h) = host {
        config.server.host = h;
    }
    if let Some(p) = port {
        config.server.port = p;
    }

    config.require_line_credentials()?;
    info!("Configuration loaded");
    info!("Race calendar: {}", config.scraper.url);

    // Start the refresh task; the first scrape runs right away
    let store = Arc::new(SnapshotStore::new());
    let pipeline = ScrapePipeline::new(&config.scraper)?;
    let shutdown = CancellationToken::new();
    let refresh_handle = Refresher::new(pipeline, store.clone())
        .spawn(config.scraper.refresh_interval(), shutdown.clone());

    let state = Arc::new(AppState {
        store,
        replier: Arc::new(LineClient::new(&config.line)?),
        channel_secret: config.line.channel_secret.clone(),
    });
    let app = routes::router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop the refresh task and wait for any cycle in progress
    shutdown.cancel();
    if let Err(e) = refresh_handle.await {
        tracing::error!("Refresh task failed: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for SIGTERM or SIGINT (Ctrl+C).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
