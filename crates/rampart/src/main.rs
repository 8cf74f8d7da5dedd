use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use rampart::cli::Args;
use rampart::config::AppConfig;
use rampart::routes;
use rampart::state::AppState;
use rampart::storage::{JsonFileStore, KeyValueStore, MemoryStore};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level, args.json_logs)?;

    info!("🛡️ Starting Rampart v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::load(&args.config, &args)?;
    info!(forms = config.forms.len(), "📋 Configuration loaded from {}", args.config);

    // Local key-value store
    let store: Box<dyn KeyValueStore> = if args.ephemeral {
        warn!("Ephemeral mode: submission records will not survive a restart");
        Box::new(MemoryStore::new())
    } else {
        let store = JsonFileStore::open(&config.storage_path)
            .with_context(|| format!("Failed to open store at {}", config.storage_path))?;
        info!("💾 Store opened: {}", config.storage_path);
        Box::new(store)
    };

    // Initialize application state
    let state = AppState::new(&config, store);

    // Build router
    let app = routes::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!("🚀 Rampart listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("👋 Rampart shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("🛑 Shutdown signal received");
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .try_init()?;
    }

    Ok(())
}
