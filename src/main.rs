//! KCache node binary
//!
//! Serves one group backed by a small in-memory dataset and joins the
//! peers listed in the environment.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kcache::{
    create_router, AppState, CacheError, Config, GetterFn, GroupRegistry, HttpPool, PoolOptions,
};

/// Stand-in for a slow backing database.
fn slow_db(key: &str) -> kcache::Result<Vec<u8>> {
    debug!("[SlowDB] search key {}", key);
    match key {
        "Tom" => Ok(b"630".to_vec()),
        "Jack" => Ok(b"589".to_vec()),
        "Sam" => Ok(b"567".to_vec()),
        _ => Err(CacheError::Internal(format!("{} not exist", key))),
    }
}

/// Main entry point for a cache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Register the served group
/// 4. Build the peer pool and register it with the group
/// 5. Serve peer requests until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kcache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: self={}, peers={:?}, max_entries={}, default_ttl={:?}, replicas={}",
        config.self_addr, config.peers, config.max_entries, config.default_ttl, config.replicas
    );

    let groups = Arc::new(GroupRegistry::new());
    let group = groups.new_group(
        config.group_name.as_str(),
        config.max_entries,
        config.default_ttl,
        GetterFn(slow_db),
    );

    let options = PoolOptions {
        base_path: config.base_path.clone(),
        replicas: config.replicas,
        timeout: config.peer_timeout,
    };
    let pool = Arc::new(HttpPool::with_options(config.self_addr.as_str(), options)?);
    pool.add_peers(config.peers.iter().cloned());
    group.register_peers(pool.clone())?;

    let app = create_router(AppState::new(pool, groups));

    let listener = tokio::net::TcpListener::bind(config.listen_addr())
        .await
        .with_context(|| format!("binding {}", config.listen_addr()))?;
    info!("kcache is running at {}", config.self_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
