//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the route table from validated configuration
//! - Initialize optional subsystems (metrics exporter, config watcher)
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;
use std::path::PathBuf;

use metrics_exporter_prometheus::BuildError;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::config::watcher::ConfigWatcher;
use crate::config::{ConfigError, GatewayConfig};
use crate::http::{ClientError, GatewayServer};
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;
use crate::routing::RouteTable;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] BuildError),

    #[error("failed to watch configuration file: {0}")]
    Watch(#[from] notify::Error),

    #[error("failed to build backend client: {0}")]
    Client(#[from] ClientError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Run the gateway until a shutdown signal arrives.
///
/// `config` must already be validated; `config_path` is watched for route
/// changes when reload is enabled.
pub async fn start(config: GatewayConfig, config_path: Option<PathBuf>) -> Result<(), StartupError> {
    let table = RouteTable::load(&config.routes)?;
    for route in table.routes() {
        tracing::info!(
            route = route.name(),
            prefix = route.prefix(),
            target = %route.target(),
            strip_prefix = route.strip_prefix(),
            timeout_secs = route.timeout().map(|t| t.as_secs()),
            "Route registered"
        );
    }

    if config.observability.metrics_enabled {
        let address = &config.observability.metrics_address;
        let addr: SocketAddr = address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    // The watcher stops when dropped, so it lives until `start` returns.
    let (_watcher, config_updates) = match (config.reload.enabled, config_path) {
        (true, Some(path)) => {
            let (watcher, updates) = ConfigWatcher::new(&path);
            (Some(watcher.run()?), updates)
        }
        (enabled, _) => {
            if enabled {
                tracing::warn!("Route reload enabled but no config file given; reload disabled");
            }
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let server = GatewayServer::new(&config, table)?;

    let address = config.listener.bind_address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown.clone());

    server
        .run(listener, config_updates, server_shutdown)
        .await
        .map_err(StartupError::Serve)?;

    tracing::info!("Shutdown complete");
    Ok(())
}
