//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router around the gateway handler
//! - Share the route table, outbound client, and scalar settings
//! - Swap in reloaded route tables without pausing traffic
//! - Bind server to listener and drain on shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::http::forwarder::{ClientError, Forwarder};
use crate::http::handler::gateway_handler;
use crate::routing::RouteTable;

/// Scalar settings read once at startup.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// Deadline for routes without their own timeout.
    pub default_timeout: Duration,
    pub max_body_size: u64,
    /// Host reported in X-Forwarded-Host when the client sent none.
    pub public_host: String,
}

impl GatewaySettings {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            default_timeout: Duration::from_secs(config.timeouts.default_secs),
            max_body_size: config.limits.max_body_size,
            public_host: config.listener.bind_address.clone(),
        }
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Current route table; replaced whole on reload, never mutated.
    pub routes: Arc<ArcSwap<RouteTable>>,
    pub forwarder: Forwarder,
    pub settings: Arc<GatewaySettings>,
}

impl AppState {
    pub fn new(config: &GatewayConfig, table: RouteTable) -> Result<Self, ClientError> {
        Ok(Self {
            routes: Arc::new(ArcSwap::from_pointee(table)),
            forwarder: Forwarder::new(&config.pool, &config.timeouts)?,
            settings: Arc::new(GatewaySettings::from_config(config)),
        })
    }
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    routes: Arc<ArcSwap<RouteTable>>,
}

impl GatewayServer {
    /// Create a server for an already validated configuration and route table.
    pub fn new(config: &GatewayConfig, table: RouteTable) -> Result<Self, ClientError> {
        let state = AppState::new(config, table)?;
        let routes = Arc::clone(&state.routes);
        Ok(Self {
            router: Self::build_router(state),
            routes,
        })
    }

    /// Every path falls through to the gateway handler; dispatch happens there.
    ///
    /// The trace layer only emits debug spans. Failures are logged by the
    /// handler, which owns the single record per request.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(gateway_handler)
            .with_state(state)
            .layer(TraceLayer::new_for_http().on_failure(()))
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Handle to the live route table.
    pub fn routes(&self) -> Arc<ArcSwap<RouteTable>> {
        Arc::clone(&self.routes)
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Validated configurations received on `config_updates` replace the
    /// route table; in-flight requests finish on the table they started with.
    /// Returns once `shutdown` fires and open connections have drained.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.routes.load().len(),
            "HTTP server starting"
        );

        let routes = Arc::clone(&self.routes);
        let reloader = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                match RouteTable::load(&config.routes) {
                    Ok(table) => {
                        let count = table.len();
                        routes.store(Arc::new(table));
                        tracing::info!(routes = count, "Route table reloaded");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Rejected route reload, keeping current routes");
                    }
                }
            }
        });

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
