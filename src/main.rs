//! HTTP API Gateway
//!
//! A single entry point that forwards `/api/<service>/...` to backend services.
//!
//! # Architecture Overview
//!
//! ```text
//!                              ┌──────────────────────────────────────────────────────────┐
//!                              │                      API GATEWAY                          │
//!                              │                                                           │
//!     Client Request           │  ┌─────────┐    ┌─────────┐    ┌──────────────┐          │
//!     ─────────────────────────┼─▶│  http   │───▶│ gateway │───▶│   routing    │          │
//!                              │  │ server  │    │ handler │    │ longest pfx  │          │
//!                              │  └─────────┘    └────┬────┘    └──────┬───────┘          │
//!                              │                      │                │                   │
//!                              │        /health,      │                ▼                   │
//!                              │        /api/gateway/*│        ┌──────────────┐           │
//!                              │        answered here ▼        │ header policy│           │
//!                              │                 ┌─────────┐   └──────┬───────┘           │
//!                              │                 │  admin  │          │                   │
//!                              │                 │ health  │          ▼                   │
//!                              │                 └─────────┘   ┌──────────────┐           │
//!     Client Response          │  ┌─────────┐    ┌─────────┐   │  forwarder   │           │
//!     ◀────────────────────────┼──│response │◀───│  error  │◀──│ pooled, one  │◀──────────┼──── Backend
//!                              │  │ headers │    │ mapper  │   │  deadline    │           │     Service
//!                              │  └─────────┘    └─────────┘   └──────────────┘           │
//!                              │                                                           │
//!                              │  ┌─────────────────────────────────────────────────────┐ │
//!                              │  │              Cross-Cutting Concerns                  │ │
//!                              │  │  ┌─────────┐ ┌──────────┐ ┌───────────┐ ┌─────────┐ │ │
//!                              │  │  │ config  │ │observa-  │ │ security  │ │lifecycle│ │ │
//!                              │  │  │ +reload │ │ bility   │ │ + limits  │ │shutdown │ │ │
//!                              │  │  └─────────┘ └──────────┘ └───────────┘ └─────────┘ │ │
//!                              │  └─────────────────────────────────────────────────────┘ │
//!                              └──────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use api_gateway::config::{load_config, ConfigError};
use api_gateway::lifecycle::startup;
use api_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "api-gateway", version)]
#[command(about = "HTTP API gateway routing /api/<service> prefixes to backends", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults plus environment when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(ConfigError::Validation(errors)) => {
            eprintln!("Invalid configuration:");
            for error in &errors {
                eprintln!("  - {}", error);
            }
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    logging::init(&config.observability)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "api-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        default_timeout_secs = config.timeouts.default_secs,
        max_body_size = config.limits.max_body_size,
        reload = config.reload.enabled,
        "Configuration loaded"
    );

    startup::start(config, cli.config).await?;
    Ok(())
}
