//! Pitch Partner Platform Server
//!
//! Production server for the platform REST APIs:
//! - Public: health, login, registration, contract sign links
//! - Admin: party directory, CRM notes/tags, audit logs
//! - Club and sponsor workspaces
//!
//! Configuration is layered: defaults, then the TOML file given by
//! `--config` / `PP_CONFIG`, then `PP_*` environment variables.
//! See `pp-config` for the full variable list. `RUST_LOG` overrides the
//! configured log level.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use pp_config::{init_logging, PlatformConfig};
use pp_platform::repository;
use pp_platform::service::{Argon2Config, AuthConfig, PasswordService};
use pp_platform::{build_router, PlatformServices};

#[derive(Parser, Debug)]
#[command(name = "pp-platform-server", version, about = "Pitch Partner Platform Server")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "PP_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = PlatformConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&config.logging);

    info!("Starting Pitch Partner Platform Server");

    info!(url = %config.database.url, "Connecting to database");
    let pool = repository::connect(&config.database.url, config.database.max_connections).await?;
    repository::init_schema(&pool).await?;
    info!("Database schema ready");

    let services = PlatformServices::new(
        &pool,
        AuthConfig::from(&config.auth),
        PasswordService::new(Argon2Config::default()),
    );

    if let Some(admin) = &config.auth.bootstrap_admin {
        let created = services
            .ensure_bootstrap_admin(&admin.username, &admin.password)
            .await
            .context("Failed to create bootstrap admin")?;
        if !created {
            info!(username = %admin.username, "Bootstrap admin already exists");
        }
    } else {
        warn!("No bootstrap admin configured");
    }

    let app = build_router(&services)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));

    let addr = config.server.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("Pitch Partner Platform Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
