//! Serve command - Starts the HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Cache, Database};
use crate::jobs::{connect_storage, PostgresEmailQueue};

/// Execute the serve command
pub async fn execute(args: ServeArgs, mut config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    if let Some(host) = args.host {
        config.server_host = host;
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }

    // Migrations run on connect
    let db = Arc::new(Database::connect(&config).await?);
    tracing::info!("Database connected");

    let cache = Arc::new(Cache::connect(&config).await?);
    tracing::info!("Redis cache connected");

    let mailer = Arc::new(PostgresEmailQueue::new(
        connect_storage(&config.database_url).await?,
    ));
    tracing::info!("Email queue ready");

    let addr = config.server_addr();
    let app_state = AppState::from_config(db, cache, mailer, config)?;
    if app_state.oauth.is_none() {
        tracing::warn!("GOOGLE_CLIENT_ID/GOOGLE_CLIENT_SECRET not set; Google login disabled");
    }

    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal, draining connections...");
}
