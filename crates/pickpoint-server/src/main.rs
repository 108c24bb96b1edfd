// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Pickpoint Server - HTTP API for pickup-point intake
//!
//! The server is responsible for:
//! - Station registration
//! - Reception lifecycle (open, add/remove items, close)
//! - The windowed reception report

use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};

use pickpoint_core::config::Config;
use pickpoint_core::migrations;
use pickpoint_core::service::PickpointService;
use pickpoint_core::storage::PgStorage;
use pickpoint_server::routes;
use pickpoint_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (from crate directory or parent directories)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pickpoint_core=info".parse()?)
                .add_directive("pickpoint_server=info".parse()?),
        )
        .init();

    info!("Starting Pickpoint Server");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;

    info!(
        http_addr = %config.http_addr,
        request_timeout_ms = config.request_timeout.as_millis() as u64,
        max_connections = config.max_connections,
        "Configuration loaded"
    );

    // Connect to database
    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    info!("Database connection established");

    // Verify connection
    let row: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&pool).await?;
    info!(result = row.0, "Database health check passed");

    info!("Running database migrations...");
    migrations::run_postgres(&pool).await?;
    info!("Migrations completed");

    let service = PickpointService::new(Arc::new(PgStorage::new(pool.clone())));
    let app = routes::router(AppState::new(service), config.request_timeout);

    info!("Pickpoint Server initialized successfully");

    let listener = tokio::net::TcpListener::bind(config.http_addr).await?;
    info!(addr = %config.http_addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down...");
        })
        .await?;

    pool.close().await;
    info!("Shutdown complete");

    Ok(())
}
