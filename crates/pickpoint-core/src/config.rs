// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration loading from environment variables.

use std::net::SocketAddr;
use std::time::Duration;

/// Pickpoint service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP listen address
    pub http_addr: SocketAddr,
    /// Per-request deadline; a transaction still open when it fires is
    /// rolled back, never left behind
    pub request_timeout: Duration,
    /// Maximum pooled database connections
    pub max_connections: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `PICKPOINT_DATABASE_URL`: PostgreSQL connection string
    ///
    /// Optional (with defaults):
    /// - `PICKPOINT_HTTP_PORT`: HTTP listen port (default: 8080)
    /// - `PICKPOINT_REQUEST_TIMEOUT_MS`: per-request deadline in
    ///   milliseconds (default: 150)
    /// - `PICKPOINT_MAX_CONNECTIONS`: pool size (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("PICKPOINT_DATABASE_URL")
            .map_err(|_| ConfigError::Missing("PICKPOINT_DATABASE_URL"))?;

        let http_port: u16 = std::env::var("PICKPOINT_HTTP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("PICKPOINT_HTTP_PORT", "must be a valid port number")
            })?;

        let request_timeout_ms: u64 = std::env::var("PICKPOINT_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "150".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid(
                    "PICKPOINT_REQUEST_TIMEOUT_MS",
                    "must be a positive integer",
                )
            })?;

        let max_connections: u32 = std::env::var("PICKPOINT_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("PICKPOINT_MAX_CONNECTIONS", "must be a positive integer")
            })?;

        Ok(Self {
            database_url,
            http_addr: SocketAddr::from(([0, 0, 0, 0], http_port)),
            request_timeout: Duration::from_millis(request_timeout_ms),
            max_connections,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    /// An environment variable has an invalid value.
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
