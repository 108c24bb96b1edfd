// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Pickpoint Core - Pickup-Point Intake Engine
//!
//! This crate models pickup-point stations, their time-boxed goods
//! receptions, and the items scanned in during a reception, persisting all
//! state to PostgreSQL. It also serves a windowed, paginated report of
//! receptions with their items.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 pickpoint-server                │
//! │              (HTTP API, this binary)            │
//! └─────────────────────────────────────────────────┘
//!                         │
//!                         ▼
//! ┌─────────────────────────────────────────────────┐
//! │                PickpointService                 │
//! │     (transaction boundary: begin/commit/        │
//! │              rollback per operation)            │
//! └─────────────────────────────────────────────────┘
//!            │                          │
//!            ▼                          ▼
//! ┌──────────────────────┐   ┌─────────────────────┐
//! │   Lifecycle Engine   │   │   Report Engine     │
//! │  (state machine over │   │ (window validation, │
//! │   one UnitOfWork)    │   │  flat → tree fold)  │
//! └──────────────────────┘   └─────────────────────┘
//!            │                          │
//!            └────────────┬─────────────┘
//!                         ▼
//! ┌─────────────────────────────────────────────────┐
//! │                   PostgreSQL                    │
//! │       (stations, receptions, items)             │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! # Reception State Machine
//!
//! ```text
//!    OpenReception              CloseReception
//!         │                           │
//!         ▼                           ▼
//!    ┌────────────┐              ┌────────┐
//!    │ collecting │─────────────▶│ closed │  (terminal)
//!    └────────────┘              └────────┘
//! ```
//!
//! At most one reception per station is `collecting` at any moment; the
//! schema enforces this with a partial unique index, so the rule holds even
//! against racing transactions. Items can only be added to or removed from
//! a collecting reception, and removal is strict LIFO.
//!
//! # Operations
//!
//! | Operation | Description |
//! |-----------|-------------|
//! | `create_station` | Register a station in one of the supported locations |
//! | `open_reception` | Start a collecting reception at a station |
//! | `add_item` | Scan an item into the station's current reception |
//! | `remove_last_item` | Undo the most recent scan (LIFO) |
//! | `close_reception` | End the reception; closed is terminal |
//! | `list_report` | Windowed, paginated station → reception → item report |
//!
//! # Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `PICKPOINT_DATABASE_URL` | Yes | - | PostgreSQL connection string |
//! | `PICKPOINT_HTTP_PORT` | No | `8080` | HTTP listen port |
//! | `PICKPOINT_REQUEST_TIMEOUT_MS` | No | `150` | Per-request deadline |
//! | `PICKPOINT_MAX_CONNECTIONS` | No | `10` | Connection pool size |
//!
//! # Modules
//!
//! - [`config`]: Service configuration from environment variables
//! - [`error`]: Error types with stable error code mapping
//! - [`model`]: Closed domain vocabularies (locations, categories, statuses)
//! - [`storage`]: Record types, the `Storage`/`UnitOfWork` traits, Postgres backend
//! - [`lifecycle`]: Reception/item state machine
//! - [`report`]: Report window validation and flat-to-tree fold
//! - [`service`]: Transaction-boundary facade over the engines
//! - [`migrations`]: Embedded PostgreSQL migrations

#![deny(missing_docs)]

/// Service configuration loaded from environment variables.
pub mod config;

/// Error types for pickpoint operations with stable error codes.
pub mod error;

/// Reception/item lifecycle state machine.
pub mod lifecycle;

/// Embedded PostgreSQL migrations.
pub mod migrations;

/// Closed domain vocabularies: locations, item categories, reception statuses.
pub mod model;

/// Report window validation and the flat-to-tree fold.
pub mod report;

/// Transaction-boundary facade over the lifecycle and report engines.
pub mod service;

/// Record types, storage traits, and the PostgreSQL backend.
pub mod storage;
