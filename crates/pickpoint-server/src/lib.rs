// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Pickpoint Server - HTTP API
//!
//! Thin HTTP layer over [`pickpoint_core`]: wire DTOs, error mapping, and
//! the router. All domain rules live in the core; handlers translate
//! between JSON and the service facade.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/v1/stations` | Register a station |
//! | `GET` | `/api/v1/stations` | Windowed reception report |
//! | `POST` | `/api/v1/receptions` | Open a reception |
//! | `POST` | `/api/v1/items` | Add an item to the current reception |
//! | `POST` | `/api/v1/stations/{id}/delete_last_item` | Remove the last item (LIFO) |
//! | `POST` | `/api/v1/stations/{id}/close_last_reception` | Close the current reception |
//! | `GET` | `/health` | Storage reachability check |

#![deny(missing_docs)]

/// Core error to HTTP response mapping.
pub mod error;

/// Request handlers and wire DTOs.
pub mod handlers;

/// Router assembly.
pub mod routes;

/// Shared handler state.
pub mod state;
