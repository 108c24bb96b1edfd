// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Router assembly.

use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::handlers;
use crate::state::AppState;

/// Build the full application router.
///
/// Every request carries the per-request deadline; a timed-out request is
/// answered with 408 and its transaction rolls back when the handler future
/// is dropped.
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    let api = Router::new()
        .route(
            "/stations",
            post(handlers::create_station).get(handlers::list_report),
        )
        .route(
            "/stations/{station_id}/close_last_reception",
            post(handlers::close_reception),
        )
        .route(
            "/stations/{station_id}/delete_last_item",
            post(handlers::remove_last_item),
        )
        .route("/receptions", post(handlers::open_reception))
        .route("/items", post(handlers::add_item));

    Router::new()
        .nest("/api/v1", api)
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}
