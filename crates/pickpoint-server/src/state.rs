// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Shared handler state.

use pickpoint_core::service::PickpointService;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// The intake service.
    pub service: PickpointService,
}

impl AppState {
    /// Build the handler state.
    pub fn new(service: PickpointService) -> Self {
        Self { service }
    }
}
