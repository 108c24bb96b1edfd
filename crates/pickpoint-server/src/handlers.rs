// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! HTTP request handlers and wire DTOs.
//!
//! Wire names are camelCase. The report query takes `startDate`/`endDate`
//! (required) plus `page`/`limit` (defaults 1 and 10); bounds are enforced
//! by the core, not here.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pickpoint_core::model::{ItemCategory, Location, ReceptionStatus};
use pickpoint_core::report::{ReportQuery, StationReport};
use pickpoint_core::storage::{ItemRecord, NewStation, ReceptionRecord, StationRecord};

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;

/// Request body for station creation. Id and registration timestamp are
/// optional; absent values are generated server-side.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStationRequest {
    /// Explicit station id.
    pub id: Option<Uuid>,
    /// Explicit registration timestamp.
    pub registered_at: Option<DateTime<Utc>>,
    /// Station location.
    pub location: Location,
}

/// Station on the wire.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationDto {
    /// Station id.
    pub id: Uuid,
    /// Registration timestamp.
    pub registered_at: DateTime<Utc>,
    /// Location.
    pub location: Location,
}

impl From<StationRecord> for StationDto {
    fn from(r: StationRecord) -> Self {
        Self {
            id: r.id,
            registered_at: r.registered_at,
            location: r.location,
        }
    }
}

/// Request body for opening a reception.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenReceptionRequest {
    /// Station to open the reception at.
    pub station_id: Uuid,
}

/// Reception on the wire.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceptionDto {
    /// Reception id.
    pub id: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Owning station.
    pub station_id: Uuid,
    /// Current status.
    pub status: ReceptionStatus,
}

impl From<ReceptionRecord> for ReceptionDto {
    fn from(r: ReceptionRecord) -> Self {
        Self {
            id: r.id,
            created_at: r.created_at,
            station_id: r.station_id,
            status: r.status,
        }
    }
}

/// Request body for adding an item.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    /// Station whose current reception takes the item.
    pub station_id: Uuid,
    /// What kind of goods the item is.
    pub category: ItemCategory,
}

/// Item on the wire.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDto {
    /// Item id.
    pub id: Uuid,
    /// Scan timestamp.
    pub created_at: DateTime<Utc>,
    /// Category.
    pub category: ItemCategory,
    /// Owning reception.
    pub reception_id: Uuid,
}

impl From<ItemRecord> for ItemDto {
    fn from(r: ItemRecord) -> Self {
        Self {
            id: r.id,
            created_at: r.created_at,
            category: r.category,
            reception_id: r.reception_id,
        }
    }
}

/// Query parameters of the report endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportParams {
    /// Inclusive lower bound on reception creation time.
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on reception creation time.
    pub end_date: Option<DateTime<Utc>>,
    /// 1-based page number.
    pub page: Option<i64>,
    /// Receptions per page.
    pub limit: Option<i64>,
}

/// One station with its windowed receptions, on the wire.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationReportDto {
    /// The station.
    pub station: StationDto,
    /// Its receptions, most recent first.
    pub receptions: Vec<ReceptionReportDto>,
}

/// One reception with its items, on the wire.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceptionReportDto {
    /// The reception.
    pub reception: ReceptionDto,
    /// Items in scan order.
    pub items: Vec<ItemDto>,
}

impl From<StationReport> for StationReportDto {
    fn from(r: StationReport) -> Self {
        Self {
            station: r.station.into(),
            receptions: r
                .receptions
                .into_iter()
                .map(|rec| ReceptionReportDto {
                    reception: rec.reception.into(),
                    items: rec.items.into_iter().map(Into::into).collect(),
                })
                .collect(),
        }
    }
}

/// POST /api/v1/stations
pub async fn create_station(
    State(state): State<AppState>,
    Json(req): Json<CreateStationRequest>,
) -> Result<(StatusCode, Json<StationDto>), ApiError> {
    let station = state
        .service
        .create_station(NewStation {
            id: req.id,
            registered_at: req.registered_at,
            location: req.location,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(station.into())))
}

/// GET /api/v1/stations
pub async fn list_report(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<Json<Vec<StationReportDto>>, ApiError> {
    let start = params
        .start_date
        .ok_or_else(|| ApiError::bad_request("startDate is required"))?;
    let end = params
        .end_date
        .ok_or_else(|| ApiError::bad_request("endDate is required"))?;

    let report = state
        .service
        .list_report(ReportQuery {
            start,
            end,
            page: params.page.unwrap_or(DEFAULT_PAGE),
            page_size: params.limit.unwrap_or(DEFAULT_LIMIT),
        })
        .await?;

    Ok(Json(report.into_iter().map(Into::into).collect()))
}

/// POST /api/v1/receptions
pub async fn open_reception(
    State(state): State<AppState>,
    Json(req): Json<OpenReceptionRequest>,
) -> Result<(StatusCode, Json<ReceptionDto>), ApiError> {
    let reception = state.service.open_reception(req.station_id).await?;
    Ok((StatusCode::CREATED, Json(reception.into())))
}

/// POST /api/v1/items
pub async fn add_item(
    State(state): State<AppState>,
    Json(req): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<ItemDto>), ApiError> {
    let item = state.service.add_item(req.station_id, req.category).await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

/// POST /api/v1/stations/{station_id}/delete_last_item
pub async fn remove_last_item(
    State(state): State<AppState>,
    Path(station_id): Path<Uuid>,
) -> Result<Json<ItemDto>, ApiError> {
    let item = state.service.remove_last_item(station_id).await?;
    Ok(Json(item.into()))
}

/// POST /api/v1/stations/{station_id}/close_last_reception
pub async fn close_reception(
    State(state): State<AppState>,
    Path(station_id): Path<Uuid>,
) -> Result<Json<ReceptionDto>, ApiError> {
    let reception = state.service.close_reception(station_id).await?;
    Ok(Json(reception.into()))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.service.health_check().await?;
    Ok(StatusCode::OK)
}
