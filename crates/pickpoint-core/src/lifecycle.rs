// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Lifecycle engine: the reception/item state machine.
//!
//! Every function here runs against one already-open [`UnitOfWork`] and
//! assumes the facade commits on success and rolls back on error. The
//! first storage access of every mutating operation is a station row lock,
//! so racing operations on the same station serialize at the database.
//!
//! Reception state machine:
//!
//! ```text
//!   OpenReception          CloseReception
//!        │                       │
//!        ▼                       ▼
//!   ┌────────────┐          ┌────────┐
//!   │ collecting │─────────▶│ closed │   (terminal, immutable)
//!   └────────────┘          └────────┘
//! ```
//!
//! Items may only exist while the owning reception is `collecting`, and
//! removal is strict LIFO: only the most recently created item goes.

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::CoreError;
use crate::model::{ItemCategory, ReceptionStatus};
use crate::storage::{ItemRecord, NewStation, ReceptionRecord, StationRecord, UnitOfWork};

/// Create a station.
///
/// An explicit id that already names a station fails with
/// [`CoreError::AlreadyExists`]; absent id and registration timestamp are
/// generated by storage.
#[instrument(skip(uow, new), fields(location = %new.location))]
pub async fn create_station(
    uow: &mut dyn UnitOfWork,
    new: NewStation,
) -> Result<StationRecord, CoreError> {
    if let Some(id) = new.id {
        if uow.lock_station(id).await?.is_some() {
            warn!(station_id = %id, "station id already taken");
            return Err(CoreError::AlreadyExists {
                kind: "station",
                id,
            });
        }
    }

    let station = uow.insert_station(new).await?;
    info!(station_id = %station.id, "station created");
    Ok(station)
}

/// Open a new reception at the station.
///
/// Fails with [`CoreError::NotFound`] when the station is absent and with
/// [`CoreError::ReceptionNotClosed`] when its current reception is still
/// collecting.
#[instrument(skip(uow))]
pub async fn open_reception(
    uow: &mut dyn UnitOfWork,
    station_id: Uuid,
) -> Result<ReceptionRecord, CoreError> {
    let Some(station) = uow.lock_station(station_id).await? else {
        warn!(%station_id, "station not found");
        return Err(CoreError::NotFound {
            kind: "station",
            id: station_id,
        });
    };

    if let Some(current) = uow.current_reception(station.id).await? {
        if current.status == ReceptionStatus::Collecting {
            warn!(%station_id, reception_id = %current.id, "reception still collecting");
            return Err(CoreError::ReceptionNotClosed { station_id });
        }
    }

    let reception = uow.insert_reception(station.id).await?;
    info!(%station_id, reception_id = %reception.id, "reception opened");
    Ok(reception)
}

/// Add an item to the station's current reception.
///
/// The reception must exist and be collecting; the category is already a
/// member of the closed set by construction.
#[instrument(skip(uow), fields(category = %category))]
pub async fn add_item(
    uow: &mut dyn UnitOfWork,
    station_id: Uuid,
    category: ItemCategory,
) -> Result<ItemRecord, CoreError> {
    let reception = collecting_reception(uow, station_id).await?;

    let item = uow.insert_item(reception.id, category).await?;
    info!(%station_id, reception_id = %reception.id, item_id = %item.id, "item added");
    Ok(item)
}

/// Remove the most recently added item of the station's current reception.
///
/// Strict LIFO; removing from an empty reception fails with
/// [`CoreError::NoItems`].
#[instrument(skip(uow))]
pub async fn remove_last_item(
    uow: &mut dyn UnitOfWork,
    station_id: Uuid,
) -> Result<ItemRecord, CoreError> {
    let reception = collecting_reception(uow, station_id).await?;

    let Some(item) = uow.delete_last_item(reception.id).await? else {
        warn!(%station_id, reception_id = %reception.id, "reception has no items");
        return Err(CoreError::NoItems {
            reception_id: reception.id,
        });
    };

    info!(%station_id, reception_id = %reception.id, item_id = %item.id, "last item removed");
    Ok(item)
}

/// Close the station's current reception.
///
/// One-way transition; there is no reopen. Fails with
/// [`CoreError::NoOpenReception`] when nothing is collecting.
#[instrument(skip(uow))]
pub async fn close_reception(
    uow: &mut dyn UnitOfWork,
    station_id: Uuid,
) -> Result<ReceptionRecord, CoreError> {
    let Some(station) = uow.lock_station(station_id).await? else {
        warn!(%station_id, "station not found");
        return Err(CoreError::NotFound {
            kind: "station",
            id: station_id,
        });
    };

    let current = uow.current_reception(station.id).await?;
    let open = match current {
        Some(r) if r.status == ReceptionStatus::Collecting => r,
        _ => {
            warn!(%station_id, "no open reception to close");
            return Err(CoreError::NoOpenReception { station_id });
        }
    };

    let closed = uow.close_reception(open.id).await?;
    info!(%station_id, reception_id = %closed.id, "reception closed");
    Ok(closed)
}

/// Resolve the station's current reception and require it to be collecting.
///
/// Station absent → `NotFound`; station without any reception →
/// `NoOpenReception`; current reception closed → `ReceptionNotInProgress`.
async fn collecting_reception(
    uow: &mut dyn UnitOfWork,
    station_id: Uuid,
) -> Result<ReceptionRecord, CoreError> {
    let Some(station) = uow.lock_station(station_id).await? else {
        warn!(%station_id, "station not found");
        return Err(CoreError::NotFound {
            kind: "station",
            id: station_id,
        });
    };

    let Some(reception) = uow.current_reception(station.id).await? else {
        warn!(%station_id, "station has no reception");
        return Err(CoreError::NoOpenReception { station_id });
    };

    if reception.status != ReceptionStatus::Collecting {
        warn!(%station_id, reception_id = %reception.id, "reception not in progress");
        return Err(CoreError::ReceptionNotInProgress {
            reception_id: reception.id,
        });
    }

    Ok(reception)
}
