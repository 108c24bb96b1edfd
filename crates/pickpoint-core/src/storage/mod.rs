// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Storage access layer: record types and the transactional capability
//! surface the engines require.
//!
//! Lifecycle operations never see a connection pool. The facade begins a
//! [`UnitOfWork`] and passes it down; every read and write of one operation
//! happens inside that single transaction, which the facade then commits or
//! rolls back.

pub mod postgres;

#[cfg(test)]
pub(crate) mod memory;

pub use self::postgres::PgStorage;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::CoreError;
use crate::model::{ItemCategory, Location, ReceptionStatus};

/// Station row from the persistence layer.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StationRecord {
    /// Unique station identifier.
    pub id: Uuid,
    /// When the station was registered.
    pub registered_at: DateTime<Utc>,
    /// Where the station is located.
    #[sqlx(try_from = "String")]
    pub location: Location,
}

/// Reception row from the persistence layer.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ReceptionRecord {
    /// Unique reception identifier.
    pub id: Uuid,
    /// When the reception was opened.
    pub created_at: DateTime<Utc>,
    /// Owning station.
    pub station_id: Uuid,
    /// Current status (collecting, closed).
    #[sqlx(try_from = "String")]
    pub status: ReceptionStatus,
}

/// Item row from the persistence layer.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ItemRecord {
    /// Unique item identifier.
    pub id: Uuid,
    /// When the item was scanned in.
    pub created_at: DateTime<Utc>,
    /// What kind of goods the item is.
    #[sqlx(try_from = "String")]
    pub category: ItemCategory,
    /// Owning reception.
    pub reception_id: Uuid,
}

/// Fields for creating a station. Absent id and timestamp are generated by
/// the database.
#[derive(Debug, Clone)]
pub struct NewStation {
    /// Explicit id, if the caller supplied one.
    pub id: Option<Uuid>,
    /// Explicit registration timestamp, if the caller supplied one.
    pub registered_at: Option<DateTime<Utc>>,
    /// Where the station is located.
    pub location: Location,
}

/// One flat row of the left-joined report query.
///
/// Each row carries one station, one reception, and at most one item; the
/// item fields are `None` when the reception holds no items. Transient
/// projection only, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    /// Station id.
    pub station_id: Uuid,
    /// Station registration timestamp.
    pub station_registered_at: DateTime<Utc>,
    /// Station location.
    pub station_location: Location,
    /// Reception id.
    pub reception_id: Uuid,
    /// Reception creation timestamp.
    pub reception_created_at: DateTime<Utc>,
    /// Reception status.
    pub reception_status: ReceptionStatus,
    /// Item id, if the row carries an item.
    pub item_id: Option<Uuid>,
    /// Item creation timestamp, if the row carries an item.
    pub item_created_at: Option<DateTime<Utc>>,
    /// Item category, if the row carries an item.
    pub item_category: Option<ItemCategory>,
}

/// Reception-level window for the report query.
///
/// `offset`/`limit` apply to distinct receptions ordered by
/// `(created_at, id)` descending, not to the raw joined rows. The id
/// tie-break keeps pages disjoint when receptions share a timestamp.
#[derive(Debug, Clone, Copy)]
pub struct ReportWindow {
    /// Inclusive lower bound on reception creation time.
    pub start: DateTime<Utc>,
    /// Inclusive upper bound on reception creation time.
    pub end: DateTime<Utc>,
    /// Number of receptions to skip.
    pub offset: i64,
    /// Maximum number of receptions to return.
    pub limit: i64,
}

/// A single open transaction.
///
/// All reads and writes go against the same transaction; nothing is visible
/// to other operations until [`UnitOfWork::commit`]. Dropping an
/// uncommitted unit of work rolls it back.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Fetch a station by id, taking a row lock that serializes concurrent
    /// lifecycle operations on the same station for the remainder of this
    /// transaction.
    async fn lock_station(&mut self, id: Uuid) -> Result<Option<StationRecord>, CoreError>;

    /// Insert a station row.
    async fn insert_station(&mut self, new: NewStation) -> Result<StationRecord, CoreError>;

    /// Fetch the station's current reception: the most recent one by
    /// `(created_at, id)`, regardless of status.
    async fn current_reception(
        &mut self,
        station_id: Uuid,
    ) -> Result<Option<ReceptionRecord>, CoreError>;

    /// Insert a collecting reception for the station.
    ///
    /// A unique-violation against the one-collecting-per-station index is
    /// surfaced as [`CoreError::ReceptionNotClosed`].
    async fn insert_reception(&mut self, station_id: Uuid) -> Result<ReceptionRecord, CoreError>;

    /// Set a reception's status to closed, by reception id.
    async fn close_reception(&mut self, reception_id: Uuid)
    -> Result<ReceptionRecord, CoreError>;

    /// Insert an item into the reception.
    async fn insert_item(
        &mut self,
        reception_id: Uuid,
        category: ItemCategory,
    ) -> Result<ItemRecord, CoreError>;

    /// Delete the most recently created item of the reception, returning it,
    /// or `None` when the reception holds no items.
    async fn delete_last_item(
        &mut self,
        reception_id: Uuid,
    ) -> Result<Option<ItemRecord>, CoreError>;

    /// Commit the transaction.
    async fn commit(self: Box<Self>) -> Result<(), CoreError>;

    /// Roll the transaction back, discarding every write made through it.
    async fn rollback(self: Box<Self>) -> Result<(), CoreError>;
}

/// Storage backend: hands out units of work and serves the read-only
/// report query.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Begin a new unit of work.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, CoreError>;

    /// Run the windowed left-join report query. Read-only, no transaction.
    async fn report_rows(&self, window: &ReportWindow) -> Result<Vec<ReportRow>, CoreError>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> Result<bool, CoreError>;
}
