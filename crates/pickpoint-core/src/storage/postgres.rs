// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! PostgreSQL-backed storage implementation.
//!
//! All queries are runtime-bound; reception status crosses the wire as
//! `status::text` and is parsed into [`ReceptionStatus`] on the way out.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::CoreError;
use crate::model::{ItemCategory, Location, ReceptionStatus};

use super::{
    ItemRecord, NewStation, ReceptionRecord, ReportRow, ReportWindow, StationRecord, Storage,
    UnitOfWork,
};

/// Name of the partial unique index enforcing at most one collecting
/// reception per station. A violation means a concurrent open won the race.
const ONE_COLLECTING_PER_STATION: &str = "receptions_one_collecting_per_station";

/// PostgreSQL-backed storage.
#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// Create a new Postgres-backed storage over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, CoreError> {
        let tx = self.pool.begin().await.map_err(|e| CoreError::Database {
            operation: "begin",
            details: e.to_string(),
        })?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    async fn report_rows(&self, window: &ReportWindow) -> Result<Vec<ReportRow>, CoreError> {
        type RawRow = (
            Uuid,
            DateTime<Utc>,
            String,
            Uuid,
            DateTime<Utc>,
            String,
            Option<Uuid>,
            Option<DateTime<Utc>>,
            Option<String>,
        );

        let rows = sqlx::query_as::<_, RawRow>(
            r#"
            WITH windowed AS (
                SELECT id
                FROM receptions
                WHERE created_at BETWEEN $1 AND $2
                ORDER BY created_at DESC, id DESC
                OFFSET $3 LIMIT $4
            )
            SELECT s.id, s.registered_at, s.location,
                   r.id, r.created_at, r.status::text,
                   i.id, i.created_at, i.category
            FROM receptions r
            JOIN windowed w ON w.id = r.id
            JOIN stations s ON s.id = r.station_id
            LEFT JOIN items i ON i.reception_id = r.id
            ORDER BY r.created_at DESC, r.id DESC, i.created_at, i.seq
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .bind(window.offset)
        .bind(window.limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let (
                    station_id,
                    station_registered_at,
                    station_location,
                    reception_id,
                    reception_created_at,
                    reception_status,
                    item_id,
                    item_created_at,
                    item_category,
                ) = row;
                Ok(ReportRow {
                    station_id,
                    station_registered_at,
                    station_location: parse_stored::<Location>(&station_location)?,
                    reception_id,
                    reception_created_at,
                    reception_status: parse_stored::<ReceptionStatus>(&reception_status)?,
                    item_id,
                    item_created_at,
                    item_category: item_category
                        .as_deref()
                        .map(parse_stored::<ItemCategory>)
                        .transpose()?,
                })
            })
            .collect()
    }

    async fn health_check(&self) -> Result<bool, CoreError> {
        let row: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&self.pool).await?;
        Ok(row.0 == 1)
    }
}

/// Parse a value read back from the database into its closed enum.
///
/// Failure here means the stored data violates the schema's CHECK
/// constraints, so it is reported as a storage fault, not a domain error.
fn parse_stored<T: std::str::FromStr<Err = crate::model::UnknownValue>>(
    raw: &str,
) -> Result<T, CoreError> {
    raw.parse().map_err(|e: crate::model::UnknownValue| {
        CoreError::Database {
            operation: "decode",
            details: e.to_string(),
        }
    })
}

/// One open Postgres transaction.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn lock_station(&mut self, id: Uuid) -> Result<Option<StationRecord>, CoreError> {
        let record = sqlx::query_as::<_, StationRecord>(
            r#"
            SELECT id, registered_at, location
            FROM stations
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(record)
    }

    async fn insert_station(&mut self, new: NewStation) -> Result<StationRecord, CoreError> {
        let result = sqlx::query_as::<_, StationRecord>(
            r#"
            INSERT INTO stations (id, registered_at, location)
            VALUES (COALESCE($1, gen_random_uuid()), COALESCE($2, NOW()), $3)
            RETURNING id, registered_at, location
            "#,
        )
        .bind(new.id)
        .bind(new.registered_at)
        .bind(new.location.as_str())
        .fetch_one(&mut *self.tx)
        .await;

        match result {
            Ok(record) => Ok(record),
            Err(e) if constraint_violated(&e, "stations_pkey") => Err(CoreError::AlreadyExists {
                kind: "station",
                id: new.id.unwrap_or_default(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn current_reception(
        &mut self,
        station_id: Uuid,
    ) -> Result<Option<ReceptionRecord>, CoreError> {
        let record = sqlx::query_as::<_, ReceptionRecord>(
            r#"
            SELECT id, created_at, station_id, status::text AS status
            FROM receptions
            WHERE station_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(station_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(record)
    }

    async fn insert_reception(&mut self, station_id: Uuid) -> Result<ReceptionRecord, CoreError> {
        let result = sqlx::query_as::<_, ReceptionRecord>(
            r#"
            INSERT INTO receptions (station_id, status)
            VALUES ($1, 'collecting')
            RETURNING id, created_at, station_id, status::text AS status
            "#,
        )
        .bind(station_id)
        .fetch_one(&mut *self.tx)
        .await;

        match result {
            Ok(record) => Ok(record),
            // A concurrent transaction opened a reception first; surface
            // the same conflict the engine reports when it sees one.
            Err(e) if constraint_violated(&e, ONE_COLLECTING_PER_STATION) => {
                Err(CoreError::ReceptionNotClosed { station_id })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn close_reception(
        &mut self,
        reception_id: Uuid,
    ) -> Result<ReceptionRecord, CoreError> {
        let record = sqlx::query_as::<_, ReceptionRecord>(
            r#"
            UPDATE receptions
            SET status = 'closed'
            WHERE id = $1
            RETURNING id, created_at, station_id, status::text AS status
            "#,
        )
        .bind(reception_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        record.ok_or(CoreError::NotFound {
            kind: "reception",
            id: reception_id,
        })
    }

    async fn insert_item(
        &mut self,
        reception_id: Uuid,
        category: ItemCategory,
    ) -> Result<ItemRecord, CoreError> {
        let record = sqlx::query_as::<_, ItemRecord>(
            r#"
            INSERT INTO items (reception_id, category)
            VALUES ($1, $2)
            RETURNING id, created_at, category, reception_id
            "#,
        )
        .bind(reception_id)
        .bind(category.as_str())
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(record)
    }

    async fn delete_last_item(
        &mut self,
        reception_id: Uuid,
    ) -> Result<Option<ItemRecord>, CoreError> {
        // Strict LIFO: latest created_at wins, seq breaks same-timestamp ties.
        let record = sqlx::query_as::<_, ItemRecord>(
            r#"
            DELETE FROM items
            WHERE id = (
                SELECT id
                FROM items
                WHERE reception_id = $1
                ORDER BY created_at DESC, seq DESC
                LIMIT 1
            )
            RETURNING id, created_at, category, reception_id
            "#,
        )
        .bind(reception_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(record)
    }

    async fn commit(self: Box<Self>) -> Result<(), CoreError> {
        self.tx.commit().await.map_err(|e| CoreError::Database {
            operation: "commit",
            details: e.to_string(),
        })
    }

    async fn rollback(self: Box<Self>) -> Result<(), CoreError> {
        self.tx.rollback().await.map_err(|e| CoreError::Database {
            operation: "rollback",
            details: e.to_string(),
        })
    }
}

/// True when the error is a constraint violation against the named
/// constraint or index.
fn constraint_violated(err: &sqlx::Error, name: &str) -> bool {
    match err {
        sqlx::Error::Database(db) => db.constraint() == Some(name),
        _ => false,
    }
}
