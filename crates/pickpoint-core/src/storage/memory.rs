// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! In-memory storage for unit tests.
//!
//! Mirrors the Postgres backend's observable behavior: writes are staged in
//! the unit of work and only become visible on commit, the
//! one-collecting-per-station rule is enforced on reception insert, and
//! item removal follows (created_at, seq) order.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::error::CoreError;
use crate::model::{ItemCategory, Location, ReceptionStatus};

use super::{
    ItemRecord, NewStation, ReceptionRecord, ReportRow, ReportWindow, StationRecord, Storage,
    UnitOfWork,
};

#[derive(Debug, Clone, Default)]
struct MemoryDb {
    stations: Vec<StationRecord>,
    receptions: Vec<ReceptionRecord>,
    // (seq, item): seq stands in for the identity column.
    items: Vec<(i64, ItemRecord)>,
    tick: i64,
}

impl MemoryDb {
    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    /// Monotonic fake clock: every write gets a distinct, increasing time.
    fn next_time(&mut self) -> DateTime<Utc> {
        self.tick += 1;
        Self::base_time() + Duration::seconds(self.tick)
    }
}

/// In-memory [`Storage`] with transactional staging.
#[derive(Clone, Default)]
pub(crate) struct MemoryStorage {
    db: Arc<Mutex<MemoryDb>>,
    fail_begin: Arc<Mutex<bool>>,
}

impl MemoryStorage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `begin` calls fail, for storage-failure paths.
    pub(crate) fn set_fail_begin(&self) {
        *self.fail_begin.lock().unwrap() = true;
    }

    /// Seed a committed station row.
    pub(crate) fn seed_station(&self, location: Location) -> StationRecord {
        let mut db = self.db.lock().unwrap();
        let record = StationRecord {
            id: Uuid::new_v4(),
            registered_at: db.next_time(),
            location,
        };
        db.stations.push(record.clone());
        record
    }

    /// Seed a committed reception row for the station.
    pub(crate) fn seed_reception(
        &self,
        station_id: Uuid,
        status: ReceptionStatus,
    ) -> ReceptionRecord {
        let created_at = self.db.lock().unwrap().next_time();
        self.seed_reception_at(station_id, status, created_at)
    }

    /// Seed a committed reception row with an explicit creation time, for
    /// same-timestamp ordering tests.
    pub(crate) fn seed_reception_at(
        &self,
        station_id: Uuid,
        status: ReceptionStatus,
        created_at: DateTime<Utc>,
    ) -> ReceptionRecord {
        let mut db = self.db.lock().unwrap();
        let record = ReceptionRecord {
            id: Uuid::new_v4(),
            created_at,
            station_id,
            status,
        };
        db.receptions.push(record.clone());
        record
    }

    /// Seed a committed item row for the reception.
    pub(crate) fn seed_item(&self, reception_id: Uuid, category: ItemCategory) -> ItemRecord {
        let mut db = self.db.lock().unwrap();
        let record = ItemRecord {
            id: Uuid::new_v4(),
            created_at: db.next_time(),
            category,
            reception_id,
        };
        let seq = db.tick;
        db.items.push((seq, record.clone()));
        record
    }

    /// Committed receptions for a station, for assertions.
    pub(crate) fn committed_receptions(&self, station_id: Uuid) -> Vec<ReceptionRecord> {
        self.db
            .lock()
            .unwrap()
            .receptions
            .iter()
            .filter(|r| r.station_id == station_id)
            .cloned()
            .collect()
    }

    /// Committed items for a reception, in insertion order.
    pub(crate) fn committed_items(&self, reception_id: Uuid) -> Vec<ItemRecord> {
        self.db
            .lock()
            .unwrap()
            .items
            .iter()
            .filter(|(_, i)| i.reception_id == reception_id)
            .map(|(_, i)| i.clone())
            .collect()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, CoreError> {
        if *self.fail_begin.lock().unwrap() {
            return Err(CoreError::Database {
                operation: "begin",
                details: "simulated begin failure".to_string(),
            });
        }
        let staged = self.db.lock().unwrap().clone();
        Ok(Box::new(MemoryUnitOfWork {
            shared: Arc::clone(&self.db),
            staged,
        }))
    }

    async fn report_rows(&self, window: &ReportWindow) -> Result<Vec<ReportRow>, CoreError> {
        let db = self.db.lock().unwrap();

        let mut receptions: Vec<&ReceptionRecord> = db
            .receptions
            .iter()
            .filter(|r| r.created_at >= window.start && r.created_at <= window.end)
            .collect();
        receptions.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        let windowed = receptions
            .into_iter()
            .skip(window.offset.max(0) as usize)
            .take(window.limit.max(0) as usize);

        let mut rows = Vec::new();
        for reception in windowed {
            let station = db
                .stations
                .iter()
                .find(|s| s.id == reception.station_id)
                .expect("reception references a seeded station");

            let mut items: Vec<&(i64, ItemRecord)> = db
                .items
                .iter()
                .filter(|(_, i)| i.reception_id == reception.id)
                .collect();
            items.sort_by_key(|(seq, i)| (i.created_at, *seq));

            if items.is_empty() {
                rows.push(ReportRow {
                    station_id: station.id,
                    station_registered_at: station.registered_at,
                    station_location: station.location,
                    reception_id: reception.id,
                    reception_created_at: reception.created_at,
                    reception_status: reception.status,
                    item_id: None,
                    item_created_at: None,
                    item_category: None,
                });
            } else {
                for (_, item) in items {
                    rows.push(ReportRow {
                        station_id: station.id,
                        station_registered_at: station.registered_at,
                        station_location: station.location,
                        reception_id: reception.id,
                        reception_created_at: reception.created_at,
                        reception_status: reception.status,
                        item_id: Some(item.id),
                        item_created_at: Some(item.created_at),
                        item_category: Some(item.category),
                    });
                }
            }
        }

        Ok(rows)
    }

    async fn health_check(&self) -> Result<bool, CoreError> {
        Ok(true)
    }
}

struct MemoryUnitOfWork {
    shared: Arc<Mutex<MemoryDb>>,
    staged: MemoryDb,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn lock_station(&mut self, id: Uuid) -> Result<Option<StationRecord>, CoreError> {
        Ok(self.staged.stations.iter().find(|s| s.id == id).cloned())
    }

    async fn insert_station(&mut self, new: NewStation) -> Result<StationRecord, CoreError> {
        if let Some(id) = new.id {
            if self.staged.stations.iter().any(|s| s.id == id) {
                return Err(CoreError::AlreadyExists {
                    kind: "station",
                    id,
                });
            }
        }
        let registered_at = match new.registered_at {
            Some(t) => t,
            None => self.staged.next_time(),
        };
        let record = StationRecord {
            id: new.id.unwrap_or_else(Uuid::new_v4),
            registered_at,
            location: new.location,
        };
        self.staged.stations.push(record.clone());
        Ok(record)
    }

    async fn current_reception(
        &mut self,
        station_id: Uuid,
    ) -> Result<Option<ReceptionRecord>, CoreError> {
        Ok(self
            .staged
            .receptions
            .iter()
            .filter(|r| r.station_id == station_id)
            .max_by_key(|r| (r.created_at, r.id))
            .cloned())
    }

    async fn insert_reception(&mut self, station_id: Uuid) -> Result<ReceptionRecord, CoreError> {
        // The partial unique index in the real schema.
        if self
            .staged
            .receptions
            .iter()
            .any(|r| r.station_id == station_id && r.status == ReceptionStatus::Collecting)
        {
            return Err(CoreError::ReceptionNotClosed { station_id });
        }
        let record = ReceptionRecord {
            id: Uuid::new_v4(),
            created_at: self.staged.next_time(),
            station_id,
            status: ReceptionStatus::Collecting,
        };
        self.staged.receptions.push(record.clone());
        Ok(record)
    }

    async fn close_reception(
        &mut self,
        reception_id: Uuid,
    ) -> Result<ReceptionRecord, CoreError> {
        let reception = self
            .staged
            .receptions
            .iter_mut()
            .find(|r| r.id == reception_id)
            .ok_or(CoreError::NotFound {
                kind: "reception",
                id: reception_id,
            })?;
        reception.status = ReceptionStatus::Closed;
        Ok(reception.clone())
    }

    async fn insert_item(
        &mut self,
        reception_id: Uuid,
        category: ItemCategory,
    ) -> Result<ItemRecord, CoreError> {
        let record = ItemRecord {
            id: Uuid::new_v4(),
            created_at: self.staged.next_time(),
            category,
            reception_id,
        };
        let seq = self.staged.tick;
        self.staged.items.push((seq, record.clone()));
        Ok(record)
    }

    async fn delete_last_item(
        &mut self,
        reception_id: Uuid,
    ) -> Result<Option<ItemRecord>, CoreError> {
        let last = self
            .staged
            .items
            .iter()
            .enumerate()
            .filter(|(_, (_, i))| i.reception_id == reception_id)
            .max_by_key(|(_, (seq, i))| (i.created_at, *seq))
            .map(|(idx, _)| idx);

        Ok(last.map(|idx| self.staged.items.remove(idx).1))
    }

    async fn commit(self: Box<Self>) -> Result<(), CoreError> {
        *self.shared.lock().unwrap() = self.staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), CoreError> {
        Ok(())
    }
}
