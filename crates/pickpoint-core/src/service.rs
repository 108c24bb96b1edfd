// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Service facade: transaction boundary around the engines.
//!
//! Each lifecycle call begins one unit of work, runs the engine inside it,
//! and commits on success or rolls back on error. The report path is
//! read-only and goes straight to storage.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::error::CoreError;
use crate::lifecycle;
use crate::model::ItemCategory;
use crate::report::{self, ReportQuery, StationReport};
use crate::storage::{ItemRecord, NewStation, ReceptionRecord, StationRecord, Storage, UnitOfWork};

/// Pickup-point intake service.
///
/// Cheap to clone; all handlers share one storage backend.
#[derive(Clone)]
pub struct PickpointService {
    storage: Arc<dyn Storage>,
}

impl PickpointService {
    /// Build the service over a storage backend.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Register a new station.
    pub async fn create_station(&self, new: NewStation) -> Result<StationRecord, CoreError> {
        let mut uow = self.storage.begin().await?;
        let result = lifecycle::create_station(uow.as_mut(), new).await;
        finish(uow, result).await
    }

    /// Open a reception at the station.
    pub async fn open_reception(&self, station_id: Uuid) -> Result<ReceptionRecord, CoreError> {
        let mut uow = self.storage.begin().await?;
        let result = lifecycle::open_reception(uow.as_mut(), station_id).await;
        finish(uow, result).await
    }

    /// Add an item to the station's current reception.
    pub async fn add_item(
        &self,
        station_id: Uuid,
        category: ItemCategory,
    ) -> Result<ItemRecord, CoreError> {
        let mut uow = self.storage.begin().await?;
        let result = lifecycle::add_item(uow.as_mut(), station_id, category).await;
        finish(uow, result).await
    }

    /// Remove the most recently added item from the station's current
    /// reception.
    pub async fn remove_last_item(&self, station_id: Uuid) -> Result<ItemRecord, CoreError> {
        let mut uow = self.storage.begin().await?;
        let result = lifecycle::remove_last_item(uow.as_mut(), station_id).await;
        finish(uow, result).await
    }

    /// Close the station's current reception.
    pub async fn close_reception(&self, station_id: Uuid) -> Result<ReceptionRecord, CoreError> {
        let mut uow = self.storage.begin().await?;
        let result = lifecycle::close_reception(uow.as_mut(), station_id).await;
        finish(uow, result).await
    }

    /// Windowed reception report, folded into station → reception → item
    /// nesting. Validates the query before touching storage.
    pub async fn list_report(&self, query: ReportQuery) -> Result<Vec<StationReport>, CoreError> {
        let window = query.window()?;
        let rows = self.storage.report_rows(&window).await?;
        Ok(report::fold_rows(rows))
    }

    /// Check that storage is reachable.
    pub async fn health_check(&self) -> Result<bool, CoreError> {
        self.storage.health_check().await
    }
}

/// Commit on success, roll back on error.
///
/// A rollback failure is logged and swallowed; the original engine error is
/// what the caller needs to see.
async fn finish<T>(uow: Box<dyn UnitOfWork>, result: Result<T, CoreError>) -> Result<T, CoreError> {
    match result {
        Ok(value) => {
            uow.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rb) = uow.rollback().await {
                warn!(error = %rb, "rollback failed");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Location, ReceptionStatus};
    use crate::storage::memory::MemoryStorage;
    use chrono::{Duration, TimeZone, Utc};

    fn service(storage: &MemoryStorage) -> PickpointService {
        PickpointService::new(Arc::new(storage.clone()))
    }

    #[tokio::test]
    async fn test_successful_operation_is_committed() {
        let storage = MemoryStorage::new();
        let station = storage.seed_station(Location::Moscow);
        let svc = service(&storage);

        let reception = svc.open_reception(station.id).await.unwrap();

        let committed = storage.committed_receptions(station.id);
        assert_eq!(committed.len(), 1);
        assert_eq!(committed[0].id, reception.id);
        assert_eq!(committed[0].status, ReceptionStatus::Collecting);
    }

    #[tokio::test]
    async fn test_failed_operation_leaves_no_trace() {
        let storage = MemoryStorage::new();
        let station = storage.seed_station(Location::Moscow);
        let svc = service(&storage);

        // No open reception, so this fails after the station lock.
        let err = svc.remove_last_item(station.id).await.unwrap_err();
        assert!(matches!(err, CoreError::NoOpenReception { .. }));

        assert!(storage.committed_receptions(station.id).is_empty());
    }

    #[tokio::test]
    async fn test_begin_failure_surfaces_as_database_error() {
        let storage = MemoryStorage::new();
        let station = storage.seed_station(Location::Moscow);
        storage.set_fail_begin();
        let svc = service(&storage);

        let err = svc.open_reception(station.id).await.unwrap_err();
        assert!(matches!(err, CoreError::Database { .. }));
    }

    #[tokio::test]
    async fn test_full_intake_flow() {
        let storage = MemoryStorage::new();
        let station = storage.seed_station(Location::Kazan);
        let svc = service(&storage);

        let reception = svc.open_reception(station.id).await.unwrap();
        svc.add_item(station.id, ItemCategory::Electronics)
            .await
            .unwrap();
        svc.add_item(station.id, ItemCategory::Clothing)
            .await
            .unwrap();
        let removed = svc.remove_last_item(station.id).await.unwrap();
        assert_eq!(removed.category, ItemCategory::Clothing);

        let closed = svc.close_reception(station.id).await.unwrap();
        assert_eq!(closed.id, reception.id);
        assert_eq!(closed.status, ReceptionStatus::Closed);

        let remaining = storage.committed_items(reception.id);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].category, ItemCategory::Electronics);

        // Closed means closed: a fresh reception can open now.
        let next = svc.open_reception(station.id).await.unwrap();
        assert_ne!(next.id, reception.id);
    }

    #[tokio::test]
    async fn test_list_report_windows_receptions() {
        let storage = MemoryStorage::new();
        let station = storage.seed_station(Location::Moscow);
        let old = storage.seed_reception(station.id, ReceptionStatus::Closed);
        storage.seed_item(old.id, ItemCategory::Electronics);
        storage.seed_item(old.id, ItemCategory::Footwear);
        let newer = storage.seed_reception(station.id, ReceptionStatus::Closed);
        let newest = storage.seed_reception(station.id, ReceptionStatus::Collecting);
        let svc = service(&storage);

        // Bounds bracket the fake clock used by the in-memory backend.
        let base = ReportQuery {
            start: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            page: 1,
            page_size: 2,
        };

        // Page 1: the two most recent receptions, no items on either.
        let page1 = svc.list_report(base).await.unwrap();
        assert_eq!(page1.len(), 1);
        let rec_ids: Vec<Uuid> = page1[0]
            .receptions
            .iter()
            .map(|r| r.reception.id)
            .collect();
        assert_eq!(rec_ids, vec![newest.id, newer.id]);
        assert!(page1[0].receptions.iter().all(|r| r.items.is_empty()));

        // Page 2: the old reception with both items, scan order.
        let page2 = svc
            .list_report(ReportQuery { page: 2, ..base })
            .await
            .unwrap();
        assert_eq!(page2.len(), 1);
        assert_eq!(page2[0].receptions.len(), 1);
        assert_eq!(page2[0].receptions[0].reception.id, old.id);
        let cats: Vec<ItemCategory> = page2[0].receptions[0]
            .items
            .iter()
            .map(|i| i.category)
            .collect();
        assert_eq!(cats, vec![ItemCategory::Electronics, ItemCategory::Footwear]);

        // Page past the end is empty, not an error.
        let page3 = svc
            .list_report(ReportQuery { page: 3, ..base })
            .await
            .unwrap();
        assert!(page3.is_empty());
    }

    #[tokio::test]
    async fn test_list_report_pages_stay_disjoint_on_tied_timestamps() {
        let storage = MemoryStorage::new();
        let station = storage.seed_station(Location::Moscow);
        let tied_at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap();
        let mut expected: Vec<Uuid> = (0..3)
            .map(|_| {
                storage
                    .seed_reception_at(station.id, ReceptionStatus::Closed, tied_at)
                    .id
            })
            .collect();
        expected.sort();
        expected.reverse();
        let svc = service(&storage);

        let base = ReportQuery {
            start: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            page: 1,
            page_size: 1,
        };

        // Page through one reception at a time; ids break the timestamp
        // tie, so the concatenation reproduces the unpaginated order.
        let mut seen = Vec::new();
        for page in 1..=3 {
            let report = svc
                .list_report(ReportQuery { page, ..base })
                .await
                .unwrap();
            assert_eq!(report.len(), 1);
            assert_eq!(report[0].receptions.len(), 1);
            seen.push(report[0].receptions[0].reception.id);
        }
        assert_eq!(seen, expected);

        let whole = svc
            .list_report(ReportQuery {
                page_size: 30,
                ..base
            })
            .await
            .unwrap();
        let all: Vec<Uuid> = whole[0]
            .receptions
            .iter()
            .map(|r| r.reception.id)
            .collect();
        assert_eq!(all, seen);
    }

    #[tokio::test]
    async fn test_list_report_rejects_invalid_query_before_storage() {
        let storage = MemoryStorage::new();
        storage.set_fail_begin();
        let svc = service(&storage);

        let now = Utc::now();
        let err = svc
            .list_report(ReportQuery {
                start: now,
                end: now - Duration::hours(1),
                page: 1,
                page_size: 10,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::DateRangeInverted));
    }
}
