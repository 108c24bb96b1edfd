// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Reporting engine: windowed reception report, folded into a tree.
//!
//! The window (date range + pagination) applies to receptions, not to the
//! raw joined rows, so a reception with many items never starves the page.
//! The flat rows coming back from storage are folded into
//! station → reception → item nesting in one pass, preserving row order.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::CoreError;
use crate::storage::{ItemRecord, ReceptionRecord, ReportRow, ReportWindow, StationRecord};

/// Largest allowed page size.
pub const MAX_PAGE_SIZE: i64 = 30;

/// Validated inputs for the reception report.
#[derive(Debug, Clone, Copy)]
pub struct ReportQuery {
    /// Inclusive lower bound on reception creation time.
    pub start: DateTime<Utc>,
    /// Inclusive upper bound on reception creation time.
    pub end: DateTime<Utc>,
    /// 1-based page number.
    pub page: i64,
    /// Receptions per page.
    pub page_size: i64,
}

impl ReportQuery {
    /// Validate the query and translate it into a storage window.
    ///
    /// Rejects an inverted date range and out-of-bounds pagination before
    /// any storage access happens.
    pub fn window(&self) -> Result<ReportWindow, CoreError> {
        if self.start > self.end {
            return Err(CoreError::DateRangeInverted);
        }
        if self.page < 1 {
            return Err(CoreError::Validation {
                field: "page",
                message: "must be at least 1".to_string(),
            });
        }
        if self.page_size < 1 || self.page_size > MAX_PAGE_SIZE {
            return Err(CoreError::Validation {
                field: "limit",
                message: format!("must be between 1 and {MAX_PAGE_SIZE}"),
            });
        }

        // A page number large enough to overflow the offset can never hold
        // data; reject it instead of wrapping.
        let offset = self
            .page
            .checked_sub(1)
            .and_then(|skipped| skipped.checked_mul(self.page_size))
            .ok_or(CoreError::Validation {
                field: "page",
                message: "is out of range".to_string(),
            })?;

        Ok(ReportWindow {
            start: self.start,
            end: self.end,
            offset,
            limit: self.page_size,
        })
    }
}

/// One station with the receptions that fell into the window.
#[derive(Debug, Clone, PartialEq)]
pub struct StationReport {
    /// The station itself.
    pub station: StationRecord,
    /// Its receptions, most recent first.
    pub receptions: Vec<ReceptionReport>,
}

/// One reception with its items.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceptionReport {
    /// The reception itself.
    pub reception: ReceptionRecord,
    /// Items in scan order. Empty for a reception without items.
    pub items: Vec<ItemRecord>,
}

/// Fold flat joined rows into the nested report tree.
///
/// Stations and receptions appear in the output in first-encounter order,
/// which storage guarantees is reception creation time descending. Item
/// rows attach to the reception they arrived under; a null-item row
/// contributes the reception with an empty item list.
pub fn fold_rows(rows: Vec<ReportRow>) -> Vec<StationReport> {
    let mut stations: Vec<StationReport> = Vec::new();
    let mut station_index: HashMap<Uuid, usize> = HashMap::new();
    let mut reception_index: HashMap<Uuid, (usize, usize)> = HashMap::new();

    for row in rows {
        let si = match station_index.get(&row.station_id) {
            Some(&si) => si,
            None => {
                let si = stations.len();
                station_index.insert(row.station_id, si);
                stations.push(StationReport {
                    station: StationRecord {
                        id: row.station_id,
                        registered_at: row.station_registered_at,
                        location: row.station_location,
                    },
                    receptions: Vec::new(),
                });
                si
            }
        };

        let (si, ri) = match reception_index.get(&row.reception_id) {
            Some(&pos) => pos,
            None => {
                let ri = stations[si].receptions.len();
                reception_index.insert(row.reception_id, (si, ri));
                stations[si].receptions.push(ReceptionReport {
                    reception: ReceptionRecord {
                        id: row.reception_id,
                        created_at: row.reception_created_at,
                        station_id: row.station_id,
                        status: row.reception_status,
                    },
                    items: Vec::new(),
                });
                (si, ri)
            }
        };

        if let (Some(item_id), Some(item_created_at), Some(item_category)) =
            (row.item_id, row.item_created_at, row.item_category)
        {
            stations[si].receptions[ri].items.push(ItemRecord {
                id: item_id,
                created_at: item_created_at,
                category: item_category,
                reception_id: row.reception_id,
            });
        }
    }

    stations
}
