// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for pickpoint-core.
//!
//! The variants are the domain error taxonomy; the boundary layer owns
//! formatting them into transport responses. Storage failures that are not
//! a recognized domain condition are wrapped as [`CoreError::Database`] and
//! never leak driver detail past `Display`.

use std::fmt;

use uuid::Uuid;

/// Result type using CoreError
pub type Result<T> = std::result::Result<T, CoreError>;

/// Domain errors produced by the lifecycle and reporting engines.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum CoreError {
    /// A referenced object (station, reception) is absent.
    NotFound {
        /// What kind of object was looked up ("station", "reception").
        kind: &'static str,
        /// The id that was not found.
        id: Uuid,
    },

    /// A new reception cannot begin while one is still collecting.
    ReceptionNotClosed {
        /// The station whose current reception is still open.
        station_id: Uuid,
    },

    /// Mutation attempted against a reception that is not collecting.
    ReceptionNotInProgress {
        /// The reception that is already closed.
        reception_id: Uuid,
    },

    /// An operation needed an open reception and the station has none.
    NoOpenReception {
        /// The station with nothing to act on.
        station_id: Uuid,
    },

    /// Item removal attempted on a reception that holds no items.
    NoItems {
        /// The empty reception.
        reception_id: Uuid,
    },

    /// Report window has its start after its end.
    DateRangeInverted,

    /// Creation collided with an existing identity.
    AlreadyExists {
        /// What kind of object collided.
        kind: &'static str,
        /// The duplicated id.
        id: Uuid,
    },

    /// Input validation failed before any storage access.
    Validation {
        /// The field that failed validation.
        field: &'static str,
        /// The validation error message.
        message: String,
    },

    /// Storage operation failed.
    Database {
        /// The operation that failed.
        operation: &'static str,
        /// Error details.
        details: String,
    },
}

impl CoreError {
    /// Get the stable error code string for this error kind.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::ReceptionNotClosed { .. } => "RECEPTION_NOT_CLOSED",
            Self::ReceptionNotInProgress { .. } => "RECEPTION_NOT_IN_PROGRESS",
            Self::NoOpenReception { .. } => "NO_OPEN_RECEPTION",
            Self::NoItems { .. } => "NO_ITEMS",
            Self::DateRangeInverted => "DATE_RANGE_INVERTED",
            Self::AlreadyExists { .. } => "ALREADY_EXISTS",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Database { .. } => "DATABASE_ERROR",
        }
    }

    /// Whether this error reports a broken business rule rather than a
    /// missing object or an infrastructure failure.
    pub fn is_domain_rule(&self) -> bool {
        matches!(
            self,
            Self::ReceptionNotClosed { .. }
                | Self::ReceptionNotInProgress { .. }
                | Self::NoOpenReception { .. }
                | Self::NoItems { .. }
                | Self::DateRangeInverted
                | Self::AlreadyExists { .. }
                | Self::Validation { .. }
        )
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { kind, id } => {
                write!(f, "{} '{}' not found", kind, id)
            }
            Self::ReceptionNotClosed { station_id } => {
                write!(
                    f,
                    "reception at station '{}' is not closed yet",
                    station_id
                )
            }
            Self::ReceptionNotInProgress { reception_id } => {
                write!(f, "reception '{}' is not in progress", reception_id)
            }
            Self::NoOpenReception { station_id } => {
                write!(f, "station '{}' has no open reception", station_id)
            }
            Self::NoItems { reception_id } => {
                write!(f, "reception '{}' has no items", reception_id)
            }
            Self::DateRangeInverted => {
                write!(f, "start date is after end date")
            }
            Self::AlreadyExists { kind, id } => {
                write!(f, "{} '{}' already exists", kind, id)
            }
            Self::Validation { field, message } => {
                write!(f, "validation error for '{}': {}", field, message)
            }
            Self::Database { operation, details } => {
                write!(f, "database error during '{}': {}", operation, details)
            }
        }
    }
}

impl std::error::Error for CoreError {}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        CoreError::Database {
            operation: "query",
            details: err.to_string(),
        }
    }
}
