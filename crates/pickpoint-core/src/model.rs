// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Closed domain vocabularies: station locations, item categories, and
//! reception statuses.
//!
//! All three sets are deliberately closed enums. Anything outside the
//! permitted values is rejected at deserialization, so the engine never
//! sees a free-form string.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a string does not name a member of a closed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownValue {
    /// Which vocabulary was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl fmt::Display for UnknownValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownValue {}

/// Permitted station locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    /// Moscow.
    Moscow,
    /// Saint Petersburg.
    #[serde(rename = "Saint Petersburg")]
    SaintPetersburg,
    /// Kazan.
    Kazan,
}

impl Location {
    /// Canonical string form, as stored and as serialized.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Moscow => "Moscow",
            Self::SaintPetersburg => "Saint Petersburg",
            Self::Kazan => "Kazan",
        }
    }
}

impl FromStr for Location {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Moscow" => Ok(Self::Moscow),
            "Saint Petersburg" => Ok(Self::SaintPetersburg),
            "Kazan" => Ok(Self::Kazan),
            other => Err(UnknownValue {
                kind: "location",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Location {
    type Error = UnknownValue;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permitted item categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    /// Consumer electronics.
    Electronics,
    /// Clothing.
    Clothing,
    /// Footwear.
    Footwear,
}

impl ItemCategory {
    /// Canonical string form, as stored and as serialized.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Electronics => "electronics",
            Self::Clothing => "clothing",
            Self::Footwear => "footwear",
        }
    }
}

impl FromStr for ItemCategory {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "electronics" => Ok(Self::Electronics),
            "clothing" => Ok(Self::Clothing),
            "footwear" => Ok(Self::Footwear),
            other => Err(UnknownValue {
                kind: "item category",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for ItemCategory {
    type Error = UnknownValue;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reception lifecycle status.
///
/// A reception is created `collecting` and moves to `closed` exactly once;
/// there are no other states or transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceptionStatus {
    /// Open for item intake.
    Collecting,
    /// Finalized; immutable from here on.
    Closed,
}

impl ReceptionStatus {
    /// Canonical string form, as stored (`status::text`) and as serialized.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Collecting => "collecting",
            Self::Closed => "closed",
        }
    }
}

impl FromStr for ReceptionStatus {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collecting" => Ok(Self::Collecting),
            "closed" => Ok(Self::Closed),
            other => Err(UnknownValue {
                kind: "reception status",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for ReceptionStatus {
    type Error = UnknownValue;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ReceptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
