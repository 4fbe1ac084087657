// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Products: the stocked items referenced by stock moves.
//!
//! Products deduplicate on a four-part natural key (name, material, size,
//! unit). The optional members treat an empty or whitespace-only string the
//! same as an absent value; without that normalization, `size = ""` and
//! `size = null` would create two rows that never reconcile.
//!
//! Products are never deleted. Archiving sets a timestamp that excludes the
//! row from active listings while keeping its ledger history intact.

use crate::base::ProductId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A stocked item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub material: Option<String>,
    pub size: Option<String>,
    pub unit: String,
    pub opening_stock: Decimal,
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// The normalized natural key of this row.
    pub fn key(&self) -> ProductKey {
        ProductKey::new(
            &self.name,
            self.material.as_deref(),
            self.size.as_deref(),
            &self.unit,
        )
    }

    /// Archived products are excluded from active listings but remain
    /// referenced by historical ledger entries.
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

/// Normalized natural key for product deduplication.
///
/// All four members must match for two descriptors to resolve to the same
/// row. Optional members are normalized so that `""`, `"  "`, and an absent
/// value compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductKey {
    name: String,
    material: Option<String>,
    size: Option<String>,
    unit: String,
}

impl ProductKey {
    pub fn new(name: &str, material: Option<&str>, size: Option<&str>, unit: &str) -> Self {
        ProductKey {
            name: name.to_string(),
            material: normalize(material),
            size: normalize(size),
            unit: unit.to_string(),
        }
    }
}

/// Collapses empty and whitespace-only strings to "no value".
fn normalize(field: Option<&str>) -> Option<String> {
    match field {
        Some(s) if !s.trim().is_empty() => Some(s.to_string()),
        _ => None,
    }
}
