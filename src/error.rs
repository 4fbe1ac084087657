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

//! Error types for ledger operations.
//!
//! The taxonomy separates "your input was invalid" from "the system failed
//! to persist a valid request": validation errors never reach the store,
//! while resolution and submit errors carry the store's failure verbatim.

use crate::base::{PartyId, ProductId};
use crate::validate::ValidationErrors;
use thiserror::Error;

/// Storage-layer failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A referenced party row does not exist.
    #[error("party not found: {0}")]
    PartyNotFound(PartyId),

    /// A referenced product row does not exist.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// The party name is already claimed. Two writers racing the same
    /// find-or-create key is the accepted way to hit this.
    #[error("a party named {0:?} already exists")]
    DuplicateParty(String),

    /// The product natural key is already claimed.
    #[error("a product with the same name, material, size, and unit already exists: {0:?}")]
    DuplicateProduct(String),
}

/// Request-processing failures, grouped by the stage that failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    /// The request shape or a cross-field constraint was rejected. Raised
    /// before any store interaction; carries per-field detail.
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// An entity referenced by identifier does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Find-or-create failed. `item` names the offending line item, when the
    /// failure belongs to one.
    #[error("could not resolve referenced entity: {source}")]
    Resolution {
        item: Option<usize>,
        source: StoreError,
    },

    /// The all-or-nothing submit was rejected by the store. Nothing was
    /// written.
    #[error("atomic submit failed: {source}")]
    Submit { source: StoreError },
}

impl LedgerError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        LedgerError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
