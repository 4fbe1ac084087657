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

//! Find-or-create resolution for parties and products.
//!
//! Resolution is lookup-then-insert on a natural key: a party's name, or a
//! product's normalized (name, material, size, unit) tuple. A hit returns
//! the existing row untouched; a miss inserts.
//!
//! Two writers racing the same key are allowed to collide: the loser's
//! insert fails with a duplicate-key error which the caller surfaces as a
//! creation failure. That race is accepted and never retried; resolving the
//! same key again afterwards finds the winner's row.

use crate::error::StoreError;
use crate::party::Party;
use crate::product::Product;
use crate::store::Store;
use crate::validate::{NewParty, ProductSpec};

/// Returns the party with the request's name, inserting it on first
/// reference. An existing row is returned as-is; the request's other fields
/// do not update it.
pub fn resolve_party(store: &Store, new: &NewParty) -> Result<Party, StoreError> {
    if let Some(existing) = store.find_party_by_name(&new.name) {
        tracing::debug!(party = %existing.id, name = %existing.name, "party resolved to existing row");
        return Ok(existing);
    }
    store.insert_party(new)
}

/// Returns the product matching the descriptor's normalized natural key,
/// inserting it on first reference.
pub fn resolve_product(store: &Store, spec: &ProductSpec) -> Result<Product, StoreError> {
    if let Some(existing) = store.find_product_by_key(&spec.key()) {
        tracing::debug!(product = %existing.id, name = %existing.name, "product resolved to existing row");
        return Ok(existing);
    }
    store.insert_product(spec)
}
