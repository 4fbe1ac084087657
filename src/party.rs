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

//! Parties: the counterparties of the ledger.
//!
//! A party is a customer, a supplier, both, or some other counterparty. The
//! party name is a unique natural key; parties are created on first reference
//! and never deleted. A party's balance is derived from its ledger entries
//! (see [`crate::balance`]), never stored on the row.

use crate::base::PartyId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which side of the ledger a party usually sits on.
///
/// The role guides UI selection only; nothing prevents recording a sale
/// against a supplier or a purchase from a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyRole {
    Customer,
    Supplier,
    Both,
    Other,
}

/// A ledger counterparty.
///
/// `opening_balance` is signed: positive means the party owed the business
/// before any recorded entries, negative means the business owed the party.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub id: PartyId,
    pub name: String,
    pub role: PartyRole,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub opening_balance: Decimal,
    pub created_at: DateTime<Utc>,
}
