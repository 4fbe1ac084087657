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

//! Party balance computation.
//!
//! Balances are derived, never stored. A party's balance is its opening
//! balance plus the fold of its ledger entries:
//!
//! ```text
//! balance = opening + sales − purchases − payments in + payments out
//! ```
//!
//! Positive means the party owes the business (a receivable); negative means
//! the business owes the party (a payable). The convention holds regardless
//! of the party's role.
//!
//! The fold is a plain commutative summation, so the result is independent
//! of entry order, and an entry contributes to exactly one subtotal because
//! it carries exactly one kind tag.

use crate::entry::{LedgerEntry, MoveKind, PaymentDirection};
use rust_decimal::Decimal;
use serde::Serialize;

/// Subtotals of a party's ledger entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PartyTotals {
    pub sales_total: Decimal,
    pub purchases_total: Decimal,
    pub payments_in_total: Decimal,
    pub payments_out_total: Decimal,
}

impl PartyTotals {
    /// Folds one entry into the running totals.
    pub fn add(&mut self, entry: &LedgerEntry) {
        match entry {
            LedgerEntry::StockMove(m) => match m.kind {
                MoveKind::Sale => self.sales_total += m.total_amount,
                MoveKind::Purchase => self.purchases_total += m.total_amount,
            },
            LedgerEntry::Payment(p) => match p.direction {
                PaymentDirection::In => self.payments_in_total += p.amount,
                PaymentDirection::Out => self.payments_out_total += p.amount,
            },
        }
    }

    /// Applies the totals to an opening balance.
    pub fn balance(&self, opening_balance: Decimal) -> Decimal {
        opening_balance + self.sales_total - self.purchases_total - self.payments_in_total
            + self.payments_out_total
    }
}

/// Sums the subtotals of an unordered entry set.
pub fn totals<'a, I>(entries: I) -> PartyTotals
where
    I: IntoIterator<Item = &'a LedgerEntry>,
{
    let mut acc = PartyTotals::default();
    for entry in entries {
        acc.add(entry);
    }
    acc
}

/// Computes a party's current balance from its opening balance and its
/// complete entry set.
pub fn balance<'a, I>(opening_balance: Decimal, entries: I) -> Decimal
where
    I: IntoIterator<Item = &'a LedgerEntry>,
{
    totals(entries).balance(opening_balance)
}
