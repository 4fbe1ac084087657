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

//! Read-side ledger projections.
//!
//! The projections merge the two entry streams (stock moves and payments)
//! into display rows: reverse-chronological, with insertion order preserved
//! among entries that share a timestamp. Each row gets a classification and
//! a debit/credit split derived from the same sign convention as the balance
//! fold; no new convention is invented here.

use crate::balance::PartyTotals;
use crate::base::{EntryId, PartyId};
use crate::entry::{LedgerEntry, MoveKind, Payment, PaymentDirection, PaymentMethod, StockMove};
use crate::party::PartyRole;
use crate::store::Store;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;

/// Display classification of a merged ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    Sale,
    Purchase,
    PaymentReceived,
    PaymentMade,
}

/// One row of the merged ledger view.
///
/// `debit` holds amounts billed to or paid out for the party (the
/// receivable side); `credit` holds amounts purchased from or received of
/// the party. Exactly one of the two is non-zero per row.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerRow {
    pub id: EntryId,
    pub created_at: DateTime<Utc>,
    pub party_id: PartyId,
    pub party_name: String,
    pub kind: RowKind,
    pub detail: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub method: Option<PaymentMethod>,
    pub settled_amount: Option<Decimal>,
    pub target_party_name: Option<String>,
    #[serde(skip)]
    seq: u64,
}

/// A party row decorated with its ledger totals, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct PartySummary {
    pub id: PartyId,
    pub name: String,
    pub role: PartyRole,
    pub phone: Option<String>,
    pub total_purchases: Decimal,
    pub total_sales: Decimal,
    pub balance: Decimal,
}

/// The merged ledger of one party, newest first.
pub fn party_ledger(store: &Store, party_id: PartyId) -> Vec<LedgerRow> {
    rows(store, store.entries_for_party(party_id))
}

/// The merged ledger of every party, newest first.
pub fn global_ledger(store: &Store) -> Vec<LedgerRow> {
    rows(store, store.all_entries())
}

/// All parties with their totals and computed balance, name-ordered.
///
/// One pass over the ledger accumulates the per-party totals; parties with
/// no entries get zeroed totals and `balance = opening_balance`.
pub fn parties_with_totals(store: &Store) -> Vec<PartySummary> {
    let mut totals: HashMap<PartyId, PartyTotals> = HashMap::new();
    for entry in store.all_entries() {
        totals.entry(entry.party_id()).or_default().add(&entry);
    }

    let mut summaries: Vec<PartySummary> = store
        .parties()
        .into_iter()
        .map(|party| {
            let t = totals.get(&party.id).copied().unwrap_or_default();
            PartySummary {
                id: party.id,
                name: party.name,
                role: party.role,
                phone: party.phone,
                total_purchases: t.purchases_total,
                total_sales: t.sales_total,
                balance: t.balance(party.opening_balance),
            }
        })
        .collect();
    summaries.sort_by(|a, b| a.name.cmp(&b.name));
    summaries
}

/// Writes ledger rows as CSV, in the order given.
pub fn write_csv<W: Write>(rows: &[LedgerRow], writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn rows(store: &Store, mut entries: Vec<LedgerEntry>) -> Vec<LedgerRow> {
    // Newest first; entries sharing a timestamp keep insertion order.
    entries.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then(a.seq().cmp(&b.seq()))
    });
    entries.iter().map(|entry| row(store, entry)).collect()
}

fn row(store: &Store, entry: &LedgerEntry) -> LedgerRow {
    match entry {
        LedgerEntry::StockMove(m) => stock_move_row(store, m),
        LedgerEntry::Payment(p) => payment_row(store, p),
    }
}

fn stock_move_row(store: &Store, m: &StockMove) -> LedgerRow {
    let (kind, debit, credit) = match m.kind {
        MoveKind::Sale => (RowKind::Sale, m.total_amount, Decimal::ZERO),
        MoveKind::Purchase => (RowKind::Purchase, Decimal::ZERO, m.total_amount),
    };
    let (product_name, product_unit) = store
        .get_product(m.product_id)
        .map(|p| (p.name, p.unit))
        .unwrap_or_else(|| (m.product_id.to_string(), "units".to_string()));

    LedgerRow {
        id: m.id,
        created_at: m.created_at,
        party_id: m.party_id,
        party_name: party_name(store, m.party_id),
        kind,
        detail: format!(
            "{} {} of {} @ {}",
            m.quantity, product_unit, product_name, m.price_per_unit
        ),
        debit,
        credit,
        method: None,
        settled_amount: None,
        target_party_name: None,
        seq: m.seq,
    }
}

fn payment_row(store: &Store, p: &Payment) -> LedgerRow {
    let (kind, debit, credit) = match p.direction {
        PaymentDirection::In => (RowKind::PaymentReceived, Decimal::ZERO, p.amount),
        PaymentDirection::Out => (RowKind::PaymentMade, p.amount, Decimal::ZERO),
    };
    let detail = p
        .notes
        .clone()
        .unwrap_or_else(|| method_label(p.method).to_string());

    LedgerRow {
        id: p.id,
        created_at: p.created_at,
        party_id: p.party_id,
        party_name: party_name(store, p.party_id),
        kind,
        detail,
        debit,
        credit,
        method: Some(p.method),
        settled_amount: p.settlement.as_ref().map(|link| link.amount),
        target_party_name: p
            .settlement
            .as_ref()
            .map(|link| party_name(store, link.target_party_id)),
        seq: p.seq,
    }
}

fn party_name(store: &Store, id: PartyId) -> String {
    store
        .get_party(id)
        .map(|p| p.name)
        .unwrap_or_else(|| id.to_string())
}

fn method_label(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Cash => "cash",
        PaymentMethod::Upi => "upi",
        PaymentMethod::Cheque => "cheque",
    }
}
