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

//! In-process relational store.
//!
//! The store holds the system's tables: parties, products, and the
//! append-only ledger of stock moves and payments. Ledger rows are never
//! updated or deleted.
//!
//! # Atomicity
//!
//! Multi-row writes go through [`Store::create_sale`] and
//! [`Store::create_purchase`], which check every precondition before the
//! first row is written and serialize their write section behind one mutex.
//! A rejected submit therefore leaves no partial rows. Single-row inserts
//! validate their references and write lock-free.
//!
//! # Reads
//!
//! Queries iterate the live tables without isolation from concurrent
//! writers; a report may reflect a snapshot that is immediately stale. The
//! domain tolerates that.
//!
//! # Ordering
//!
//! Each entry carries a monotonically increasing sequence number assigned at
//! insertion. Queries sort newest-first by timestamp and break ties with the
//! sequence number, so entries sharing a timestamp keep their original
//! relative order.

use crate::base::{EntryId, PartyId, ProductId};
use crate::entry::{
    LedgerEntry, MoveKind, Payment, PaymentDirection, PaymentMethod, SettlementLink, StockMove,
};
use crate::error::StoreError;
use crate::party::Party;
use crate::product::{Product, ProductKey};
use crate::validate::{NewParty, NewPayment, NewStockMove, ProductSpec};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// A money block attached to a quick bill.
#[derive(Debug, Clone)]
pub struct PaymentSpec {
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub instrument_ref: Option<String>,
}

/// A fully resolved line item, ready for the atomic procedures.
#[derive(Debug, Clone)]
pub struct ResolvedItem {
    pub product_id: ProductId,
    pub qty: Decimal,
    pub price_per_unit: Decimal,
}

/// A resolved quick-bill sale: line items, the collected payment, and an
/// optional settlement toward another party.
#[derive(Debug, Clone)]
pub struct SaleUnit {
    pub party_id: PartyId,
    pub bill_no: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub items: Vec<ResolvedItem>,
    pub payment: PaymentSpec,
    pub settlement: Option<SettlementLink>,
}

/// A resolved quick-bill purchase.
#[derive(Debug, Clone)]
pub struct PurchaseUnit {
    pub party_id: PartyId,
    pub bill_no: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub items: Vec<ResolvedItem>,
    pub payment: Option<PaymentSpec>,
}

/// Row identifiers written by a quick-bill sale.
#[derive(Debug, Clone, Serialize)]
pub struct SaleReceipt {
    pub stock_move_ids: Vec<EntryId>,
    pub payment_id: Option<EntryId>,
    pub settlement_payment_id: Option<EntryId>,
}

/// Row identifiers written by a quick-bill purchase.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseReceipt {
    pub stock_move_ids: Vec<EntryId>,
    pub payment_id: Option<EntryId>,
}

/// The backing store: parties, products, and the ledger.
pub struct Store {
    parties: DashMap<PartyId, Party>,
    /// Unique natural-key index: party name -> id.
    party_names: DashMap<String, PartyId>,
    products: DashMap<ProductId, Product>,
    /// Unique natural-key index over the normalized product key.
    product_keys: DashMap<ProductKey, ProductId>,
    entries: DashMap<EntryId, LedgerEntry>,
    /// Insertion counter; carried by every entry for stable ordering.
    next_seq: AtomicU64,
    /// Serializes multi-row submits so they are all-or-nothing.
    submit_lock: Mutex<()>,
}

impl Store {
    /// Creates an empty store.
    pub fn new() -> Self {
        Store {
            parties: DashMap::new(),
            party_names: DashMap::new(),
            products: DashMap::new(),
            product_keys: DashMap::new(),
            entries: DashMap::new(),
            next_seq: AtomicU64::new(0),
            submit_lock: Mutex::new(()),
        }
    }

    fn seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::SeqCst)
    }

    // === Parties ===

    /// Inserts a new party row.
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateParty`] when the name is already claimed. The
    /// name index entry makes the uniqueness check and the claim one atomic
    /// step, so two racing writers cannot both insert.
    pub fn insert_party(&self, new: &NewParty) -> Result<Party, StoreError> {
        match self.party_names.entry(new.name.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateParty(new.name.clone())),
            Entry::Vacant(slot) => {
                let party = Party {
                    id: PartyId::new(),
                    name: new.name.clone(),
                    role: new.role,
                    phone: new.phone.clone(),
                    address: new.address.clone(),
                    opening_balance: new.opening_balance.unwrap_or_default(),
                    created_at: Utc::now(),
                };
                slot.insert(party.id);
                self.parties.insert(party.id, party.clone());
                tracing::debug!(party = %party.id, name = %party.name, "party created");
                Ok(party)
            }
        }
    }

    pub fn get_party(&self, id: PartyId) -> Option<Party> {
        self.parties.get(&id).map(|p| p.value().clone())
    }

    /// Exact-match lookup on the unique party name.
    pub fn find_party_by_name(&self, name: &str) -> Option<Party> {
        let id = *self.party_names.get(name)?;
        self.get_party(id)
    }

    /// Snapshot of all party rows, in no particular order.
    pub fn parties(&self) -> Vec<Party> {
        self.parties.iter().map(|p| p.value().clone()).collect()
    }

    pub fn party_count(&self) -> usize {
        self.parties.len()
    }

    // === Products ===

    /// Inserts a new product row.
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateProduct`] when the normalized natural key is
    /// already claimed.
    pub fn insert_product(&self, spec: &ProductSpec) -> Result<Product, StoreError> {
        match self.product_keys.entry(spec.key()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateProduct(spec.name.clone())),
            Entry::Vacant(slot) => {
                let product = Product {
                    id: ProductId::new(),
                    name: spec.name.clone(),
                    material: spec.material.clone(),
                    size: spec.size.clone(),
                    unit: spec.unit.clone(),
                    opening_stock: spec.opening_stock.unwrap_or_default(),
                    archived_at: None,
                    created_at: Utc::now(),
                };
                slot.insert(product.id);
                self.products.insert(product.id, product.clone());
                tracing::debug!(product = %product.id, name = %product.name, "product created");
                Ok(product)
            }
        }
    }

    pub fn get_product(&self, id: ProductId) -> Option<Product> {
        self.products.get(&id).map(|p| p.value().clone())
    }

    /// Exact-match lookup on the normalized natural key. Archived products
    /// still match, so re-resolving an archived descriptor never creates a
    /// duplicate row.
    pub fn find_product_by_key(&self, key: &ProductKey) -> Option<Product> {
        let id = *self.product_keys.get(key)?;
        self.get_product(id)
    }

    /// Active (non-archived) products, name-ordered.
    pub fn active_products(&self) -> Vec<Product> {
        let mut products: Vec<Product> = self
            .products
            .iter()
            .filter(|p| !p.value().is_archived())
            .map(|p| p.value().clone())
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        products
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    /// Marks a product archived. Archiving is idempotent: the first
    /// timestamp sticks.
    pub fn archive_product(&self, id: ProductId) -> Result<Product, StoreError> {
        let mut product = self
            .products
            .get_mut(&id)
            .ok_or(StoreError::ProductNotFound(id))?;
        if product.archived_at.is_none() {
            product.archived_at = Some(Utc::now());
            tracing::info!(product = %id, "product archived");
        }
        Ok(product.value().clone())
    }

    // === Single-row ledger inserts ===

    /// Records a standalone payment row.
    pub fn insert_payment(&self, new: &NewPayment) -> Result<Payment, StoreError> {
        if !self.parties.contains_key(&new.party_id) {
            return Err(StoreError::PartyNotFound(new.party_id));
        }
        let payment = self.push_payment(
            new.party_id,
            new.amount,
            new.direction,
            new.method,
            new.instrument_ref.clone(),
            new.notes.clone(),
            None,
            Utc::now(),
        );
        Ok(payment)
    }

    /// Records a standalone stock move. Quantity is stored as an unsigned
    /// magnitude with the kind tag carrying the direction; signed input from
    /// callers still on the old convention is normalized here, and only here.
    pub fn insert_stock_move(&self, new: &NewStockMove) -> Result<StockMove, StoreError> {
        if !self.parties.contains_key(&new.party_id) {
            return Err(StoreError::PartyNotFound(new.party_id));
        }
        if !self.products.contains_key(&new.product_id) {
            return Err(StoreError::ProductNotFound(new.product_id));
        }
        let item = ResolvedItem {
            product_id: new.product_id,
            qty: new.qty.abs(),
            price_per_unit: new.price_per_unit,
        };
        let stock_move = self.push_stock_move(
            new.kind,
            new.party_id,
            &item,
            None,
            new.notes.clone(),
            Utc::now(),
        );
        Ok(stock_move)
    }

    // === Atomic quick-bill procedures ===

    /// Writes a quick-bill sale as one atomic unit: a stock move per line
    /// item, the collected payment (when non-zero), and the settlement's
    /// outgoing payment against the target party (when non-zero).
    ///
    /// All preconditions are checked before the first row is written and the
    /// write section is serialized, so a failed call writes nothing.
    pub fn create_sale(&self, sale: &SaleUnit) -> Result<SaleReceipt, StoreError> {
        let _guard = self.submit_lock.lock();

        if !self.parties.contains_key(&sale.party_id) {
            return Err(StoreError::PartyNotFound(sale.party_id));
        }
        for item in &sale.items {
            if !self.products.contains_key(&item.product_id) {
                return Err(StoreError::ProductNotFound(item.product_id));
            }
        }
        if let Some(link) = &sale.settlement {
            if !self.parties.contains_key(&link.target_party_id) {
                return Err(StoreError::PartyNotFound(link.target_party_id));
            }
        }

        let created_at = sale.created_at.unwrap_or_else(Utc::now);
        let mut receipt = SaleReceipt {
            stock_move_ids: Vec::with_capacity(sale.items.len()),
            payment_id: None,
            settlement_payment_id: None,
        };

        for item in &sale.items {
            let stock_move = self.push_stock_move(
                MoveKind::Sale,
                sale.party_id,
                item,
                sale.bill_no.clone(),
                None,
                created_at,
            );
            receipt.stock_move_ids.push(stock_move.id);
        }

        if sale.payment.amount > Decimal::ZERO {
            let settlement = sale
                .settlement
                .as_ref()
                .filter(|link| link.amount > Decimal::ZERO)
                .cloned();
            let payment = self.push_payment(
                sale.party_id,
                sale.payment.amount,
                PaymentDirection::In,
                sale.payment.method,
                sale.payment.instrument_ref.clone(),
                sale.bill_no.clone(),
                settlement.clone(),
                created_at,
            );
            receipt.payment_id = Some(payment.id);

            if let Some(link) = settlement {
                let outgoing = self.push_payment(
                    link.target_party_id,
                    link.amount,
                    PaymentDirection::Out,
                    sale.payment.method,
                    None,
                    sale.bill_no.clone(),
                    None,
                    created_at,
                );
                receipt.settlement_payment_id = Some(outgoing.id);
            }
        }

        tracing::info!(
            party = %sale.party_id,
            items = sale.items.len(),
            settled = receipt.settlement_payment_id.is_some(),
            "sale committed"
        );
        Ok(receipt)
    }

    /// Writes a quick-bill purchase as one atomic unit: a stock move per
    /// line item and the optional outgoing payment (when non-zero).
    pub fn create_purchase(&self, purchase: &PurchaseUnit) -> Result<PurchaseReceipt, StoreError> {
        let _guard = self.submit_lock.lock();

        if !self.parties.contains_key(&purchase.party_id) {
            return Err(StoreError::PartyNotFound(purchase.party_id));
        }
        for item in &purchase.items {
            if !self.products.contains_key(&item.product_id) {
                return Err(StoreError::ProductNotFound(item.product_id));
            }
        }

        let created_at = purchase.created_at.unwrap_or_else(Utc::now);
        let mut receipt = PurchaseReceipt {
            stock_move_ids: Vec::with_capacity(purchase.items.len()),
            payment_id: None,
        };

        for item in &purchase.items {
            let stock_move = self.push_stock_move(
                MoveKind::Purchase,
                purchase.party_id,
                item,
                purchase.bill_no.clone(),
                None,
                created_at,
            );
            receipt.stock_move_ids.push(stock_move.id);
        }

        if let Some(payment) = &purchase.payment {
            if payment.amount > Decimal::ZERO {
                let row = self.push_payment(
                    purchase.party_id,
                    payment.amount,
                    PaymentDirection::Out,
                    payment.method,
                    payment.instrument_ref.clone(),
                    purchase.bill_no.clone(),
                    None,
                    created_at,
                );
                receipt.payment_id = Some(row.id);
            }
        }

        tracing::info!(
            party = %purchase.party_id,
            items = purchase.items.len(),
            "purchase committed"
        );
        Ok(receipt)
    }

    // === Ledger queries ===

    /// Every entry touching the party, in no particular order. Suited to
    /// balance computation, which is order-independent.
    pub fn entries_for_party(&self, party_id: PartyId) -> Vec<LedgerEntry> {
        self.entries
            .iter()
            .filter(|e| e.value().party_id() == party_id)
            .map(|e| e.value().clone())
            .collect()
    }

    /// The party's stock moves, newest first.
    pub fn stock_moves_for_party(&self, party_id: PartyId) -> Vec<StockMove> {
        let mut moves: Vec<StockMove> = self
            .entries
            .iter()
            .filter_map(|e| match e.value() {
                LedgerEntry::StockMove(m) if m.party_id == party_id => Some(m.clone()),
                _ => None,
            })
            .collect();
        moves.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.seq.cmp(&b.seq)));
        moves
    }

    /// The party's payments, newest first.
    pub fn payments_for_party(&self, party_id: PartyId) -> Vec<Payment> {
        let mut payments: Vec<Payment> = self
            .entries
            .iter()
            .filter_map(|e| match e.value() {
                LedgerEntry::Payment(p) if p.party_id == party_id => Some(p.clone()),
                _ => None,
            })
            .collect();
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.seq.cmp(&b.seq)));
        payments
    }

    /// Snapshot of the whole ledger, in no particular order.
    pub fn all_entries(&self) -> Vec<LedgerEntry> {
        self.entries.iter().map(|e| e.value().clone()).collect()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    // === Row construction ===

    fn push_stock_move(
        &self,
        kind: MoveKind,
        party_id: PartyId,
        item: &ResolvedItem,
        bill_no: Option<String>,
        notes: Option<String>,
        created_at: DateTime<Utc>,
    ) -> StockMove {
        let stock_move = StockMove {
            id: EntryId::new(),
            seq: self.seq(),
            kind,
            party_id,
            product_id: item.product_id,
            quantity: item.qty,
            price_per_unit: item.price_per_unit,
            total_amount: item.qty * item.price_per_unit,
            bill_no,
            notes,
            created_at,
        };
        self.entries
            .insert(stock_move.id, LedgerEntry::StockMove(stock_move.clone()));
        stock_move
    }

    #[allow(clippy::too_many_arguments)]
    fn push_payment(
        &self,
        party_id: PartyId,
        amount: Decimal,
        direction: PaymentDirection,
        method: PaymentMethod,
        instrument_ref: Option<String>,
        notes: Option<String>,
        settlement: Option<SettlementLink>,
        created_at: DateTime<Utc>,
    ) -> Payment {
        let payment = Payment {
            id: EntryId::new(),
            seq: self.seq(),
            party_id,
            amount,
            direction,
            method,
            instrument_ref,
            notes,
            settlement,
            created_at,
        };
        self.entries
            .insert(payment.id, LedgerEntry::Payment(payment.clone()));
        payment
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::party::PartyRole;
    use rust_decimal_macros::dec;

    fn new_party(name: &str, role: PartyRole) -> NewParty {
        NewParty {
            name: name.to_string(),
            role,
            opening_balance: None,
            phone: None,
            address: None,
        }
    }

    fn new_product(name: &str, unit: &str) -> ProductSpec {
        ProductSpec {
            name: name.to_string(),
            material: None,
            size: None,
            unit: unit.to_string(),
            opening_stock: None,
        }
    }

    fn seeded_store() -> (Store, Party, Product) {
        let store = Store::new();
        let party = store
            .insert_party(&new_party("Acme Traders", PartyRole::Customer))
            .unwrap();
        let product = store.insert_product(&new_product("Tile", "box")).unwrap();
        (store, party, product)
    }

    #[test]
    fn duplicate_party_name_is_rejected() {
        let store = Store::new();
        store
            .insert_party(&new_party("Acme", PartyRole::Customer))
            .unwrap();
        let result = store.insert_party(&new_party("Acme", PartyRole::Supplier));
        assert_eq!(
            result.unwrap_err(),
            StoreError::DuplicateParty("Acme".to_string())
        );
        assert_eq!(store.party_count(), 1);
    }

    #[test]
    fn duplicate_product_key_is_rejected() {
        let store = Store::new();
        store.insert_product(&new_product("Tile", "box")).unwrap();
        let result = store.insert_product(&new_product("Tile", "box"));
        assert!(matches!(result, Err(StoreError::DuplicateProduct(_))));
        assert_eq!(store.product_count(), 1);
    }

    #[test]
    fn sale_with_unknown_product_writes_nothing() {
        let (store, party, _product) = seeded_store();
        let sale = SaleUnit {
            party_id: party.id,
            bill_no: None,
            created_at: None,
            items: vec![ResolvedItem {
                product_id: ProductId::new(),
                qty: dec!(1),
                price_per_unit: dec!(10),
            }],
            payment: PaymentSpec {
                amount: dec!(10),
                method: PaymentMethod::Cash,
                instrument_ref: None,
            },
            settlement: None,
        };

        let result = store.create_sale(&sale);
        assert!(matches!(result, Err(StoreError::ProductNotFound(_))));
        assert_eq!(store.entry_count(), 0);
    }

    #[test]
    fn sale_with_unknown_settlement_target_writes_nothing() {
        let (store, party, product) = seeded_store();
        let sale = SaleUnit {
            party_id: party.id,
            bill_no: None,
            created_at: None,
            items: vec![ResolvedItem {
                product_id: product.id,
                qty: dec!(2),
                price_per_unit: dec!(50),
            }],
            payment: PaymentSpec {
                amount: dec!(100),
                method: PaymentMethod::Cash,
                instrument_ref: None,
            },
            settlement: Some(SettlementLink {
                target_party_id: PartyId::new(),
                amount: dec!(40),
            }),
        };

        let result = store.create_sale(&sale);
        assert!(matches!(result, Err(StoreError::PartyNotFound(_))));
        assert_eq!(store.entry_count(), 0);
    }

    #[test]
    fn settled_sale_writes_move_and_two_payments() {
        let (store, party, product) = seeded_store();
        let supplier = store
            .insert_party(&new_party("Mill Works", PartyRole::Supplier))
            .unwrap();

        let sale = SaleUnit {
            party_id: party.id,
            bill_no: Some("B-17".to_string()),
            created_at: None,
            items: vec![ResolvedItem {
                product_id: product.id,
                qty: dec!(10),
                price_per_unit: dec!(50),
            }],
            payment: PaymentSpec {
                amount: dec!(300),
                method: PaymentMethod::Upi,
                instrument_ref: Some("upi-ref-1".to_string()),
            },
            settlement: Some(SettlementLink {
                target_party_id: supplier.id,
                amount: dec!(120),
            }),
        };

        let receipt = store.create_sale(&sale).unwrap();
        assert_eq!(receipt.stock_move_ids.len(), 1);
        assert!(receipt.payment_id.is_some());
        assert!(receipt.settlement_payment_id.is_some());
        assert_eq!(store.entry_count(), 3);

        // The incoming payment carries the link; the outgoing row lands on
        // the target party.
        let customer_payments = store.payments_for_party(party.id);
        assert_eq!(customer_payments.len(), 1);
        let link = customer_payments[0].settlement.as_ref().unwrap();
        assert_eq!(link.target_party_id, supplier.id);
        assert_eq!(link.amount, dec!(120));

        let supplier_payments = store.payments_for_party(supplier.id);
        assert_eq!(supplier_payments.len(), 1);
        assert_eq!(supplier_payments[0].direction, PaymentDirection::Out);
        assert_eq!(supplier_payments[0].amount, dec!(120));
        assert!(supplier_payments[0].settlement.is_none());
    }

    #[test]
    fn zero_payment_sale_writes_no_payment_row() {
        let (store, party, product) = seeded_store();
        let sale = SaleUnit {
            party_id: party.id,
            bill_no: None,
            created_at: None,
            items: vec![ResolvedItem {
                product_id: product.id,
                qty: dec!(3),
                price_per_unit: dec!(20),
            }],
            payment: PaymentSpec {
                amount: Decimal::ZERO,
                method: PaymentMethod::Cash,
                instrument_ref: None,
            },
            settlement: None,
        };

        let receipt = store.create_sale(&sale).unwrap();
        assert_eq!(receipt.stock_move_ids.len(), 1);
        assert!(receipt.payment_id.is_none());
        assert_eq!(store.entry_count(), 1);
    }

    #[test]
    fn purchase_payment_goes_out() {
        let (store, party, product) = seeded_store();
        let purchase = PurchaseUnit {
            party_id: party.id,
            bill_no: None,
            created_at: None,
            items: vec![ResolvedItem {
                product_id: product.id,
                qty: dec!(5),
                price_per_unit: dec!(60),
            }],
            payment: Some(PaymentSpec {
                amount: dec!(300),
                method: PaymentMethod::Cheque,
                instrument_ref: Some("000123".to_string()),
            }),
        };

        store.create_purchase(&purchase).unwrap();
        let payments = store.payments_for_party(party.id);
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].direction, PaymentDirection::Out);
        assert_eq!(payments[0].method, PaymentMethod::Cheque);
    }

    #[test]
    fn stock_move_total_is_qty_times_price() {
        let (store, party, product) = seeded_store();
        let stock_move = store
            .insert_stock_move(&NewStockMove {
                kind: MoveKind::Purchase,
                party_id: party.id,
                product_id: product.id,
                qty: dec!(7),
                price_per_unit: dec!(12.50),
                notes: None,
            })
            .unwrap();
        assert_eq!(stock_move.total_amount, dec!(87.50));
        assert_eq!(stock_move.quantity, dec!(7));
    }

    #[test]
    fn signed_stock_move_input_is_normalized_to_magnitude() {
        let (store, party, product) = seeded_store();
        let stock_move = store
            .insert_stock_move(&NewStockMove {
                kind: MoveKind::Sale,
                party_id: party.id,
                product_id: product.id,
                qty: dec!(-4),
                price_per_unit: dec!(25),
                notes: None,
            })
            .unwrap();
        assert_eq!(stock_move.quantity, dec!(4));
        assert_eq!(stock_move.total_amount, dec!(100));
        assert_eq!(stock_move.signed_quantity(), dec!(-4));
    }

    #[test]
    fn payment_requires_existing_party() {
        let store = Store::new();
        let result = store.insert_payment(&NewPayment {
            party_id: PartyId::new(),
            amount: dec!(10),
            method: PaymentMethod::Cash,
            direction: PaymentDirection::In,
            instrument_ref: None,
            notes: None,
        });
        assert!(matches!(result, Err(StoreError::PartyNotFound(_))));
        assert_eq!(store.entry_count(), 0);
    }

    #[test]
    fn archived_product_leaves_active_listing_but_stays_resolvable() {
        let (store, _party, product) = seeded_store();
        store.archive_product(product.id).unwrap();

        assert!(store.active_products().is_empty());
        let found = store.find_product_by_key(&product.key()).unwrap();
        assert_eq!(found.id, product.id);
        assert!(found.is_archived());
    }

    #[test]
    fn created_at_override_is_applied_to_every_row() {
        let (store, party, product) = seeded_store();
        let stamp = "2026-01-05T10:00:00Z".parse().unwrap();
        let sale = SaleUnit {
            party_id: party.id,
            bill_no: None,
            created_at: Some(stamp),
            items: vec![ResolvedItem {
                product_id: product.id,
                qty: dec!(1),
                price_per_unit: dec!(10),
            }],
            payment: PaymentSpec {
                amount: dec!(10),
                method: PaymentMethod::Cash,
                instrument_ref: None,
            },
            settlement: None,
        };
        store.create_sale(&sale).unwrap();

        for entry in store.all_entries() {
            assert_eq!(entry.created_at(), stamp);
        }
    }
}
