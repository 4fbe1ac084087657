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

//! Quick-bill composition.
//!
//! A quick bill turns one request into a multi-row ledger write: a stock
//! move per line item, an optional payment, and (for sales) an optional
//! settlement toward another party. Processing order is fixed:
//!
//! 1. Validate the whole request, collecting the full field-error set.
//! 2. Resolve descriptor-form line items through find-or-create, in list
//!    order; a failure at item *i* aborts before anything is written.
//! 3. Hand the resolved unit to the store's atomic procedure.
//!
//! A failure at any stage leaves the ledger untouched, and the error names
//! the stage (and line item, where applicable) that failed.

use crate::base::{PartyId, ProductId};
use crate::entry::{PaymentMethod, SettlementLink};
use crate::error::{LedgerError, StoreError};
use crate::party::PartyRole;
use crate::resolver;
use crate::store::{
    PaymentSpec, PurchaseReceipt, PurchaseUnit, ResolvedItem, SaleReceipt, SaleUnit, Store,
};
use crate::validate::{NewParty, ProductSpec, ValidationErrors};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

/// One quick-bill line item.
///
/// The product is named either by identifier or by a raw descriptor (name,
/// optional material and size, unit). Descriptor items are resolved through
/// find-or-create before submission.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LineItem {
    pub product_id: Option<ProductId>,
    pub name: Option<String>,
    pub material: Option<String>,
    pub size: Option<String>,
    pub unit: Option<String>,
    pub qty: Decimal,
    pub price_per_unit: Decimal,
}

impl LineItem {
    /// A line item that references an existing product row.
    pub fn by_id(product_id: ProductId, qty: Decimal, price_per_unit: Decimal) -> Self {
        LineItem {
            product_id: Some(product_id),
            name: None,
            material: None,
            size: None,
            unit: None,
            qty,
            price_per_unit,
        }
    }

    fn descriptor(&self) -> Option<ProductSpec> {
        self.name.as_ref().map(|name| ProductSpec {
            name: name.clone(),
            material: self.material.clone(),
            size: self.size.clone(),
            unit: self.unit.clone().unwrap_or_default(),
            opening_stock: None,
        })
    }

    fn validate_at(&self, errors: &mut ValidationErrors, index: usize) {
        if self.qty <= Decimal::ZERO {
            errors.push(
                format!("items[{index}].qty"),
                "quantity must be greater than 0",
            );
        }
        if self.price_per_unit < Decimal::ZERO {
            errors.push(
                format!("items[{index}].price_per_unit"),
                "price cannot be negative",
            );
        }
        match (&self.product_id, self.descriptor()) {
            (Some(_), Some(_)) => errors.push(
                format!("items[{index}].product_id"),
                "give either a product id or a descriptor, not both",
            ),
            (None, None) => errors.push(
                format!("items[{index}].product_id"),
                "a product id or a descriptor is required",
            ),
            (Some(_), None) => {}
            (None, Some(spec)) => spec.validate_at(errors, &format!("items[{index}].")),
        }
    }
}

/// The money collected or paid alongside a quick bill.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentBlock {
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub instrument_ref: Option<String>,
}

/// Redirects part of a sale's collected payment to another party.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SettlementBlock {
    pub party_id: PartyId,
    pub amount: Decimal,
}

/// Request body for a quick-bill sale.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SaleRequest {
    pub party_id: PartyId,
    pub bill_no: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub items: Vec<LineItem>,
    pub payment: PaymentBlock,
    pub settlement: Option<SettlementBlock>,
}

impl SaleRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.items.is_empty() {
            errors.push("items", "at least one item is required");
        }
        for (index, item) in self.items.iter().enumerate() {
            item.validate_at(&mut errors, index);
        }
        if self.payment.amount < Decimal::ZERO {
            errors.push("payment.amount", "amount cannot be negative");
        }
        if let Some(settlement) = &self.settlement {
            if settlement.amount < Decimal::ZERO {
                errors.push("settlement.amount", "amount cannot be negative");
            } else if settlement.amount > self.payment.amount {
                errors.push(
                    "settlement.amount",
                    "settlement cannot exceed the payment amount",
                );
            }
        }
        errors.into_result()
    }
}

/// Request body for a quick-bill purchase.
///
/// The supplier is named either by party id or by name; a name goes through
/// party find-or-create with the supplier role.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PurchaseRequest {
    pub party_id: Option<PartyId>,
    pub supplier_name: Option<String>,
    pub bill_no: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub items: Vec<LineItem>,
    pub payment: Option<PaymentBlock>,
}

impl PurchaseRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        match (&self.party_id, &self.supplier_name) {
            (Some(_), Some(_)) => errors.push(
                "party_id",
                "give either a party id or a supplier name, not both",
            ),
            (None, None) => errors.push("party_id", "a party id or a supplier name is required"),
            (None, Some(name)) if name.chars().count() < 2 => {
                errors.push("supplier_name", "name must be at least 2 characters");
            }
            _ => {}
        }
        if self.items.is_empty() {
            errors.push("items", "at least one item is required");
        }
        for (index, item) in self.items.iter().enumerate() {
            item.validate_at(&mut errors, index);
        }
        if let Some(payment) = &self.payment {
            if payment.amount < Decimal::ZERO {
                errors.push("payment.amount", "amount cannot be negative");
            }
        }
        errors.into_result()
    }
}

/// Validates, resolves, and atomically submits a quick-bill sale.
pub fn create_sale(store: &Store, request: &SaleRequest) -> Result<SaleReceipt, LedgerError> {
    request.validate()?;
    let items = resolve_items(store, &request.items)?;

    let unit = SaleUnit {
        party_id: request.party_id,
        bill_no: request.bill_no.clone(),
        created_at: request.created_at,
        items,
        payment: PaymentSpec {
            amount: request.payment.amount,
            method: request.payment.method,
            instrument_ref: request.payment.instrument_ref.clone(),
        },
        settlement: request.settlement.as_ref().map(|s| SettlementLink {
            target_party_id: s.party_id,
            amount: s.amount,
        }),
    };

    store.create_sale(&unit).map_err(submit_error)
}

/// Validates, resolves, and atomically submits a quick-bill purchase.
///
/// A supplier named by name is resolved (find-or-create) before the line
/// items, matching the request's reference order.
pub fn create_purchase(
    store: &Store,
    request: &PurchaseRequest,
) -> Result<PurchaseReceipt, LedgerError> {
    request.validate()?;

    let party_id = match (&request.party_id, &request.supplier_name) {
        (Some(id), _) => *id,
        (None, Some(name)) => {
            resolver::resolve_party(
                store,
                &NewParty {
                    name: name.clone(),
                    role: PartyRole::Supplier,
                    opening_balance: None,
                    phone: None,
                    address: None,
                },
            )
            .map_err(|source| LedgerError::Resolution { item: None, source })?
            .id
        }
        // Unreachable after validation; kept total for direct callers.
        (None, None) => {
            let mut errors = ValidationErrors::new();
            errors.push("party_id", "a party id or a supplier name is required");
            return Err(errors.into());
        }
    };

    let items = resolve_items(store, &request.items)?;

    let unit = PurchaseUnit {
        party_id,
        bill_no: request.bill_no.clone(),
        created_at: request.created_at,
        items,
        payment: request.payment.as_ref().map(|p| PaymentSpec {
            amount: p.amount,
            method: p.method,
            instrument_ref: p.instrument_ref.clone(),
        }),
    };

    store.create_purchase(&unit).map_err(submit_error)
}

/// Resolves line items in list order. Descriptor items go through
/// find-or-create; a failure aborts with the failing item's index before any
/// ledger row is written.
fn resolve_items(store: &Store, items: &[LineItem]) -> Result<Vec<ResolvedItem>, LedgerError> {
    let mut resolved = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let product_id = match (&item.product_id, item.descriptor()) {
            (Some(id), _) => *id,
            (None, Some(spec)) => {
                resolver::resolve_product(store, &spec)
                    .map_err(|source| {
                        tracing::warn!(item = index, error = %source, "line item resolution failed");
                        LedgerError::Resolution {
                            item: Some(index),
                            source,
                        }
                    })?
                    .id
            }
            // Unreachable after validation; kept total for direct callers.
            (None, None) => {
                let mut errors = ValidationErrors::new();
                errors.push(
                    format!("items[{index}].product_id"),
                    "a product id or a descriptor is required",
                );
                return Err(errors.into());
            }
        };
        resolved.push(ResolvedItem {
            product_id,
            qty: item.qty,
            price_per_unit: item.price_per_unit,
        });
    }
    Ok(resolved)
}

/// Maps a store rejection of the atomic submit onto the error taxonomy:
/// missing referenced entities are "not found", everything else is a submit
/// failure carrying the store's message.
fn submit_error(source: StoreError) -> LedgerError {
    match source {
        StoreError::PartyNotFound(id) => LedgerError::not_found("party", id),
        StoreError::ProductNotFound(id) => LedgerError::not_found("product", id),
        other => LedgerError::Submit { source: other },
    }
}
