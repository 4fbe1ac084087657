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

//! Request schemas and validation.
//!
//! Every write request is deserialized into a typed, immutable value object
//! and validated in full before any business logic runs. Validators collect
//! the complete error set in one pass, keyed by field path (`"name"`,
//! `"items[1].qty"`, `"settlement.amount"`), so a client sees everything
//! wrong with a request in a single round trip and nothing is partially
//! applied.

use crate::base::{PartyId, ProductId};
use crate::entry::{MoveKind, PaymentDirection, PaymentMethod};
use crate::party::PartyRole;
use crate::product::ProductKey;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A field-path-keyed set of validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message against a field path.
    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.field_errors
            .entry(path.into())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty()
    }

    /// `Ok(())` when nothing was recorded, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed")?;
        for (path, messages) in &self.field_errors {
            for message in messages {
                write!(f, "; {path}: {message}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Request body for creating (or finding) a party.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewParty {
    pub name: String,
    pub role: PartyRole,
    pub opening_balance: Option<Decimal>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl NewParty {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.name.chars().count() < 2 {
            errors.push("name", "name must be at least 2 characters");
        }
        errors.into_result()
    }
}

/// Raw product descriptor: the find-or-create key plus opening stock.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductSpec {
    pub name: String,
    pub material: Option<String>,
    pub size: Option<String>,
    pub unit: String,
    pub opening_stock: Option<Decimal>,
}

impl ProductSpec {
    /// The normalized natural key this descriptor resolves through.
    pub fn key(&self) -> ProductKey {
        ProductKey::new(
            &self.name,
            self.material.as_deref(),
            self.size.as_deref(),
            &self.unit,
        )
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.validate_at(&mut errors, "");
        errors.into_result()
    }

    /// Records this descriptor's errors under `prefix` (e.g. `"items[2]."`),
    /// so nested descriptors keep their field paths.
    pub fn validate_at(&self, errors: &mut ValidationErrors, prefix: &str) {
        if self.name.chars().count() < 2 {
            errors.push(format!("{prefix}name"), "name must be at least 2 characters");
        }
        if self.unit.trim().is_empty() {
            errors.push(format!("{prefix}unit"), "unit is required");
        }
    }
}

/// Request body for recording a standalone payment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewPayment {
    pub party_id: PartyId,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub direction: PaymentDirection,
    pub instrument_ref: Option<String>,
    pub notes: Option<String>,
}

impl NewPayment {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.amount <= Decimal::ZERO {
            errors.push("amount", "amount must be greater than 0");
        }
        errors.into_result()
    }
}

/// Request body for the direct stock-move insert path.
///
/// The kind tag carries the direction. Quantity may still arrive signed
/// (some callers historically sent sale quantities as negatives); the store
/// normalizes it to a magnitude where the record is built, so only zero is
/// rejected here.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewStockMove {
    pub kind: MoveKind,
    pub party_id: PartyId,
    pub product_id: ProductId,
    pub qty: Decimal,
    pub price_per_unit: Decimal,
    pub notes: Option<String>,
}

impl NewStockMove {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.qty.is_zero() {
            errors.push("qty", "quantity must be nonzero");
        }
        if self.price_per_unit < Decimal::ZERO {
            errors.push("price_per_unit", "price cannot be negative");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn errors_accumulate_per_field() {
        let mut errors = ValidationErrors::new();
        errors.push("qty", "quantity must be greater than 0");
        errors.push("qty", "quantity must be a whole number of pieces");
        errors.push("price_per_unit", "price cannot be negative");

        assert_eq!(errors.field_errors["qty"].len(), 2);
        assert_eq!(errors.field_errors["price_per_unit"].len(), 1);
        assert!(errors.clone().into_result().is_err());
    }

    #[test]
    fn display_lists_every_message() {
        let mut errors = ValidationErrors::new();
        errors.push("name", "name must be at least 2 characters");
        errors.push("unit", "unit is required");
        let rendered = errors.to_string();
        assert!(rendered.contains("name: name must be at least 2 characters"));
        assert!(rendered.contains("unit: unit is required"));
    }

    #[test]
    fn empty_set_is_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn new_party_requires_two_character_name() {
        let party = NewParty {
            name: "A".to_string(),
            role: PartyRole::Customer,
            opening_balance: None,
            phone: None,
            address: None,
        };
        let errors = party.validate().unwrap_err();
        assert!(errors.field_errors.contains_key("name"));
    }

    #[test]
    fn product_spec_requires_unit() {
        let spec = ProductSpec {
            name: "Tile".to_string(),
            material: None,
            size: None,
            unit: "  ".to_string(),
            opening_stock: None,
        };
        let errors = spec.validate().unwrap_err();
        assert!(errors.field_errors.contains_key("unit"));
    }

    #[test]
    fn product_spec_errors_carry_prefix() {
        let spec = ProductSpec {
            name: "T".to_string(),
            material: None,
            size: None,
            unit: String::new(),
            opening_stock: None,
        };
        let mut errors = ValidationErrors::new();
        spec.validate_at(&mut errors, "items[2].");
        assert!(errors.field_errors.contains_key("items[2].name"));
        assert!(errors.field_errors.contains_key("items[2].unit"));
    }

    #[test]
    fn payment_amount_must_be_positive() {
        let payment = NewPayment {
            party_id: PartyId(Uuid::new_v4()),
            amount: dec!(0),
            method: PaymentMethod::Cash,
            direction: PaymentDirection::In,
            instrument_ref: None,
            notes: None,
        };
        assert!(payment.validate().is_err());
    }

    #[test]
    fn stock_move_rejects_zero_qty_and_negative_price() {
        let stock_move = NewStockMove {
            kind: MoveKind::Sale,
            party_id: PartyId(Uuid::new_v4()),
            product_id: ProductId(Uuid::new_v4()),
            qty: dec!(0),
            price_per_unit: dec!(-1),
            notes: None,
        };
        let errors = stock_move.validate().unwrap_err();
        assert!(errors.field_errors.contains_key("qty"));
        assert!(errors.field_errors.contains_key("price_per_unit"));
    }

    #[test]
    fn stock_move_accepts_signed_qty() {
        let stock_move = NewStockMove {
            kind: MoveKind::Sale,
            party_id: PartyId(Uuid::new_v4()),
            product_id: ProductId(Uuid::new_v4()),
            qty: dec!(-3),
            price_per_unit: dec!(10),
            notes: None,
        };
        assert!(stock_move.validate().is_ok());
    }
}
