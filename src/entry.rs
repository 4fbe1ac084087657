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

//! Ledger entries.
//!
//! Every money- or stock-affecting event is one immutable [`LedgerEntry`]:
//! either a stock move (a sale or a purchase of product units) or a payment
//! (money in or out). An entry carries exactly one kind tag, so it is never
//! double-counted when balances are folded.
//!
//! Stored amounts and quantities are non-negative magnitudes. Direction is
//! carried by [`MoveKind`] and [`PaymentDirection`]; signs exist only in the
//! display accessors ([`StockMove::signed_quantity`]) and the debit/credit
//! columns of the report projection.

use crate::base::{EntryId, PartyId, ProductId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a stock move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveKind {
    /// Product units leave stock; the party is billed.
    Sale,
    /// Product units enter stock; the business is billed.
    Purchase,
}

/// Direction of a payment, relative to the business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentDirection {
    /// Money received from the party.
    In,
    /// Money paid out to the party.
    Out,
}

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Upi,
    Cheque,
}

/// Settlement link carried by the payment that funded it.
///
/// Part of the cash collected from one party was immediately redirected to
/// pay down a different party's balance. The link lives on the originating
/// incoming payment; the store writes a matching outgoing payment row against
/// the target party.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementLink {
    pub target_party_id: PartyId,
    pub amount: Decimal,
}

/// A sale or purchase of product units.
///
/// `quantity` is an unsigned magnitude; `total_amount` is always
/// `quantity * price_per_unit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMove {
    pub id: EntryId,
    /// Insertion sequence; orders entries that share a timestamp.
    #[serde(skip)]
    pub seq: u64,
    pub kind: MoveKind,
    pub party_id: PartyId,
    pub product_id: ProductId,
    pub quantity: Decimal,
    pub price_per_unit: Decimal,
    pub total_amount: Decimal,
    pub bill_no: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl StockMove {
    /// Quantity with the display sign applied: sales deplete stock.
    ///
    /// The sign is derived here and nowhere else; it is never stored.
    pub fn signed_quantity(&self) -> Decimal {
        match self.kind {
            MoveKind::Sale => -self.quantity,
            MoveKind::Purchase => self.quantity,
        }
    }
}

/// Money moving in or out against a party.
///
/// `amount` is always non-negative; `direction` carries the sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: EntryId,
    /// Insertion sequence; orders entries that share a timestamp.
    #[serde(skip)]
    pub seq: u64,
    pub party_id: PartyId,
    pub amount: Decimal,
    pub direction: PaymentDirection,
    pub method: PaymentMethod,
    pub instrument_ref: Option<String>,
    pub notes: Option<String>,
    pub settlement: Option<SettlementLink>,
    pub created_at: DateTime<Utc>,
}

/// One immutable ledger event: exactly one of a stock move or a payment.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerEntry {
    StockMove(StockMove),
    Payment(Payment),
}

impl LedgerEntry {
    pub fn id(&self) -> EntryId {
        match self {
            Self::StockMove(m) => m.id,
            Self::Payment(p) => p.id,
        }
    }

    pub fn party_id(&self) -> PartyId {
        match self {
            Self::StockMove(m) => m.party_id,
            Self::Payment(p) => p.party_id,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Self::StockMove(m) => m.created_at,
            Self::Payment(p) => p.created_at,
        }
    }

    pub fn seq(&self) -> u64 {
        match self {
            Self::StockMove(m) => m.seq,
            Self::Payment(p) => p.seq,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_move(kind: MoveKind, quantity: Decimal) -> StockMove {
        StockMove {
            id: EntryId::new(),
            seq: 0,
            kind,
            party_id: PartyId::new(),
            product_id: ProductId::new(),
            quantity,
            price_per_unit: dec!(10.00),
            total_amount: quantity * dec!(10.00),
            bill_no: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn sale_quantity_displays_negative() {
        let sale = make_move(MoveKind::Sale, dec!(4));
        assert_eq!(sale.signed_quantity(), dec!(-4));
        assert_eq!(sale.quantity, dec!(4), "stored quantity stays unsigned");
    }

    #[test]
    fn purchase_quantity_displays_positive() {
        let purchase = make_move(MoveKind::Purchase, dec!(4));
        assert_eq!(purchase.signed_quantity(), dec!(4));
    }

    #[test]
    fn kind_tags_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&MoveKind::Sale).unwrap(), "\"sale\"");
        assert_eq!(
            serde_json::to_string(&PaymentDirection::Out).unwrap(),
            "\"out\""
        );
        assert_eq!(serde_json::to_string(&PaymentMethod::Upi).unwrap(), "\"upi\"");
    }

    #[test]
    fn seq_is_not_exposed_in_json() {
        let m = make_move(MoveKind::Sale, dec!(1));
        let json = serde_json::to_value(&m).unwrap();
        assert!(json.get("seq").is_none());
    }
}
