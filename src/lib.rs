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

//! # Trade Ledger
//!
//! An inventory and ledger engine for a small trading business: parties
//! (customers and suppliers), products, quick-bill sales and purchases,
//! payments with cross-party settlements, and running-balance reporting.
//!
//! ## Core Components
//!
//! - [`Store`]: the backing tables with atomic quick-bill procedures
//! - [`balance`]: pure, order-independent running-balance computation
//! - [`resolver`]: find-or-create resolution on natural keys
//! - [`composer`]: validation and composition of multi-row transactions
//! - [`report`]: merged reverse-chronological ledger views
//! - [`http`]: the REST boundary
//!
//! ## Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use trade_ledger_rs::party::PartyRole;
//! use trade_ledger_rs::validate::NewParty;
//! use trade_ledger_rs::{Store, balance, resolver};
//!
//! let store = Store::new();
//! let party = resolver::resolve_party(&store, &NewParty {
//!     name: "Acme Traders".to_string(),
//!     role: PartyRole::Customer,
//!     opening_balance: None,
//!     phone: None,
//!     address: None,
//! }).unwrap();
//!
//! // No entries yet: the balance is the opening balance.
//! let entries = store.entries_for_party(party.id);
//! assert_eq!(balance::balance(party.opening_balance, &entries), dec!(0));
//! ```
//!
//! ## Sign Conventions
//!
//! A positive balance means the party owes the business; a negative balance
//! means the business owes the party. Stored amounts and quantities are
//! non-negative magnitudes; direction is carried by kind tags, and signs
//! appear only at display time.
//!
//! ## Concurrency
//!
//! Each request is processed independently against the shared [`Store`].
//! Multi-row writes are serialized and all-or-nothing; reads are not
//! isolated from concurrent writes, so reports may be momentarily stale.

pub mod balance;
pub mod base;
pub mod composer;
pub mod entry;
pub mod error;
pub mod http;
pub mod party;
pub mod product;
pub mod report;
pub mod resolver;
pub mod store;
pub mod validate;

pub use base::{EntryId, PartyId, ProductId};
pub use error::{LedgerError, StoreError};
pub use store::Store;
pub use validate::ValidationErrors;
