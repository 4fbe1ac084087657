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

//! Find-or-create integration tests, including the accepted concurrent-race
//! behavior.

use rayon::prelude::*;
use rust_decimal_macros::dec;
use trade_ledger_rs::party::PartyRole;
use trade_ledger_rs::validate::{NewParty, ProductSpec};
use trade_ledger_rs::{Store, StoreError, resolver};

fn acme() -> NewParty {
    NewParty {
        name: "Acme Traders".to_string(),
        role: PartyRole::Customer,
        opening_balance: Some(dec!(100)),
        phone: Some("98765 43210".to_string()),
        address: None,
    }
}

fn tile(material: Option<&str>, size: Option<&str>) -> ProductSpec {
    ProductSpec {
        name: "Tile".to_string(),
        material: material.map(str::to_string),
        size: size.map(str::to_string),
        unit: "box".to_string(),
        opening_stock: None,
    }
}

#[test]
fn party_resolution_is_idempotent() {
    let store = Store::new();
    let first = resolver::resolve_party(&store, &acme()).unwrap();
    let second = resolver::resolve_party(&store, &acme()).unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(store.party_count(), 1);
}

#[test]
fn product_resolution_is_idempotent() {
    let store = Store::new();
    let first = resolver::resolve_product(&store, &tile(Some("ceramic"), None)).unwrap();
    let second = resolver::resolve_product(&store, &tile(Some("ceramic"), None)).unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(store.product_count(), 1);
}

/// `{name: "Tile", material: "", size: absent, unit: "box"}` and
/// `{name: "Tile", unit: "box"}` must resolve to the same row.
#[test]
fn empty_string_and_absent_optionals_are_one_key() {
    let store = Store::new();
    let with_empty = resolver::resolve_product(&store, &tile(Some(""), None)).unwrap();
    let bare = resolver::resolve_product(&store, &tile(None, None)).unwrap();

    assert_eq!(with_empty.id, bare.id);
    assert_eq!(store.product_count(), 1);
}

#[test]
fn whitespace_only_optionals_are_one_key() {
    let store = Store::new();
    let blank = resolver::resolve_product(&store, &tile(Some("  "), Some("\t"))).unwrap();
    let bare = resolver::resolve_product(&store, &tile(None, None)).unwrap();

    assert_eq!(blank.id, bare.id);
    assert_eq!(store.product_count(), 1);
}

#[test]
fn any_differing_key_member_creates_a_new_row() {
    let store = Store::new();
    resolver::resolve_product(&store, &tile(None, None)).unwrap();
    resolver::resolve_product(&store, &tile(Some("ceramic"), None)).unwrap();
    resolver::resolve_product(&store, &tile(Some("ceramic"), Some("600x600"))).unwrap();

    assert_eq!(store.product_count(), 3);
}

#[test]
fn archived_products_still_resolve_to_their_row() {
    let store = Store::new();
    let product = resolver::resolve_product(&store, &tile(None, None)).unwrap();
    store.archive_product(product.id).unwrap();

    let again = resolver::resolve_product(&store, &tile(None, None)).unwrap();
    assert_eq!(again.id, product.id);
    assert_eq!(store.product_count(), 1, "archival must not fork the key");
}

/// Many writers racing the same product key: exactly one row is created.
/// Losers of the lookup/insert race surface a duplicate-key error instead of
/// being retried; that is the accepted contract.
#[test]
fn concurrent_product_resolution_creates_one_row() {
    let store = Store::new();

    let results: Vec<_> = (0..64)
        .into_par_iter()
        .map(|_| resolver::resolve_product(&store, &tile(Some("ceramic"), None)))
        .collect();

    assert_eq!(store.product_count(), 1);

    let mut winner = None;
    for result in results {
        match result {
            Ok(product) => {
                let id = *winner.get_or_insert(product.id);
                assert_eq!(product.id, id, "all hits must return the same row");
            }
            Err(e) => assert!(
                matches!(e, StoreError::DuplicateProduct(_)),
                "race losers must surface the uniqueness violation, got {e:?}"
            ),
        }
    }
    assert!(winner.is_some(), "someone must win the race");
}

#[test]
fn concurrent_party_resolution_creates_one_row() {
    let store = Store::new();

    let results: Vec<_> = (0..64)
        .into_par_iter()
        .map(|_| resolver::resolve_party(&store, &acme()))
        .collect();

    assert_eq!(store.party_count(), 1);
    for result in results {
        match result {
            Ok(party) => assert_eq!(party.name, "Acme Traders"),
            Err(e) => assert!(matches!(e, StoreError::DuplicateParty(_))),
        }
    }
}

#[test]
fn distinct_keys_resolve_concurrently_without_interference() {
    let store = Store::new();

    (0..32).into_par_iter().for_each(|i| {
        let spec = ProductSpec {
            name: format!("Product {i}"),
            material: None,
            size: None,
            unit: "piece".to_string(),
            opening_stock: None,
        };
        resolver::resolve_product(&store, &spec).unwrap();
    });

    assert_eq!(store.product_count(), 32);
}
