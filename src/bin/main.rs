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

use clap::Parser;
use csv::{ReaderBuilder, Trim};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tokio::net::TcpListener;
use trade_ledger_rs::http::{AppState, router};
use trade_ledger_rs::party::PartyRole;
use trade_ledger_rs::resolver;
use trade_ledger_rs::validate::{NewParty, ProductSpec};
use trade_ledger_rs::Store;
use tracing_subscriber::EnvFilter;

/// Trade Ledger - inventory/ledger server for a small trading business
///
/// Serves the REST API over an in-process store. An optional CSV file of
/// parties and products can be loaded at startup to bootstrap the catalog.
#[derive(Parser, Debug)]
#[command(name = "trade-ledger-rs")]
#[command(about = "Serves the inventory/ledger REST API", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3000")]
    listen: SocketAddr,

    /// CSV file of parties and products loaded at startup
    ///
    /// Expected format: record,name,role_or_unit,material,size,opening
    /// Example rows:
    ///   party,Acme Traders,customer,,,150.00
    ///   product,Glossy Tile,box,ceramic,600x600,25
    #[arg(long, value_name = "FILE")]
    seed: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let store = Arc::new(Store::new());

    if let Some(path) = &args.seed {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Error opening seed file '{}': {}", path.display(), e);
                process::exit(1);
            }
        };
        match seed_store(&store, BufReader::new(file)) {
            Ok(count) => tracing::info!(count, "seed records loaded"),
            Err(e) => {
                eprintln!("Error loading seed data: {}", e);
                process::exit(1);
            }
        }
    }

    let app = router(AppState {
        store: Arc::clone(&store),
    });

    let listener = match TcpListener::bind(args.listen).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Error binding {}: {}", args.listen, e);
            process::exit(1);
        }
    };

    tracing::info!(addr = %args.listen, "trade ledger listening");
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        process::exit(1);
    }
}

/// Raw seed CSV record.
///
/// Fields: `record, name, role_or_unit, material, size, opening`
/// - `record`: "party" or "product"
/// - `role_or_unit`: the party role, or the product unit
/// - `opening`: opening balance (parties) or opening stock (products)
#[derive(Debug, Deserialize)]
struct SeedRecord {
    record: String,
    name: String,
    #[serde(default)]
    role_or_unit: Option<String>,
    #[serde(default)]
    material: Option<String>,
    #[serde(default)]
    size: Option<String>,
    #[serde(deserialize_with = "csv::invalid_option", default)]
    opening: Option<Decimal>,
}

impl SeedRecord {
    fn into_party(self) -> Option<NewParty> {
        let role = match self.role_or_unit.as_deref().map(str::to_lowercase).as_deref() {
            Some("customer") => PartyRole::Customer,
            Some("supplier") => PartyRole::Supplier,
            Some("both") => PartyRole::Both,
            Some("other") => PartyRole::Other,
            _ => return None,
        };
        Some(NewParty {
            name: self.name,
            role,
            opening_balance: self.opening,
            phone: None,
            address: None,
        })
    }

    fn into_product(self) -> Option<ProductSpec> {
        let unit = self.role_or_unit?;
        Some(ProductSpec {
            name: self.name,
            material: self.material,
            size: self.size,
            unit,
            opening_stock: self.opening,
        })
    }
}

/// Loads parties and products from a seed CSV.
///
/// Rows are resolved through find-or-create, so re-running a seed file
/// against a populated store is harmless. Malformed or unknown rows are
/// skipped; the count of loaded records is returned.
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the CSV structure is invalid.
fn seed_store<R: Read>(store: &Store, reader: R) -> Result<usize, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let mut loaded = 0usize;
    for result in rdr.deserialize::<SeedRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed seed row");
                continue;
            }
        };

        let outcome = match record.record.to_lowercase().as_str() {
            "party" => match record.into_party() {
                Some(new) => match new.validate() {
                    Ok(()) => resolver::resolve_party(store, &new).map(|_| ()),
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping invalid party seed row");
                        continue;
                    }
                },
                None => {
                    tracing::warn!("skipping party seed row with unknown role");
                    continue;
                }
            },
            "product" => match record.into_product() {
                Some(spec) => match spec.validate() {
                    Ok(()) => resolver::resolve_product(store, &spec).map(|_| ()),
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping invalid product seed row");
                        continue;
                    }
                },
                None => {
                    tracing::warn!("skipping product seed row without a unit");
                    continue;
                }
            },
            other => {
                tracing::warn!(record = other, "skipping unknown seed record type");
                continue;
            }
        };

        match outcome {
            Ok(()) => loaded += 1,
            Err(e) => tracing::warn!(error = %e, "skipping seed row the store rejected"),
        }
    }

    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Cursor;

    #[test]
    fn seed_loads_parties_and_products() {
        let csv = "record,name,role_or_unit,material,size,opening\n\
                   party,Acme Traders,customer,,,150.00\n\
                   product,Glossy Tile,box,ceramic,600x600,25\n";
        let store = Store::new();

        let loaded = seed_store(&store, Cursor::new(csv)).unwrap();

        assert_eq!(loaded, 2);
        let party = store.find_party_by_name("Acme Traders").unwrap();
        assert_eq!(party.role, PartyRole::Customer);
        assert_eq!(party.opening_balance, dec!(150.00));
        assert_eq!(store.product_count(), 1);
    }

    #[test]
    fn seed_tolerates_whitespace() {
        let csv = "record,name,role_or_unit,material,size,opening\n\
                   party , Acme Traders , customer , , , 10.00 \n";
        let store = Store::new();

        let loaded = seed_store(&store, Cursor::new(csv)).unwrap();

        assert_eq!(loaded, 1);
        assert!(store.find_party_by_name("Acme Traders").is_some());
    }

    #[test]
    fn seed_skips_unknown_and_malformed_rows() {
        let csv = "record,name,role_or_unit,material,size,opening\n\
                   party,Acme Traders,customer,,,0\n\
                   party,Broken Row,not-a-role,,,0\n\
                   invoice,Unknown Kind,x,,,0\n\
                   product,Glossy Tile,box,,,0\n";
        let store = Store::new();

        let loaded = seed_store(&store, Cursor::new(csv)).unwrap();

        assert_eq!(loaded, 2);
        assert_eq!(store.party_count(), 1);
        assert_eq!(store.product_count(), 1);
    }

    #[test]
    fn seed_is_idempotent_across_runs() {
        let csv = "record,name,role_or_unit,material,size,opening\n\
                   party,Acme Traders,customer,,,150.00\n\
                   product,Glossy Tile,box,ceramic,600x600,25\n";
        let store = Store::new();

        seed_store(&store, Cursor::new(csv)).unwrap();
        let second = seed_store(&store, Cursor::new(csv)).unwrap();

        assert_eq!(second, 2, "find-or-create resolves the same rows again");
        assert_eq!(store.party_count(), 1);
        assert_eq!(store.product_count(), 1);
    }

    #[test]
    fn seed_skips_product_rows_with_short_names() {
        let csv = "record,name,role_or_unit,material,size,opening\n\
                   product,T,box,,,0\n";
        let store = Store::new();

        let loaded = seed_store(&store, Cursor::new(csv)).unwrap();

        assert_eq!(loaded, 0);
        assert_eq!(store.product_count(), 0);
    }
}
