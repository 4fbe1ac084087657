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

//! REST boundary for the ledger.
//!
//! Amount fields travel as decimal strings (`"100.00"`), never floats.
//!
//! ## Endpoints
//!
//! - `GET  /parties` - Parties with totals and computed balance
//! - `POST /parties` - Find-or-create a party by name
//! - `GET  /parties/{id}` - Party detail with history and balance
//! - `GET  /products` - Active products
//! - `POST /products` - Find-or-create a product by natural key
//! - `POST /products/{id}/archive` - Soft-delete a product
//! - `POST /sales` - Quick-bill sale (items + payment + optional settlement)
//! - `POST /purchases` - Quick-bill purchase (items + optional payment)
//! - `POST /payments` - Record a standalone payment
//! - `POST /stock-moves` - Direct single stock-move insert
//! - `GET  /transactions` - Global merged ledger, newest first
//! - `GET  /transactions/export` - The same ledger as CSV
//!
//! Error responses distinguish "your input was invalid" (`400`/`404` with
//! per-field detail) from "the system failed to persist a valid request"
//! (`500` carrying the store's message and a machine-readable code).

use crate::base::{PartyId, ProductId};
use crate::composer::{self, PurchaseRequest, SaleRequest};
use crate::entry::{Payment, StockMove};
use crate::error::{LedgerError, StoreError};
use crate::party::Party;
use crate::product::Product;
use crate::report::{self, LedgerRow, PartySummary};
use crate::store::{PurchaseReceipt, SaleReceipt, Store};
use crate::validate::{NewParty, NewPayment, NewStockMove, ProductSpec};
use crate::{balance, resolver};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

// === Application State ===

/// Shared application state containing the backing store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
}

// === Response DTOs ===

/// Response body for find-or-create product requests.
#[derive(Debug, Serialize)]
pub struct ProductCreated {
    pub id: ProductId,
    pub name: String,
}

/// Response body for `GET /parties/{id}`.
#[derive(Debug, Serialize)]
pub struct PartyDetail {
    pub party: Party,
    pub stock_moves: Vec<StockMove>,
    pub payments: Vec<Payment>,
    pub balance: Decimal,
}

/// Response body for errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    /// Field-path-keyed messages, present on validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, Vec<String>>>,
    /// Index of the line item that failed resolution, when one did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<usize>,
}

// === Error Handling ===

/// Wrapper converting [`LedgerError`] into HTTP responses.
pub struct AppError(LedgerError);

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            LedgerError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            LedgerError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            LedgerError::Resolution { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "RESOLUTION_FAILED")
            }
            LedgerError::Submit { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "SUBMIT_FAILED"),
        };

        let fields = match &self.0 {
            LedgerError::Validation(errors) => Some(errors.field_errors.clone()),
            _ => None,
        };
        let item = match &self.0 {
            LedgerError::Resolution { item, .. } => *item,
            _ => None,
        };

        if status.is_server_error() {
            tracing::warn!(error = %self.0, "request failed at the store");
        } else {
            tracing::debug!(error = %self.0, "request rejected");
        }

        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
                code: code.to_string(),
                fields,
                item,
            }),
        )
            .into_response()
    }
}

fn resolution_error(source: StoreError) -> AppError {
    AppError(LedgerError::Resolution { item: None, source })
}

fn insert_error(source: StoreError) -> AppError {
    let err = match source {
        StoreError::PartyNotFound(id) => LedgerError::not_found("party", id),
        StoreError::ProductNotFound(id) => LedgerError::not_found("product", id),
        other => LedgerError::Submit { source: other },
    };
    AppError(err)
}

// === Handlers ===

/// GET /parties - List parties with totals and balances.
async fn list_parties(State(state): State<AppState>) -> Json<Vec<PartySummary>> {
    Json(report::parties_with_totals(&state.store))
}

/// POST /parties - Find or create a party by name.
async fn create_party(
    State(state): State<AppState>,
    Json(request): Json<NewParty>,
) -> Result<Json<Party>, AppError> {
    request.validate().map_err(LedgerError::from)?;
    let party = resolver::resolve_party(&state.store, &request).map_err(resolution_error)?;
    Ok(Json(party))
}

/// GET /parties/{id} - Party detail with history and computed balance.
async fn get_party(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PartyDetail>, AppError> {
    let party_id = PartyId(id);
    let party = state
        .store
        .get_party(party_id)
        .ok_or_else(|| AppError(LedgerError::not_found("party", party_id)))?;

    let balance = balance::balance(
        party.opening_balance,
        &state.store.entries_for_party(party_id),
    );

    Ok(Json(PartyDetail {
        stock_moves: state.store.stock_moves_for_party(party_id),
        payments: state.store.payments_for_party(party_id),
        balance,
        party,
    }))
}

/// GET /products - Active products, name-ordered.
async fn list_products(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(state.store.active_products())
}

/// POST /products - Find or create a product by its natural key.
async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<ProductSpec>,
) -> Result<Json<ProductCreated>, AppError> {
    request.validate().map_err(LedgerError::from)?;
    let product = resolver::resolve_product(&state.store, &request).map_err(resolution_error)?;
    Ok(Json(ProductCreated {
        id: product.id,
        name: product.name,
    }))
}

/// POST /products/{id}/archive - Exclude a product from active listings.
async fn archive_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, AppError> {
    let product = state
        .store
        .archive_product(ProductId(id))
        .map_err(insert_error)?;
    Ok(Json(product))
}

/// POST /sales - Create a quick-bill sale atomically.
async fn create_sale(
    State(state): State<AppState>,
    Json(request): Json<SaleRequest>,
) -> Result<(StatusCode, Json<SaleReceipt>), AppError> {
    let receipt = composer::create_sale(&state.store, &request)?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// POST /purchases - Create a quick-bill purchase atomically.
async fn create_purchase(
    State(state): State<AppState>,
    Json(request): Json<PurchaseRequest>,
) -> Result<(StatusCode, Json<PurchaseReceipt>), AppError> {
    let receipt = composer::create_purchase(&state.store, &request)?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// POST /payments - Record a standalone payment.
async fn create_payment(
    State(state): State<AppState>,
    Json(request): Json<NewPayment>,
) -> Result<(StatusCode, Json<Payment>), AppError> {
    request.validate().map_err(LedgerError::from)?;
    let payment = state.store.insert_payment(&request).map_err(insert_error)?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// POST /stock-moves - Direct single stock-move insert.
async fn create_stock_move(
    State(state): State<AppState>,
    Json(request): Json<NewStockMove>,
) -> Result<(StatusCode, Json<StockMove>), AppError> {
    request.validate().map_err(LedgerError::from)?;
    let stock_move = state
        .store
        .insert_stock_move(&request)
        .map_err(insert_error)?;
    Ok((StatusCode::CREATED, Json(stock_move)))
}

/// GET /transactions - Global merged ledger, newest first.
async fn list_transactions(State(state): State<AppState>) -> Json<Vec<LedgerRow>> {
    Json(report::global_ledger(&state.store))
}

/// GET /transactions/export - The global ledger as CSV.
async fn export_transactions(
    State(state): State<AppState>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let rows = report::global_ledger(&state.store);
    let mut output = Vec::new();
    report::write_csv(&rows, &mut output).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
                code: "EXPORT_FAILED".to_string(),
                fields: None,
                item: None,
            }),
        )
    })?;

    Ok((
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        output,
    )
        .into_response())
}

// === Router ===

/// Builds the API router over shared store state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/parties", get(list_parties).post(create_party))
        .route("/parties/{id}", get(get_party))
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}/archive", post(archive_product))
        .route("/sales", post(create_sale))
        .route("/purchases", post(create_purchase))
        .route("/payments", post(create_payment))
        .route("/stock-moves", post(create_stock_move))
        .route("/transactions", get(list_transactions))
        .route("/transactions/export", get(export_transactions))
        .with_state(state)
}
