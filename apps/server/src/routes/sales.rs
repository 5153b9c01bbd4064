//! # Sale Routes
//!
//! `POST /api/sales` accepts a full sale request from a client that kept
//! its own cart. Terminals using the server-side cart go through
//! `/api/terminals/{terminal}/checkout` instead; both end in the same
//! [`Ledger::commit`](atelier_db::Ledger::commit).

use atelier_core::{Sale, SaleRequest};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use super::list_limit;
use crate::error::ApiResult;
use crate::state::SharedState;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/sales", get(list_sales).post(commit_sale))
        .route("/api/sales/{receipt_number}", get(get_sale))
        .route("/api/sales/{receipt_number}/receipt", get(get_receipt))
}

#[derive(Debug, Deserialize)]
pub struct SaleQuery {
    pub limit: Option<u32>,
}

/// GET /api/sales
///
/// The full history, newest first. `?limit=` keeps only the most recent.
async fn list_sales(
    State(state): State<SharedState>,
    Query(query): Query<SaleQuery>,
) -> ApiResult<Json<Vec<Sale>>> {
    let limit = query.limit.map(|n| list_limit(Some(n)));
    Ok(Json(state.db.sales().list(limit).await?))
}

/// POST /api/sales
async fn commit_sale(
    State(state): State<SharedState>,
    payload: Result<Json<SaleRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Sale>)> {
    let Json(request) = payload?;
    let sale = state
        .db
        .ledger()
        .commit(&request, state.receipt_prefix())
        .await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

/// GET /api/sales/{receipt_number}
async fn get_sale(
    State(state): State<SharedState>,
    Path(receipt_number): Path<String>,
) -> ApiResult<Json<Sale>> {
    Ok(Json(state.db.sales().get_by_receipt(&receipt_number).await?))
}

/// GET /api/sales/{receipt_number}/receipt
///
/// Plain text, ready for a receipt printer.
async fn get_receipt(
    State(state): State<SharedState>,
    Path(receipt_number): Path<String>,
) -> ApiResult<String> {
    let sale = state.db.sales().get_by_receipt(&receipt_number).await?;
    Ok(state.renderer.render(&sale))
}
