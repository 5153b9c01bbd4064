//! # Cart Routes
//!
//! Each terminal owns one server-side cart, addressed by the terminal id
//! in the path.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│  Sale +  │       │
//! │  │  Cart    │     │          │     │          │     │ Receipt  │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │       ▲                │                                  │             │
//! │       │           scan, quantity,                         │             │
//! │       │           remove, discount                        │             │
//! │       │                │                                  │             │
//! │       └──── DELETE cart┘◄──────── emptied on success ─────┘             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed checkout leaves the cart as it was so the cashier can fix it.

use atelier_core::{CartView, CoreError, Money, PaymentMethod, Sale};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiResult;
use crate::state::SharedState;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/api/terminals/{terminal}/cart",
            get(view_cart).delete(clear_cart),
        )
        .route("/api/terminals/{terminal}/cart/scan", post(scan))
        .route(
            "/api/terminals/{terminal}/cart/lines/{line_id}",
            put(set_quantity).delete(remove_line),
        )
        .route("/api/terminals/{terminal}/cart/discount", put(select_discount))
        .route("/api/terminals/{terminal}/checkout", post(checkout))
}

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub barcode: String,
}

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountSelection {
    /// `None` clears the discount.
    #[serde(default)]
    pub discount_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub amount_paid: Money,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub sale: Sale,
    pub receipt: String,
}

/// GET /api/terminals/{terminal}/cart
async fn view_cart(State(state): State<SharedState>, Path(terminal): Path<String>) -> Json<CartView> {
    Json(state.carts.with_cart(&terminal, |cart| CartView::from(&*cart)))
}

/// DELETE /api/terminals/{terminal}/cart
async fn clear_cart(
    State(state): State<SharedState>,
    Path(terminal): Path<String>,
) -> Json<CartView> {
    debug!(terminal = %terminal, "Clearing cart");
    Json(state.carts.with_cart(&terminal, |cart| {
        cart.clear();
        CartView::from(&*cart)
    }))
}

/// POST /api/terminals/{terminal}/cart/scan
///
/// Looks the barcode up, then adds one unit.
async fn scan(
    State(state): State<SharedState>,
    Path(terminal): Path<String>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> ApiResult<Json<CartView>> {
    let Json(ScanRequest { barcode }) = payload?;
    let barcode = barcode.trim();

    let product = state
        .db
        .products()
        .find_by_barcode(barcode)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(barcode.to_string()))?;

    let view = state.carts.with_cart(&terminal, |cart| {
        let line = cart.add_product(&product)?;
        debug!(terminal = %terminal, barcode = %barcode, quantity = line.quantity, "Scanned");
        Ok::<_, CoreError>(CartView::from(&*cart))
    })?;

    Ok(Json(view))
}

/// PUT /api/terminals/{terminal}/cart/lines/{line_id}
async fn set_quantity(
    State(state): State<SharedState>,
    Path((terminal, line_id)): Path<(String, String)>,
    payload: Result<Json<QuantityRequest>, JsonRejection>,
) -> ApiResult<Json<CartView>> {
    let Json(QuantityRequest { quantity }) = payload?;

    let view = state.carts.with_cart(&terminal, |cart| {
        cart.set_quantity(&line_id, quantity)?;
        Ok::<_, CoreError>(CartView::from(&*cart))
    })?;

    Ok(Json(view))
}

/// DELETE /api/terminals/{terminal}/cart/lines/{line_id}
async fn remove_line(
    State(state): State<SharedState>,
    Path((terminal, line_id)): Path<(String, String)>,
) -> ApiResult<Json<CartView>> {
    let view = state.carts.with_cart(&terminal, |cart| {
        cart.remove_line(&line_id)?;
        Ok::<_, CoreError>(CartView::from(&*cart))
    })?;

    Ok(Json(view))
}

/// PUT /api/terminals/{terminal}/cart/discount
///
/// Only active discounts can be selected.
async fn select_discount(
    State(state): State<SharedState>,
    Path(terminal): Path<String>,
    payload: Result<Json<DiscountSelection>, JsonRejection>,
) -> ApiResult<Json<CartView>> {
    let Json(selection) = payload?;

    let discount = match selection.discount_id {
        None => None,
        Some(id) => {
            let discount = state
                .db
                .discounts()
                .find_by_id(&id)
                .await?
                .ok_or_else(|| CoreError::DiscountNotFound(id.clone()))?;
            if !discount.active {
                return Err(CoreError::DiscountInactive(discount.name).into());
            }
            Some(discount)
        }
    };

    let view = state.carts.with_cart(&terminal, |cart| {
        cart.select_discount(discount);
        CartView::from(&*cart)
    });

    Ok(Json(view))
}

/// POST /api/terminals/{terminal}/checkout
///
/// Commits the cart, takes the sold lines out of it and returns the sale
/// with its printed receipt.
async fn checkout(
    State(state): State<SharedState>,
    Path(terminal): Path<String>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CheckoutResponse>)> {
    let Json(CheckoutRequest {
        payment_method,
        amount_paid,
    }) = payload?;

    let (sold, request) = state.carts.with_cart(&terminal, |cart| {
        let request = cart.to_sale_request(payment_method, amount_paid)?;
        Ok::<_, CoreError>((cart.clone(), request))
    })?;

    let sale = state
        .db
        .ledger()
        .commit(&request, state.receipt_prefix())
        .await?;

    // scans that landed during the commit stay in the cart
    state.carts.with_cart(&terminal, |cart| cart.remove_sold(&sold));
    info!(terminal = %terminal, receipt_number = %sale.receipt_number, "Checkout complete");

    let receipt = state.renderer.render(&sale);
    Ok((StatusCode::CREATED, Json(CheckoutResponse { sale, receipt })))
}
