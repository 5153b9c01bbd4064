//! # Discount Routes
//!
//! `GET /api/discounts` is what the till shows: active discounts only.

use atelier_core::validation::validate_discount_input;
use atelier_core::{Discount, DiscountInput};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use tracing::info;

use crate::error::ApiResult;
use crate::state::SharedState;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/discounts", get(list_active).post(create_discount))
        .route("/api/discounts/all", get(list_all))
        .route(
            "/api/discounts/{id}",
            put(update_discount).delete(delete_discount),
        )
}

/// GET /api/discounts
async fn list_active(State(state): State<SharedState>) -> ApiResult<Json<Vec<Discount>>> {
    Ok(Json(state.db.discounts().list_active().await?))
}

/// GET /api/discounts/all
async fn list_all(State(state): State<SharedState>) -> ApiResult<Json<Vec<Discount>>> {
    Ok(Json(state.db.discounts().list_all().await?))
}

/// POST /api/discounts
async fn create_discount(
    State(state): State<SharedState>,
    payload: Result<Json<DiscountInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Discount>)> {
    let Json(input) = payload?;
    validate_discount_input(&input)?;

    let discount = state.db.discounts().insert(&input).await?;
    info!(id = %discount.id, kind = discount.kind.as_str(), value = discount.value, "Discount created");
    Ok((StatusCode::CREATED, Json(discount)))
}

/// PUT /api/discounts/{id}
async fn update_discount(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: Result<Json<DiscountInput>, JsonRejection>,
) -> ApiResult<Json<Discount>> {
    let Json(input) = payload?;
    validate_discount_input(&input)?;

    let discount = state.db.discounts().update(&id, &input).await?;
    info!(id = %discount.id, active = discount.active, "Discount updated");
    Ok(Json(discount))
}

/// DELETE /api/discounts/{id}
///
/// Recorded sales keep their own copy of the discount.
async fn delete_discount(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.discounts().delete(&id).await?;
    info!(id = %id, "Discount deleted");
    Ok(StatusCode::NO_CONTENT)
}
