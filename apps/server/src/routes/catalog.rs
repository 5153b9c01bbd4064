//! # Catalog Routes
//!
//! Products and suppliers. The till only needs the barcode lookup; the rest
//! is back-office maintenance.

use atelier_core::validation::{validate_barcode, validate_product_input, validate_supplier_input};
use atelier_core::{Product, ProductInput, Supplier, SupplierInput};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{debug, info};

use super::list_limit;
use crate::error::{ApiError, ApiResult};
use crate::state::SharedState;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/api/products/barcode/{barcode}", get(product_by_barcode))
        .route("/api/suppliers", get(list_suppliers).post(create_supplier))
        .route(
            "/api/suppliers/{id}",
            axum::routing::put(update_supplier).delete(delete_supplier),
        )
}

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    /// Substring of name, barcode or category.
    pub q: Option<String>,
    pub limit: Option<u32>,
}

// =============================================================================
// Products
// =============================================================================

/// GET /api/products
async fn list_products(
    State(state): State<SharedState>,
    Query(query): Query<ProductQuery>,
) -> ApiResult<Json<Vec<Product>>> {
    let search = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let products = state
        .db
        .products()
        .list(search, list_limit(query.limit))
        .await?;
    Ok(Json(products))
}

/// POST /api/products
async fn create_product(
    State(state): State<SharedState>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let Json(input) = payload?;
    validate_product_input(&input)?;

    let product = state.db.products().insert(&input).await?;
    info!(id = %product.id, barcode = %product.barcode, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /api/products/{id}
async fn get_product(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.db.products().get(&id).await?))
}

/// PUT /api/products/{id}
///
/// Replaces every field, stock included.
async fn update_product(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> ApiResult<Json<Product>> {
    let Json(input) = payload?;
    validate_product_input(&input)?;

    let product = state.db.products().update(&id, &input).await?;
    info!(id = %product.id, stock = product.stock, "Product updated");
    Ok(Json(product))
}

/// DELETE /api/products/{id}
///
/// 409 once the product appears on any sale.
async fn delete_product(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.products().delete(&id).await?;
    info!(id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/products/barcode/{barcode}
async fn product_by_barcode(
    State(state): State<SharedState>,
    Path(barcode): Path<String>,
) -> ApiResult<Json<Product>> {
    validate_barcode(&barcode)?;
    debug!(barcode = %barcode, "Barcode lookup");

    state
        .db
        .products()
        .find_by_barcode(&barcode)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product", &barcode))
}

// =============================================================================
// Suppliers
// =============================================================================

/// GET /api/suppliers
async fn list_suppliers(State(state): State<SharedState>) -> ApiResult<Json<Vec<Supplier>>> {
    Ok(Json(state.db.suppliers().list().await?))
}

/// POST /api/suppliers
async fn create_supplier(
    State(state): State<SharedState>,
    payload: Result<Json<SupplierInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Supplier>)> {
    let Json(input) = payload?;
    validate_supplier_input(&input)?;

    let supplier = state.db.suppliers().insert(&input).await?;
    info!(id = %supplier.id, "Supplier created");
    Ok((StatusCode::CREATED, Json(supplier)))
}

/// PUT /api/suppliers/{id}
async fn update_supplier(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: Result<Json<SupplierInput>, JsonRejection>,
) -> ApiResult<Json<Supplier>> {
    let Json(input) = payload?;
    validate_supplier_input(&input)?;

    Ok(Json(state.db.suppliers().update(&id, &input).await?))
}

/// DELETE /api/suppliers/{id}
async fn delete_supplier(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.suppliers().delete(&id).await?;
    info!(id = %id, "Supplier deleted");
    Ok(StatusCode::NO_CONTENT)
}
