//! # HTTP Routes
//!
//! | Area      | Module        | Prefix                         |
//! |-----------|---------------|--------------------------------|
//! | Health    | this module   | `/health`                      |
//! | Catalog   | [`catalog`]   | `/api/products`, `/api/suppliers` |
//! | Discounts | [`discounts`] | `/api/discounts`               |
//! | Sales     | [`sales`]     | `/api/sales`                   |
//! | Carts     | [`cart`]      | `/api/terminals/{terminal}`    |
//!
//! Bodies are camelCase JSON; money is an integer in minor units.

pub mod cart;
pub mod catalog;
pub mod discounts;
pub mod sales;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::SharedState;

/// Default page size for list endpoints.
pub const DEFAULT_LIST_LIMIT: u32 = 50;

/// Upper bound on any list request.
pub const MAX_LIST_LIMIT: u32 = 500;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/health", get(health))
        .merge(catalog::router())
        .merge(discounts::router())
        .merge(sales::router())
        .merge(cart::router())
}

/// Clamps an optional `?limit=` to `1..=MAX_LIST_LIMIT`.
pub(crate) fn list_limit(requested: Option<u32>) -> u32 {
    requested
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    database: bool,
}

/// GET /health
async fn health(State(state): State<SharedState>) -> (StatusCode, Json<HealthResponse>) {
    let database = state.db.health_check().await;
    let (status, label) = if database {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(HealthResponse {
            status: label,
            version: env!("CARGO_PKG_VERSION"),
            database,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_limit_clamps() {
        assert_eq!(list_limit(None), DEFAULT_LIST_LIMIT);
        assert_eq!(list_limit(Some(0)), 1);
        assert_eq!(list_limit(Some(10_000)), MAX_LIST_LIMIT);
        assert_eq!(list_limit(Some(20)), 20);
    }
}
