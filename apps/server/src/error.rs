//! # API Error Type
//!
//! Every handler returns `Result<_, ApiError>`. Lower layers convert in
//! through `From`, so handlers just use `?`.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ValidationError ──► CoreError ──┐                                      │
//! │                                  ├──► StoreError ──► ApiError ──► JSON  │
//! │  sqlx::Error ──────► DbError ────┘                                      │
//! │                                                                         │
//! │  400 VALIDATION_ERROR      bad input, empty cart, bad quantity          │
//! │  404 NOT_FOUND             product, line, discount, sale                │
//! │  409 CONFLICT              duplicate barcode, inactive discount, sold   │
//! │  409 INSUFFICIENT_STOCK    stock cannot cover the request               │
//! │  422 PAYMENT_ERROR         cash short of the total                      │
//! │  500 DATABASE_ERROR        storage failures (detail only in the log)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Response body:
//! ```json
//! { "code": "INSUFFICIENT_STOCK", "message": "Insufficient stock for Silk Scarf: 1 available, 2 requested" }
//! ```

use atelier_core::{CoreError, ValidationError};
use atelier_db::{DbError, StoreError};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    NotFound,
    Conflict,
    InsufficientStock,
    PaymentError,
    DatabaseError,
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict | ErrorCode::InsufficientStock => StatusCode::CONFLICT,
            ErrorCode::PaymentError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::Conflict,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => ApiError::new(ErrorCode::Conflict, message),
            DbError::CheckViolation(message) => ApiError::validation(message),
            other => {
                // detail stays in the log
                error!(error = %other, "Database operation failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::ProductNotFound(_)
            | CoreError::LineNotFound(_)
            | CoreError::DiscountNotFound(_)
            | CoreError::SaleNotFound(_) => ErrorCode::NotFound,
            CoreError::OutOfStock { .. }
            | CoreError::StockExceeded { .. }
            | CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::DiscountInactive(_) => ErrorCode::Conflict,
            CoreError::InsufficientPayment { .. } => ErrorCode::PaymentError,
            CoreError::InvalidQuantity
            | CoreError::EmptyCart
            | CoreError::CartTooLarge { .. }
            | CoreError::QuantityTooLarge { .. }
            | CoreError::AmountTooLarge
            | CoreError::Validation(_) => ErrorCode::ValidationError,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Rejected(e) => e.into(),
            StoreError::Db(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::Money;

    #[test]
    fn test_core_error_statuses() {
        let cases = [
            (CoreError::ProductNotFound("123".into()), StatusCode::NOT_FOUND),
            (CoreError::EmptyCart, StatusCode::BAD_REQUEST),
            (
                CoreError::InsufficientStock {
                    name: "Silk Scarf".into(),
                    available: 1,
                    requested: 2,
                },
                StatusCode::CONFLICT,
            ),
            (
                CoreError::InsufficientPayment {
                    total: Money::from_cents(900),
                    paid: Money::from_cents(500),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (CoreError::DiscountInactive("Ten Off".into()), StatusCode::CONFLICT),
            (CoreError::AmountTooLarge, StatusCode::BAD_REQUEST),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_db_errors_hide_detail() {
        let api: ApiError = DbError::QueryFailed("no such column: secret".into()).into();
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.message.contains("secret"));

        let api: ApiError = DbError::duplicate("barcode", "1001").into();
        assert_eq!(api.code, ErrorCode::Conflict);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ApiError::not_found("Sale", "ATL000009")).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Sale not found: ATL000009");
    }
}
