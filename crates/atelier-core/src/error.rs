//! # Error Types
//!
//! Domain errors raised by the cart, pricing and ledger rules.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  atelier-core   CoreError, ValidationError   (this file)               │
//! │  atelier-db     DbError, StoreError          storage + ledger          │
//! │  server         ApiError                     { code, message } JSON    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → ApiError → terminal  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Nothing in the catalog matches.
    ///
    /// ## When This Occurs
    /// - A scanned barcode has no exact match
    /// - A sale request names a product id that has been deleted
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Scanned product has no units on hand.
    #[error("{name} is out of stock")]
    OutOfStock { name: String },

    /// Cart quantity would exceed the stock seen when the product was scanned.
    ///
    /// ## User Workflow
    /// ```text
    /// Scan "Denim Jacket" (stock 2) → qty 1
    /// Scan again                    → qty 2
    /// Scan again                    → StockExceeded { available: 2 }
    /// ```
    #[error("Only {available} of {name} in stock")]
    StockExceeded { name: String, available: i64 },

    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Cart line not found: {0}")]
    LineNotFound(String),

    #[error("Cart is empty")]
    EmptyCart,

    /// Stock moved between scanning and committing.
    ///
    /// ## When This Occurs
    /// - Another terminal sold the last units first
    /// - Someone lowered stock in the catalog while the cart was open
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    #[error("Insufficient payment: total {total}, paid {paid}")]
    InsufficientPayment { total: Money, paid: Money },

    #[error("Discount not found: {0}")]
    DiscountNotFound(String),

    #[error("Discount {0} is not active")]
    DiscountInactive(String),

    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// A line total or subtotal does not fit in [`Money`].
    #[error("Amount too large to record")]
    AmountTooLarge,

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Stock and payment problems the cashier can fix at the till.
    pub fn is_checkout_blocker(&self) -> bool {
        matches!(
            self,
            CoreError::OutOfStock { .. }
                | CoreError::StockExceeded { .. }
                | CoreError::InsufficientStock { .. }
                | CoreError::InsufficientPayment { .. }
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Malformed input caught before any business rule runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must not be negative")]
    Negative { field: String },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            name: "Silk Scarf".to_string(),
            available: 1,
            requested: 3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Silk Scarf: available 1, requested 3"
        );

        let err = CoreError::InsufficientPayment {
            total: Money::from_cents(900),
            paid: Money::from_cents(500),
        };
        assert_eq!(err.to_string(), "Insufficient payment: total 9.00, paid 5.00");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::Required {
            field: "barcode".to_string(),
        }
        .into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "Validation error: barcode is required");
    }

    #[test]
    fn test_checkout_blockers() {
        assert!(!CoreError::EmptyCart.is_checkout_blocker());
        assert!(CoreError::OutOfStock { name: "x".into() }.is_checkout_blocker());
    }
}
