//! # atelier-core: Pure Business Logic for Atelier POS
//!
//! Everything the till needs to know about money, carts, discounts and
//! receipts, with no I/O. Storage lives in `atelier-db`, HTTP in
//! `atelier-server`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Atelier POS Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               Checkout terminals (browser)                      │   │
//! │  │     Scan ──► Cart ──► Discount ──► Pay ──► Receipt             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    atelier-server (axum)                        │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │                              │                        │
//! │  ┌──────────────▼──────────────────┐  ┌────────▼──────────────────┐    │
//! │  │   ★ atelier-core (THIS CRATE) ★  │  │  atelier-db (SQLite)      │    │
//! │  │  money  pricing  cart  receipt  │◄─┤  catalog + sale ledger    │    │
//! │  │  types  validation  error       │  └───────────────────────────┘    │
//! │  └─────────────────────────────────┘                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - integer minor-unit `Money`
//! - [`types`] - Product, Supplier, Discount, Sale and request payloads
//! - [`pricing`] - discount, total and change arithmetic
//! - [`cart`] - the per-terminal cart engine
//! - [`receipt`] - fixed-width receipt text
//! - [`validation`] - input checks
//! - [`error`] - domain errors
//!
//! ## Example Usage
//!
//! ```rust
//! use atelier_core::pricing::Totals;
//! use atelier_core::types::DiscountKind;
//! use atelier_core::Money;
//!
//! let totals = Totals::compute(
//!     [Money::from_cents(500), Money::from_cents(500)],
//!     Some((DiscountKind::Percentage, 10)), // 10%
//! );
//! assert_eq!(totals.total.cents(), 900);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod pricing;
pub mod receipt;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, CartView};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::Totals;
pub use receipt::{ReceiptRenderer, StoreHeader};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity on a single line.
///
/// Catches a mistyped 1000 where 10 was meant.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest accepted price, cost, payment or fixed discount, in minor units.
///
/// A full cart of [`MAX_CART_ITEMS`] lines at [`MAX_ITEM_QUANTITY`] each
/// stays far inside `i64` at this price.
pub const MAX_MONEY_CENTS: i64 = 100_000_000_000;

/// Digits in the numeric part of a receipt number.
pub const RECEIPT_SEQUENCE_DIGITS: usize = 6;

/// Builds a receipt number from a prefix and a sequence value.
///
/// ```rust
/// assert_eq!(atelier_core::format_receipt_number("ATL", 42), "ATL000042");
/// ```
pub fn format_receipt_number(prefix: &str, sequence: i64) -> String {
    format!(
        "{}{:0width$}",
        prefix,
        sequence,
        width = RECEIPT_SEQUENCE_DIGITS
    )
}
