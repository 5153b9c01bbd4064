//! # Domain Types
//!
//! Catalog records, sale records and the payloads that carry them across the
//! HTTP boundary.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog (mutable)            Ledger (immutable once written)           │
//! │  ┌─────────────────┐          ┌─────────────────┐                      │
//! │  │    Product      │◄─────────│    SaleLine     │  name/barcode/price  │
//! │  │  barcode        │ product  │  snapshot       │  frozen at sale time │
//! │  │  price, stock   │          └────────┬────────┘                      │
//! │  └───────┬─────────┘                   │ items                         │
//! │          │ supplier_id        ┌────────▼────────┐                      │
//! │  ┌───────▼─────────┐          │      Sale       │                      │
//! │  │    Supplier     │          │  receipt_number │                      │
//! │  └─────────────────┘          │  discount ──────┼──► DiscountSnapshot  │
//! │  ┌─────────────────┐          │  payment_method │                      │
//! │  │    Discount     │─────────►│  total, change  │                      │
//! │  │  kind + value   │ copied   └─────────────────┘                      │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All JSON is camelCase. Money fields are integers in minor units.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A garment or accessory on the shop floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    pub id: String,

    /// Scanned at the till. Unique across the catalog.
    pub barcode: String,

    pub name: String,

    /// Free-form grouping such as "Dresses" or "Footwear".
    pub category: String,

    pub size: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,

    #[cfg_attr(feature = "sqlx", sqlx(rename = "price_cents"))]
    pub price: Money,

    #[cfg_attr(feature = "sqlx", sqlx(rename = "cost_cents"))]
    pub cost: Money,

    /// Units on hand. Never negative.
    pub stock: i64,

    pub supplier_id: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// True when at least `quantity` units are on hand.
    #[inline]
    pub fn has_stock_for(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

/// Fields accepted when creating or replacing a product.
///
/// `stock` is an absolute level; the catalog editor sets it, the ledger
/// only ever decrements it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductInput {
    pub barcode: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub cost: Money,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub supplier_id: Option<String>,
}

// =============================================================================
// Supplier
// =============================================================================

/// Who a product is bought from. Reference data only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: String,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SupplierInput {
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
}

// =============================================================================
// Discount
// =============================================================================

/// How a discount's `value` is interpreted.
///
/// - `Percentage`: whole percent of the subtotal (10 = 10%)
/// - `Fixed`: an amount in minor units, capped at the subtotal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum DiscountKind {
    Percentage,
    Fixed,
}

impl DiscountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountKind::Percentage => "percentage",
            DiscountKind::Fixed => "fixed",
        }
    }
}

/// A promotion the cashier can apply to the whole cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Discount {
    pub id: String,
    pub name: String,

    #[serde(rename = "type")]
    pub kind: DiscountKind,

    /// Percent (0 to 100) for `Percentage`, minor units for `Fixed`.
    pub value: i64,

    pub active: bool,

    #[ts(as = "Option<String>")]
    pub start_date: Option<DateTime<Utc>>,

    #[ts(as = "Option<String>")]
    pub end_date: Option<DateTime<Utc>>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Discount {
    /// Whether `now` falls inside the optional validity window.
    ///
    /// Shown to the cashier alongside the discount; checkout only gates on
    /// the `active` flag.
    pub fn in_window(&self, now: DateTime<Utc>) -> bool {
        let started = self.start_date.map_or(true, |start| start <= now);
        let not_ended = self.end_date.map_or(true, |end| now <= end);
        started && not_ended
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DiscountInput {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    pub value: i64,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub end_date: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

/// The discount as it was when the sale was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DiscountSnapshot {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    pub value: i64,
    /// The amount actually taken off this sale.
    pub amount: Money,
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PaymentMethod {
    Cash,
    Card,
    Mobile,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Mobile => "mobile",
        }
    }

    /// Only cash hands back change.
    #[inline]
    pub fn gives_change(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// One persisted line of a sale. Name, barcode and price are copies taken
/// at commit time and do not follow later catalog edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleLine {
    #[serde(rename = "product")]
    pub product_id: String,
    pub name: String,
    pub barcode: String,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "price_cents"))]
    pub price: Money,
    pub quantity: i64,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "total_cents"))]
    pub total: Money,
}

/// A completed sale. Never updated after it is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Sale {
    pub id: String,

    /// Store prefix plus a six digit sequence, e.g. `ATL000042`.
    pub receipt_number: String,

    pub items: Vec<SaleLine>,
    pub subtotal: Money,
    pub discount: Option<DiscountSnapshot>,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub amount_paid: Money,
    pub change: Money,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Units across all lines.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|line| line.quantity).sum()
    }
}

// =============================================================================
// Sale Request
// =============================================================================

/// What a terminal submits at checkout.
///
/// Only product ids, quantities, the discount choice, the payment method and
/// the amount paid are authoritative. Prices and totals are recomputed from
/// the catalog; the ones sent here are compared and logged when they differ.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleRequest {
    pub items: Vec<SaleRequestItem>,
    #[serde(default)]
    pub subtotal: Option<Money>,
    #[serde(default)]
    pub discount: Option<DiscountRequest>,
    #[serde(default)]
    pub total: Option<Money>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub amount_paid: Money,
    #[serde(default)]
    pub change: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleRequestItem {
    /// Product id.
    pub product: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub barcode: String,
    pub quantity: i64,
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default)]
    pub total: Option<Money>,
}

/// The discount chosen at the till.
///
/// With an `id` the catalog record is authoritative. Without one the
/// `type`/`value` pair is applied as an ad-hoc discount.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DiscountRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    pub value: i64,
    #[serde(default)]
    pub amount: Option<Money>,
}

// =============================================================================
// Unit Tests
// =============================================================================
