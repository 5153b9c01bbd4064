//! # Cart Engine
//!
//! The transient cart a terminal builds while scanning. Pure computation: the
//! caller looks products up and hands them in; nothing here touches storage.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operator Action        Cart Operation          Failure                 │
//! │  ───────────────        ──────────────          ───────                 │
//! │  Scan barcode ─────────► add_product() ───────► OutOfStock              │
//! │                                                 StockExceeded           │
//! │  Type quantity ────────► set_quantity() ──────► InvalidQuantity         │
//! │                                                 StockExceeded           │
//! │                                                 LineNotFound            │
//! │  Remove line ──────────► remove_line() ───────► LineNotFound            │
//! │  Pick discount ────────► select_discount()                              │
//! │  Cancel ───────────────► clear()                                        │
//! │  After sale ───────────► remove_sold()                                  │
//! │  Pay ──────────────────► to_sale_request() ───► EmptyCart               │
//! │                          change() ────────────► InsufficientPayment     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one line per product; rescanning bumps that line's quantity
//! - Every line satisfies `1 <= quantity <= known_stock`
//! - Line order is scan order

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::{self, Totals};
use crate::types::{
    Discount, DiscountRequest, PaymentMethod, Product, SaleRequest, SaleRequestItem,
};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// A product in the cart, with the catalog values seen at scan time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub barcode: String,
    pub unit_price: Money,
    /// Stock level when the product was last scanned.
    pub known_stock: i64,
    pub quantity: i64,
}

impl CartLine {
    fn from_product(product: &Product) -> Self {
        CartLine {
            id: Uuid::new_v4().to_string(),
            product_id: product.id.clone(),
            name: product.name.clone(),
            barcode: product.barcode.clone(),
            unit_price: product.price,
            known_stock: product.stock,
            quantity: 1,
        }
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    pub lines: Vec<CartLine>,
    pub discount: Option<Discount>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            discount: None,
            created_at: Utc::now(),
        }
    }

    /// Adds one unit of a scanned product.
    ///
    /// A product already in the cart gets its quantity bumped; the line's
    /// snapshot is refreshed from `product` so a restock shows up at once.
    ///
    /// ## Errors
    /// - `OutOfStock` when `product.stock <= 0`
    /// - `StockExceeded` when the bump would pass the stock on hand
    /// - `CartTooLarge` when a new line would pass [`MAX_CART_ITEMS`]
    pub fn add_product(&mut self, product: &Product) -> CoreResult<&CartLine> {
        if product.stock <= 0 {
            return Err(CoreError::OutOfStock {
                name: product.name.clone(),
            });
        }

        if let Some(index) = self.lines.iter().position(|l| l.product_id == product.id) {
            let line = &mut self.lines[index];
            let next = line.quantity + 1;
            if next > product.stock {
                return Err(CoreError::StockExceeded {
                    name: product.name.clone(),
                    available: product.stock,
                });
            }
            line.name = product.name.clone();
            line.unit_price = product.price;
            line.known_stock = product.stock;
            line.quantity = next;
            return Ok(&self.lines[index]);
        }

        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.lines.push(CartLine::from_product(product));
        let last = self.lines.len() - 1;
        Ok(&self.lines[last])
    }

    /// Sets a line to an exact quantity.
    pub fn set_quantity(&mut self, line_id: &str, quantity: i64) -> CoreResult<&CartLine> {
        if quantity < 1 {
            return Err(CoreError::InvalidQuantity);
        }
        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or_else(|| CoreError::LineNotFound(line_id.to_string()))?;

        if quantity > line.known_stock {
            return Err(CoreError::StockExceeded {
                name: line.name.clone(),
                available: line.known_stock,
            });
        }

        line.quantity = quantity;
        Ok(&*line)
    }

    pub fn remove_line(&mut self, line_id: &str) -> CoreResult<CartLine> {
        let index = self
            .lines
            .iter()
            .position(|l| l.id == line_id)
            .ok_or_else(|| CoreError::LineNotFound(line_id.to_string()))?;
        Ok(self.lines.remove(index))
    }

    /// Selects a discount, or clears the selection with `None`.
    pub fn select_discount(&mut self, discount: Option<Discount>) {
        self.discount = discount;
    }

    /// Empties the cart and drops the discount.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.discount = None;
        self.created_at = Utc::now();
    }

    /// Takes a committed sale out of the cart.
    ///
    /// `sold` is the cart as it was when the sale request was built. Lines
    /// scanned since then stay, and a line bumped since then keeps only the
    /// extra units. The discount goes with the sale unless it was changed.
    pub fn remove_sold(&mut self, sold: &Cart) {
        for sold_line in &sold.lines {
            let Some(index) = self.lines.iter().position(|l| l.id == sold_line.id) else {
                continue;
            };
            let remaining = self.lines[index].quantity - sold_line.quantity;
            if remaining > 0 {
                self.lines[index].quantity = remaining;
            } else {
                self.lines.remove(index);
            }
        }

        if self.lines.is_empty() {
            self.clear();
        } else if self.discount == sold.discount {
            self.discount = None;
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Units across all lines.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    // =========================================================================
    // Totals
    // =========================================================================

    pub fn totals(&self) -> Totals {
        Totals::compute(
            self.lines.iter().map(CartLine::line_total),
            self.discount.as_ref().map(|d| (d.kind, d.value)),
        )
    }

    pub fn subtotal(&self) -> Money {
        self.totals().subtotal
    }

    pub fn discount_amount(&self) -> Money {
        self.totals().discount
    }

    pub fn total(&self) -> Money {
        self.totals().total
    }

    /// Change due for `paid` under `method`.
    pub fn change(&self, method: PaymentMethod, paid: Money) -> CoreResult<Money> {
        pricing::change_due(method, self.total(), paid)
    }

    /// Builds the request submitted to the sale ledger.
    ///
    /// Card and mobile payments are recorded as paying the exact total.
    pub fn to_sale_request(&self, method: PaymentMethod, paid: Money) -> CoreResult<SaleRequest> {
        if self.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let totals = self.totals();
        let amount_paid = if method.gives_change() {
            paid
        } else {
            totals.total
        };
        let change = pricing::change_due(method, totals.total, amount_paid)?;

        let items = self
            .lines
            .iter()
            .map(|line| SaleRequestItem {
                product: line.product_id.clone(),
                name: line.name.clone(),
                barcode: line.barcode.clone(),
                quantity: line.quantity,
                price: Some(line.unit_price),
                total: Some(line.line_total()),
            })
            .collect();

        let discount = self.discount.as_ref().map(|d| DiscountRequest {
            id: Some(d.id.clone()),
            name: d.name.clone(),
            kind: d.kind,
            value: d.value,
            amount: Some(totals.discount),
        });

        Ok(SaleRequest {
            items,
            subtotal: Some(totals.subtotal),
            discount,
            total: Some(totals.total),
            payment_method: method,
            amount_paid,
            change: Some(change),
        })
    }
}

// =============================================================================
// Cart View
// =============================================================================

/// Cart plus computed totals, as returned to terminals.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub discount: Option<Discount>,
    pub item_count: i64,
    pub subtotal: Money,
    pub discount_amount: Money,
    pub total: Money,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let totals = cart.totals();
        CartView {
            lines: cart.lines.clone(),
            discount: cart.discount.clone(),
            item_count: cart.item_count(),
            subtotal: totals.subtotal,
            discount_amount: totals.discount,
            total: totals.total,
        }
    }
}
