//! # Sale Ledger
//!
//! Turns a [`SaleRequest`] into a recorded [`Sale`]. Everything happens in
//! one SQLite transaction, so a checkout either lands completely or leaves
//! no trace.
//!
//! ## Commit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  request ──► shape checks (empty, quantities)         no I/O            │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │  commit lock ──► BEGIN                                                  │
//! │                 │                                                       │
//! │                 ├─► bump receipt sequence       takes the write lock    │
//! │                 ├─► re-read every product       catalog price + stock   │
//! │                 ├─► resolve discount            must be active          │
//! │                 ├─► recompute totals + change                           │
//! │                 ├─► decrement stock (conditional)                       │
//! │                 └─► insert sale + lines                                 │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │              COMMIT ──► Sale            any error ──► ROLLBACK          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Prices and totals sent by the client are advisory. The ledger always
//! charges what the catalog says at commit time, and logs a warning when
//! the two disagree.
//!
//! A rolled back commit also rolls back its sequence bump, so failed
//! checkouts never burn a receipt number.

use std::sync::Arc;

use atelier_core::pricing::{change_due, line_total, Totals};
use atelier_core::validation::{validate_discount_value, validate_money};
use atelier_core::{
    format_receipt_number, CoreError, DiscountKind, DiscountRequest, DiscountSnapshot, Money,
    PaymentMethod, Sale, SaleLine, SaleRequest, MAX_CART_ITEMS, MAX_ITEM_QUANTITY,
};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, StoreResult};
use crate::repository::{discount, product, sale};

/// Name shown on a receipt for a discount sent without a name.
const UNNAMED_DISCOUNT: &str = "Discount";

/// Records sales atomically.
///
/// Cheap to clone. Every clone made from the same [`Database`](crate::Database)
/// shares one commit lock, which keeps commits from this process in a single
/// file and spares SQLite's busy handler the contention.
#[derive(Debug, Clone)]
pub struct Ledger {
    pool: SqlitePool,
    commit_lock: Arc<Mutex<()>>,
}

impl Ledger {
    pub fn new(pool: SqlitePool, commit_lock: Arc<Mutex<()>>) -> Self {
        Ledger { pool, commit_lock }
    }

    /// Records a sale, decrements stock and assigns the next receipt number.
    ///
    /// ## Errors
    /// - `Rejected(EmptyCart)`, `Rejected(InvalidQuantity)` and friends for a
    ///   malformed request
    /// - `Rejected(ProductNotFound | InsufficientStock)` when the catalog
    ///   cannot cover a line
    /// - `Rejected(DiscountNotFound | DiscountInactive)` for a bad discount
    /// - `Rejected(InsufficientPayment)` for a short cash payment
    /// - `Rejected(AmountTooLarge)` when a line or the subtotal overflows
    /// - `Db(_)` when storage fails
    ///
    /// On any error nothing is written.
    pub async fn commit(&self, request: &SaleRequest, receipt_prefix: &str) -> StoreResult<Sale> {
        check_shape(request)?;

        let _guard = self.commit_lock.lock().await;
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let sequence = next_sequence(&mut tx).await?;

        let items = price_lines(&mut tx, request).await?;
        let discount = resolve_discount(&mut tx, request.discount.as_ref()).await?;

        let totals = Totals::checked(
            items.iter().map(|line| line.total),
            discount.as_ref().map(|(_, kind, value)| (*kind, *value)),
        )?;
        warn_on_drift(request, &totals);

        let (amount_paid, change) =
            settle(request.payment_method, totals.total, request.amount_paid)?;

        for line in &items {
            product::decrement_stock(&mut tx, &line.product_id, line.quantity).await?;
        }

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            receipt_number: format_receipt_number(receipt_prefix, sequence),
            items,
            subtotal: totals.subtotal,
            discount: discount.map(|(name, kind, value)| DiscountSnapshot {
                name,
                kind,
                value,
                amount: totals.discount,
            }),
            total: totals.total,
            payment_method: request.payment_method,
            amount_paid,
            change,
            created_at: Utc::now(),
        };

        sale::insert_sale(&mut tx, sequence, &sale).await?;
        tx.commit().await.map_err(DbError::from)?;

        info!(
            receipt_number = %sale.receipt_number,
            total = %sale.total,
            items = sale.item_count(),
            method = sale.payment_method.as_str(),
            "Sale recorded"
        );

        Ok(sale)
    }

    /// Fetches a recorded sale. Asking twice returns the same sale.
    pub async fn find(&self, receipt_number: &str) -> StoreResult<Option<Sale>> {
        let mut conn = self.pool.acquire().await.map_err(DbError::from)?;
        Ok(sale::fetch_by_receipt(&mut conn, receipt_number).await?)
    }
}

// =============================================================================
// Commit Steps
// =============================================================================

fn check_shape(request: &SaleRequest) -> StoreResult<()> {
    if request.items.is_empty() {
        return Err(CoreError::EmptyCart.into());
    }

    if request.items.len() > MAX_CART_ITEMS {
        return Err(CoreError::CartTooLarge { max: MAX_CART_ITEMS }.into());
    }

    for item in &request.items {
        if item.quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: item.quantity,
                max: MAX_ITEM_QUANTITY,
            }
            .into());
        }
        if item.quantity < 1 {
            return Err(CoreError::InvalidQuantity.into());
        }
    }

    validate_money("amountPaid", request.amount_paid)?;
    Ok(())
}

async fn next_sequence(conn: &mut SqliteConnection) -> StoreResult<i64> {
    let sequence: i64 = sqlx::query_scalar(
        "UPDATE sequences SET value = value + 1 WHERE name = 'receipt' RETURNING value",
    )
    .fetch_optional(&mut *conn)
    .await
    .map_err(DbError::from)?
    .ok_or_else(|| DbError::Corrupt("receipt sequence row is missing".to_string()))?;

    debug!(sequence, "Receipt sequence reserved");
    Ok(sequence)
}

/// Builds sale lines from the catalog as it stands inside the transaction.
async fn price_lines(conn: &mut SqliteConnection, request: &SaleRequest) -> StoreResult<Vec<SaleLine>> {
    let mut lines = Vec::with_capacity(request.items.len());

    for item in &request.items {
        let Some(current) = product::fetch_by_id(conn, &item.product).await? else {
            let label = if item.name.is_empty() {
                item.product.clone()
            } else {
                item.name.clone()
            };
            return Err(CoreError::ProductNotFound(label).into());
        };

        if !current.has_stock_for(item.quantity) {
            return Err(CoreError::InsufficientStock {
                name: current.name,
                available: current.stock,
                requested: item.quantity,
            }
            .into());
        }

        if let Some(sent) = item.price {
            if sent != current.price {
                warn!(
                    product = %current.id,
                    sent = %sent,
                    catalog = %current.price,
                    "Client price differs from catalog, charging catalog price"
                );
            }
        }

        let total = line_total(current.price, item.quantity)?;
        lines.push(SaleLine {
            product_id: current.id,
            name: current.name,
            barcode: current.barcode,
            price: current.price,
            quantity: item.quantity,
            total,
        });
    }

    Ok(lines)
}

/// Resolves the discount to `(name, kind, value)`.
///
/// A discount with an id must exist and be active; its stored terms win over
/// whatever the client sent. One without an id is applied as sent.
async fn resolve_discount(
    conn: &mut SqliteConnection,
    requested: Option<&DiscountRequest>,
) -> StoreResult<Option<(String, DiscountKind, i64)>> {
    let Some(requested) = requested else {
        return Ok(None);
    };

    if let Some(id) = requested.id.as_deref() {
        let stored = discount::fetch_by_id(conn, id)
            .await?
            .ok_or_else(|| CoreError::DiscountNotFound(id.to_string()))?;

        if !stored.active {
            return Err(CoreError::DiscountInactive(stored.name).into());
        }

        return Ok(Some((stored.name, stored.kind, stored.value)));
    }

    validate_discount_value(requested.kind, requested.value)?;
    let name = match requested.name.trim() {
        "" => UNNAMED_DISCOUNT.to_string(),
        name => name.to_string(),
    };
    Ok(Some((name, requested.kind, requested.value)))
}

fn warn_on_drift(request: &SaleRequest, totals: &Totals) {
    let sent_discount = request.discount.as_ref().and_then(|d| d.amount);
    let drift = [
        ("subtotal", request.subtotal, totals.subtotal),
        ("discount", sent_discount, totals.discount),
        ("total", request.total, totals.total),
    ];

    for (field, sent, computed) in drift {
        if let Some(sent) = sent {
            if sent != computed {
                warn!(field, sent = %sent, computed = %computed, "Client totals differ, using computed");
            }
        }
    }
}

/// Returns `(amount_paid, change)`.
///
/// Cash must cover the total. Card and mobile settle the exact total.
fn settle(method: PaymentMethod, total: Money, paid: Money) -> StoreResult<(Money, Money)> {
    if method.gives_change() {
        let change = change_due(method, total, paid)?;
        return Ok((paid, change));
    }

    if !paid.is_zero() && paid != total {
        debug!(method = method.as_str(), paid = %paid, total = %total, "Recording exact total for non-cash payment");
    }
    Ok((total, Money::zero()))
}
