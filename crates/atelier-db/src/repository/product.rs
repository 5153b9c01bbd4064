//! # Product Repository
//!
//! The catalog half of the store: barcode lookup for the till, CRUD for the
//! back office, and the conditional stock decrement the sale ledger relies on.
//!
//! ## Stock Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ❌ read stock, check in Rust, write stock - qty                        │
//! │     two terminals both read 1, both write 0: one scarf sold twice       │
//! │                                                                         │
//! │  ✅ UPDATE products SET stock = stock - ?qty                            │
//! │     WHERE id = ?id AND stock >= ?qty                                    │
//! │     zero rows touched ──► re-read ──► ProductNotFound / InsufficientStock│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use atelier_core::{CoreError, Product, ProductInput};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult, StoreResult};

pub(crate) const PRODUCT_COLUMNS: &str = "id, barcode, name, category, size, color, description, \
     price_cents, cost_cents, stock, supplier_id, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products by name. With a query, matches name, barcode or
    /// category by substring.
    pub async fn list(&self, query: Option<&str>, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        debug!(query = ?query, limit, "Listing products");

        let products = match query {
            Some(q) => {
                let pattern = format!("%{}%", q.replace('%', "\\%").replace('_', "\\_"));
                let sql = format!(
                    "SELECT {PRODUCT_COLUMNS} FROM products \
                     WHERE name LIKE ?1 ESCAPE '\\' OR barcode LIKE ?1 ESCAPE '\\' \
                        OR category LIKE ?1 ESCAPE '\\' \
                     ORDER BY name LIMIT ?2"
                );
                sqlx::query_as::<_, Product>(&sql)
                    .bind(pattern)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name LIMIT ?1");
                sqlx::query_as::<_, Product>(&sql)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(products)
    }

    /// Exact barcode match. No prefix or fuzzy matching: a partial scan must
    /// never ring up the wrong garment.
    pub async fn find_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE barcode = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(barcode.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let mut conn = self.pool.acquire().await?;
        fetch_by_id(&mut conn, id).await
    }

    /// Like [`find_by_id`](Self::find_by_id) but a miss is an error.
    pub async fn get(&self, id: &str) -> DbResult<Product> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// ## Errors
    /// - `UniqueViolation` when the barcode is taken
    /// - `ForeignKeyViolation` when `supplier_id` names no supplier
    pub async fn insert(&self, input: &ProductInput) -> DbResult<Product> {
        debug!(barcode = %input.barcode, "Inserting product");

        let now = Utc::now();
        let sql = format!(
            "INSERT INTO products ({PRODUCT_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12) \
             RETURNING {PRODUCT_COLUMNS}"
        );

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(input.barcode.trim())
            .bind(input.name.trim())
            .bind(input.category.trim())
            .bind(&input.size)
            .bind(&input.color)
            .bind(&input.description)
            .bind(input.price)
            .bind(input.cost)
            .bind(input.stock)
            .bind(&input.supplier_id)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| with_barcode(e.into(), &input.barcode))?;

        Ok(product)
    }

    /// Replaces every editable field. `stock` is set absolutely.
    pub async fn update(&self, id: &str, input: &ProductInput) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let sql = format!(
            "UPDATE products SET \
                barcode = ?2, name = ?3, category = ?4, size = ?5, color = ?6, \
                description = ?7, price_cents = ?8, cost_cents = ?9, stock = ?10, \
                supplier_id = ?11, updated_at = ?12 \
             WHERE id = ?1 \
             RETURNING {PRODUCT_COLUMNS}"
        );

        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(input.barcode.trim())
            .bind(input.name.trim())
            .bind(input.category.trim())
            .bind(&input.size)
            .bind(&input.color)
            .bind(&input.description)
            .bind(input.price)
            .bind(input.cost)
            .bind(input.stock)
            .bind(&input.supplier_id)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| with_barcode(e.into(), &input.barcode))?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product that has never been sold.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown id
    /// - `ForeignKeyViolation` when any sale line references it
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let sold: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_items WHERE product_id = ?1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        if sold > 0 {
            warn!(id = %id, sale_lines = sold, "Refusing to delete sold product");
            return Err(DbError::ForeignKeyViolation {
                message: format!("product {} appears on {} sale line(s)", id, sold),
            });
        }

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Takes `quantity` units off the shelf outside a sale.
    pub async fn decrement_stock(&self, id: &str, quantity: i64) -> StoreResult<Product> {
        let mut conn = self.pool.acquire().await.map_err(DbError::from)?;
        decrement_stock(&mut conn, id, quantity).await
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Connection-level helpers (usable inside a transaction)
// =============================================================================

pub(crate) async fn fetch_by_id(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(product)
}

/// Single conditional UPDATE; never reads stock before writing it.
///
/// ## Errors
/// - `CoreError::ProductNotFound` when the id is unknown
/// - `CoreError::InsufficientStock` when fewer than `quantity` units remain
pub(crate) async fn decrement_stock(
    conn: &mut SqliteConnection,
    id: &str,
    quantity: i64,
) -> StoreResult<Product> {
    let sql = format!(
        "UPDATE products SET stock = stock - ?2, updated_at = ?3 \
         WHERE id = ?1 AND stock >= ?2 \
         RETURNING {PRODUCT_COLUMNS}"
    );

    let updated = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .bind(quantity)
        .bind(Utc::now())
        .fetch_optional(&mut *conn)
        .await
        .map_err(DbError::from)?;

    if let Some(product) = updated {
        debug!(id = %id, quantity, remaining = product.stock, "Stock decremented");
        return Ok(product);
    }

    // nothing matched: explain why
    match fetch_by_id(conn, id).await? {
        None => Err(CoreError::ProductNotFound(id.to_string()).into()),
        Some(product) => Err(CoreError::InsufficientStock {
            name: product.name,
            available: product.stock,
            requested: quantity,
        }
        .into()),
    }
}

fn with_barcode(err: DbError, barcode: &str) -> DbError {
    match err {
        DbError::UniqueViolation { field, .. } if field.ends_with("barcode") => {
            DbError::duplicate("barcode", barcode.trim())
        }
        other => other,
    }
}
