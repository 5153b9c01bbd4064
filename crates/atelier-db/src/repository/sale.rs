//! # Sale Repository
//!
//! Read side of the ledger. Sales are only ever written by
//! [`Ledger::commit`](crate::ledger::Ledger::commit); nothing here updates
//! or deletes one.
//!
//! ```text
//! sales (1) ──── (n) sale_items        ordered by position
//!   │
//!   └── discount_* columns             flattened DiscountSnapshot
//! ```

use std::collections::HashMap;

use atelier_core::{DiscountKind, DiscountSnapshot, Money, PaymentMethod, Sale, SaleLine};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

const SALE_COLUMNS: &str = "id, sequence, receipt_number, subtotal_cents, discount_name, \
     discount_kind, discount_value, discount_cents, total_cents, payment_method, \
     amount_paid_cents, change_cents, created_at";

const LINE_COLUMNS: &str = "sale_id, product_id, name, barcode, price_cents, quantity, total_cents";

/// Row shape of `sales`.
#[derive(Debug, FromRow)]
struct SaleRow {
    id: String,
    receipt_number: String,
    subtotal_cents: Money,
    discount_name: Option<String>,
    discount_kind: Option<DiscountKind>,
    discount_value: Option<i64>,
    discount_cents: Option<Money>,
    total_cents: Money,
    payment_method: PaymentMethod,
    amount_paid_cents: Money,
    change_cents: Money,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct LineRow {
    sale_id: String,
    #[sqlx(flatten)]
    line: SaleLine,
}

impl SaleRow {
    fn into_sale(self, items: Vec<SaleLine>) -> Sale {
        let discount = match (self.discount_name, self.discount_kind) {
            (Some(name), Some(kind)) => Some(DiscountSnapshot {
                name,
                kind,
                value: self.discount_value.unwrap_or_default(),
                amount: self.discount_cents.unwrap_or_default(),
            }),
            _ => None,
        };

        Sale {
            id: self.id,
            receipt_number: self.receipt_number,
            items,
            subtotal: self.subtotal_cents,
            discount,
            total: self.total_cents,
            payment_method: self.payment_method,
            amount_paid: self.amount_paid_cents,
            change: self.change_cents,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Most recent sales first. `None` returns the whole history.
    pub async fn list(&self, limit: Option<u32>) -> DbResult<Vec<Sale>> {
        debug!(?limit, "Listing sales");
        // SQLite reads a negative LIMIT as no limit
        let limit = limit.map_or(-1, i64::from);

        let sql = format!("SELECT {SALE_COLUMNS} FROM sales ORDER BY sequence DESC LIMIT ?1");
        let rows = sqlx::query_as::<_, SaleRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {LINE_COLUMNS} FROM sale_items \
             WHERE sale_id IN (SELECT id FROM sales ORDER BY sequence DESC LIMIT ?1) \
             ORDER BY sale_id, position"
        );
        let lines = sqlx::query_as::<_, LineRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let mut by_sale: HashMap<String, Vec<SaleLine>> = HashMap::new();
        for row in lines {
            by_sale.entry(row.sale_id).or_default().push(row.line);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = by_sale.remove(&row.id).unwrap_or_default();
                row.into_sale(items)
            })
            .collect())
    }

    pub async fn find_by_receipt(&self, receipt_number: &str) -> DbResult<Option<Sale>> {
        let mut conn = self.pool.acquire().await?;
        fetch_by_receipt(&mut conn, receipt_number).await
    }

    pub async fn get_by_receipt(&self, receipt_number: &str) -> DbResult<Sale> {
        self.find_by_receipt(receipt_number)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", receipt_number))
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Connection-level helpers (usable inside a transaction)
// =============================================================================

pub(crate) async fn fetch_by_receipt(
    conn: &mut SqliteConnection,
    receipt_number: &str,
) -> DbResult<Option<Sale>> {
    let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE receipt_number = ?1");
    let Some(row) = sqlx::query_as::<_, SaleRow>(&sql)
        .bind(receipt_number)
        .fetch_optional(&mut *conn)
        .await?
    else {
        return Ok(None);
    };

    let items = fetch_lines(conn, &row.id).await?;
    Ok(Some(row.into_sale(items)))
}

async fn fetch_lines(conn: &mut SqliteConnection, sale_id: &str) -> DbResult<Vec<SaleLine>> {
    let sql = format!("SELECT {LINE_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY position");
    let rows = sqlx::query_as::<_, LineRow>(&sql)
        .bind(sale_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows.into_iter().map(|row| row.line).collect())
}

/// Writes a sale and its lines. The caller owns the transaction.
pub(crate) async fn insert_sale(
    conn: &mut SqliteConnection,
    sequence: i64,
    sale: &Sale,
) -> DbResult<()> {
    debug!(id = %sale.id, receipt_number = %sale.receipt_number, "Inserting sale");

    let discount = sale.discount.as_ref();
    let sql = format!(
        "INSERT INTO sales ({SALE_COLUMNS}) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
    );
    sqlx::query(&sql)
        .bind(&sale.id)
        .bind(sequence)
        .bind(&sale.receipt_number)
        .bind(sale.subtotal)
        .bind(discount.map(|d| d.name.clone()))
        .bind(discount.map(|d| d.kind))
        .bind(discount.map(|d| d.value))
        .bind(discount.map(|d| d.amount))
        .bind(sale.total)
        .bind(sale.payment_method)
        .bind(sale.amount_paid)
        .bind(sale.change)
        .bind(sale.created_at)
        .execute(&mut *conn)
        .await?;

    for (position, line) in sale.items.iter().enumerate() {
        sqlx::query(
            "INSERT INTO sale_items \
                (id, sale_id, position, product_id, name, barcode, price_cents, quantity, total_cents) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&sale.id)
        .bind(position as i64)
        .bind(&line.product_id)
        .bind(&line.name)
        .bind(&line.barcode)
        .bind(line.price)
        .bind(line.quantity)
        .bind(line.total)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use atelier_core::{Money, PaymentMethod, ProductInput, SaleRequest, SaleRequestItem};

    #[tokio::test]
    async fn test_list_newest_first_and_unbounded_by_default() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tee = db
            .products()
            .insert(&ProductInput {
                barcode: "1001".to_string(),
                name: "Linen Tee".to_string(),
                category: "Tops".to_string(),
                size: None,
                color: None,
                description: None,
                price: Money::from_cents(250),
                cost: Money::zero(),
                stock: 100,
                supplier_id: None,
            })
            .await
            .unwrap();

        let req = SaleRequest {
            items: vec![SaleRequestItem {
                product: tee.id.clone(),
                name: tee.name.clone(),
                barcode: tee.barcode.clone(),
                quantity: 1,
                price: None,
                total: None,
            }],
            subtotal: None,
            discount: None,
            total: None,
            payment_method: PaymentMethod::Card,
            amount_paid: Money::zero(),
            change: None,
        };
        for _ in 0..60 {
            db.ledger().commit(&req, "ATL").await.unwrap();
        }

        let all = db.sales().list(None).await.unwrap();
        assert_eq!(all.len(), 60);
        assert_eq!(all[0].receipt_number, "ATL000060");
        assert_eq!(all[59].receipt_number, "ATL000001");
        assert!(all.iter().all(|sale| sale.items.len() == 1));

        let recent = db.sales().list(Some(2)).await.unwrap();
        let receipts: Vec<_> = recent.iter().map(|s| s.receipt_number.as_str()).collect();
        assert_eq!(receipts, ["ATL000060", "ATL000059"]);
        assert_eq!(recent[1].items[0].name, "Linen Tee");
    }
}
