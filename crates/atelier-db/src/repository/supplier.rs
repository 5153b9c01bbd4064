//! # Supplier Repository
//!
//! Plain CRUD. Deleting a supplier leaves its products in place with
//! `supplier_id` cleared (`ON DELETE SET NULL`).

use atelier_core::{Supplier, SupplierInput};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

const SUPPLIER_COLUMNS: &str = "id, name, company, email, phone, address, created_at";

#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    pub async fn list(&self) -> DbResult<Vec<Supplier>> {
        let sql = format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers ORDER BY name");
        let suppliers = sqlx::query_as::<_, Supplier>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(suppliers)
    }

    pub async fn get(&self, id: &str) -> DbResult<Supplier> {
        let sql = format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = ?1");
        sqlx::query_as::<_, Supplier>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id))
    }

    pub async fn insert(&self, input: &SupplierInput) -> DbResult<Supplier> {
        debug!(name = %input.name, "Inserting supplier");

        let sql = format!(
            "INSERT INTO suppliers ({SUPPLIER_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
             RETURNING {SUPPLIER_COLUMNS}"
        );
        let supplier = sqlx::query_as::<_, Supplier>(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(input.name.trim())
            .bind(&input.company)
            .bind(&input.email)
            .bind(input.phone.trim())
            .bind(&input.address)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Ok(supplier)
    }

    pub async fn update(&self, id: &str, input: &SupplierInput) -> DbResult<Supplier> {
        debug!(id = %id, "Updating supplier");

        let sql = format!(
            "UPDATE suppliers SET name = ?2, company = ?3, email = ?4, phone = ?5, address = ?6 \
             WHERE id = ?1 RETURNING {SUPPLIER_COLUMNS}"
        );
        sqlx::query_as::<_, Supplier>(&sql)
            .bind(id)
            .bind(input.name.trim())
            .bind(&input.company)
            .bind(&input.email)
            .bind(input.phone.trim())
            .bind(&input.address)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id))
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting supplier");

        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        Ok(())
    }
}
