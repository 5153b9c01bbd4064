//! # Discount Repository
//!
//! Only `active` discounts are offered at the till. Sales copy the discount
//! they used, so edits and deletions here never touch recorded sales.

use atelier_core::{Discount, DiscountInput};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

const DISCOUNT_COLUMNS: &str = "id, name, kind, value, active, start_date, end_date, created_at";

#[derive(Debug, Clone)]
pub struct DiscountRepository {
    pool: SqlitePool,
}

impl DiscountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DiscountRepository { pool }
    }

    /// Discounts the cashier can pick, newest first.
    pub async fn list_active(&self) -> DbResult<Vec<Discount>> {
        let sql = format!(
            "SELECT {DISCOUNT_COLUMNS} FROM discounts WHERE active = 1 ORDER BY created_at DESC"
        );
        let discounts = sqlx::query_as::<_, Discount>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(discounts)
    }

    /// Every discount, active or not, newest first.
    pub async fn list_all(&self) -> DbResult<Vec<Discount>> {
        let sql = format!("SELECT {DISCOUNT_COLUMNS} FROM discounts ORDER BY created_at DESC");
        let discounts = sqlx::query_as::<_, Discount>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(discounts)
    }

    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Discount>> {
        let mut conn = self.pool.acquire().await?;
        fetch_by_id(&mut conn, id).await
    }

    pub async fn get(&self, id: &str) -> DbResult<Discount> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Discount", id))
    }

    pub async fn insert(&self, input: &DiscountInput) -> DbResult<Discount> {
        debug!(name = %input.name, kind = input.kind.as_str(), "Inserting discount");

        let sql = format!(
            "INSERT INTO discounts ({DISCOUNT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
             RETURNING {DISCOUNT_COLUMNS}"
        );
        let discount = sqlx::query_as::<_, Discount>(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(input.name.trim())
            .bind(input.kind)
            .bind(input.value)
            .bind(input.active)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Ok(discount)
    }

    pub async fn update(&self, id: &str, input: &DiscountInput) -> DbResult<Discount> {
        debug!(id = %id, "Updating discount");

        let sql = format!(
            "UPDATE discounts SET name = ?2, kind = ?3, value = ?4, active = ?5, \
                start_date = ?6, end_date = ?7 \
             WHERE id = ?1 RETURNING {DISCOUNT_COLUMNS}"
        );
        sqlx::query_as::<_, Discount>(&sql)
            .bind(id)
            .bind(input.name.trim())
            .bind(input.kind)
            .bind(input.value)
            .bind(input.active)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Discount", id))
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting discount");

        let result = sqlx::query("DELETE FROM discounts WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Discount", id));
        }

        Ok(())
    }
}

pub(crate) async fn fetch_by_id(
    conn: &mut SqliteConnection,
    id: &str,
) -> DbResult<Option<Discount>> {
    let sql = format!("SELECT {DISCOUNT_COLUMNS} FROM discounts WHERE id = ?1");
    let discount = sqlx::query_as::<_, Discount>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(discount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use atelier_core::DiscountKind;
    use chrono::Duration;

    fn input(name: &str, kind: DiscountKind, value: i64, active: bool) -> DiscountInput {
        DiscountInput {
            name: name.to_string(),
            kind,
            value,
            active,
            start_date: None,
            end_date: None,
        }
    }

    #[tokio::test]
    async fn test_active_filter() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.discounts();

        repo.insert(&input("Ten Off", DiscountKind::Percentage, 10, true))
            .await
            .unwrap();
        repo.insert(&input("Old Promo", DiscountKind::Fixed, 50000, false))
            .await
            .unwrap();

        let active = repo.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Ten Off");
        assert_eq!(active[0].kind, DiscountKind::Percentage);
        assert_eq!(repo.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.discounts();

        let created = repo
            .insert(&input("Ten Off", DiscountKind::Percentage, 10, true))
            .await
            .unwrap();

        let mut edit = input("Flat 500", DiscountKind::Fixed, 50000, false);
        let now = Utc::now();
        edit.start_date = Some(now);
        edit.end_date = Some(now + Duration::days(7));
        let updated = repo.update(&created.id, &edit).await.unwrap();
        assert_eq!(updated.kind, DiscountKind::Fixed);
        assert!(!updated.active);
        assert!(updated.end_date.is_some());

        repo.delete(&created.id).await.unwrap();
        assert!(repo.find_by_id(&created.id).await.unwrap().is_none());
    }
}
