//! # Database Migrations
//!
//! SQL files under `migrations/sqlite/` at the workspace root, embedded at
//! compile time.
//!
//! ```text
//! startup ──► _sqlx_migrations present? ──► compare checksums ──► run pending
//!
//!   001_initial_schema.sql   products, suppliers, discounts,
//!                            sales, sale_items, sequences
//! ```
//!
//! Never edit an applied migration; add the next numbered file instead.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies pending migrations. Safe to call on every start.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!(
        embedded = MIGRATOR.migrations.len(),
        "Checking for pending migrations"
    );

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// `(embedded, applied)` migration counts, for diagnostics.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((total, applied as usize))
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    use super::*;

    #[tokio::test]
    async fn test_all_migrations_applied() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (total, applied) = migration_status(db.pool()).await.unwrap();
        assert!(total > 0);
        assert_eq!(total, applied);

        // rerunning is a no-op
        run_migrations(db.pool()).await.unwrap();
    }

    #[tokio::test]
    async fn test_receipt_sequence_seeded() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let value: i64 = sqlx::query_scalar("SELECT value FROM sequences WHERE name = 'receipt'")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(value, 0);
    }
}
