//! Schema setup
//!
//! `users` first: `calculations.user_id` references it.

use sqlx::SqlitePool;
use tally_ledger::{LedgerError, SqliteLedgerStore};
use tracing::info;

use crate::auth::CredentialStore;
use crate::error::Result;

/// Create all tables and indexes; safe to run on every start
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    CredentialStore::migrate(pool).await?;
    SqliteLedgerStore::migrate(pool)
        .await
        .map_err(|e| LedgerError::storage("migrate", e))?;
    info!("Database schema ready");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use common::sqlite::SqliteClient;

    async fn table_names(pool: &SqlitePool) -> Vec<String> {
        sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type IN ('table', 'index') \
             AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(pool)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let client = SqliteClient::in_memory().await.unwrap();
        migrate(client.pool()).await.unwrap();
        migrate(client.pool()).await.unwrap();

        assert_eq!(
            table_names(client.pool()).await,
            vec!["calculations", "idx_calculations_user_created", "users"]
        );
    }

    #[tokio::test]
    async fn test_calculation_requires_existing_user() {
        let client = SqliteClient::in_memory().await.unwrap();
        migrate(client.pool()).await.unwrap();

        let result = sqlx::query(
            "INSERT INTO calculations (user_id, expression, result, created_at) \
             VALUES (99, '1+1', '2', '2026-01-01T00:00:00.000000Z')",
        )
        .execute(client.pool())
        .await;
        assert!(result.is_err());
    }
}
