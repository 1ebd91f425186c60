//! SQLite ledger store
//!
//! One `INSERT ... RETURNING` per record, so a row is either fully visible
//! or not at all. Referential integrity relies on `PRAGMA foreign_keys=ON`
//! on every pooled connection and on a `users(id)` table existing before the
//! first insert.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::debug;

use crate::error::StoreError;
use crate::record::{CalculationRecord, NewRecord, Principal, RecordId};
use crate::store::LedgerStore;

/// Calculations table DDL
pub const CALCULATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS calculations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL,
        expression TEXT NOT NULL,
        result TEXT NOT NULL,
        created_at TEXT NOT NULL,
        FOREIGN KEY (user_id) REFERENCES users(id)
    )
"#;

/// Range-read index backing `list_by_principal`
pub const CALCULATIONS_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_calculations_user_created
        ON calculations (user_id, created_at, id)
"#;

/// Fixed-width so that text order equals chronological order
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

pub struct SqliteLedgerStore {
    pool: SqlitePool,
}

impl SqliteLedgerStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the calculations table and its index if missing
    pub async fn migrate(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::query(CALCULATIONS_TABLE).execute(pool).await?;
        sqlx::query(CALCULATIONS_INDEX).execute(pool).await?;
        debug!("Ledger schema ready");
        Ok(())
    }
}

fn encode_timestamp(at: &DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| StoreError::CorruptRow(format!("created_at '{}': {}", raw, e)))
}

fn hydrate_record(row: SqliteRow) -> Result<CalculationRecord, StoreError> {
    let created_at: String = row.try_get("created_at")?;
    Ok(CalculationRecord {
        id: RecordId(row.try_get("id")?),
        principal: Principal(row.try_get("user_id")?),
        expression: row.try_get("expression")?,
        result: row.try_get("result")?,
        created_at: decode_timestamp(&created_at)?,
    })
}

#[async_trait]
impl LedgerStore for SqliteLedgerStore {
    async fn insert(&self, record: NewRecord) -> Result<CalculationRecord, StoreError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO calculations (user_id, expression, result, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(record.principal.id())
        .bind(&record.expression)
        .bind(&record.result)
        .bind(encode_timestamp(&record.created_at))
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(row) => {
                let id: i64 = row.try_get("id")?;
                Ok(record.into_record(RecordId(id)))
            },
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                Err(StoreError::UnknownPrincipal {
                    principal: record.principal,
                })
            },
            Err(e) => Err(e.into()),
        }
    }

    async fn list_by_principal(
        &self,
        principal: Principal,
    ) -> Result<Vec<CalculationRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, expression, result, created_at
            FROM calculations
            WHERE user_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(principal.id())
        .fetch_all(&self.pool)
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(hydrate_record(row)?);
        }
        Ok(records)
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}
