//! Application state shared across all handlers

use std::sync::Arc;

use axum::extract::FromRef;
use chrono::{DateTime, Utc};
use common::sqlite::SqliteClient;
use tally_calc::Evaluator;
use tally_ledger::{CalculationService, Ledger, SqliteLedgerStore};
use tracing::info;

use crate::auth::{CredentialStore, JwtManager};
use crate::config::CalcsrvConfig;
use crate::db;
use crate::error::Result;

#[derive(Clone)]
pub struct AppState {
    pub calculations: CalculationService,
    pub credentials: CredentialStore,
    pub jwt: Arc<JwtManager>,
    pub db: SqliteClient,
    pub config: Arc<CalcsrvConfig>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Migrate the schema and wire every component to `db`
    pub async fn build(config: CalcsrvConfig, db: SqliteClient) -> Result<Self> {
        db::migrate(db.pool()).await?;

        let store = Arc::new(SqliteLedgerStore::new(db.pool().clone()));
        let ledger = Arc::new(Ledger::new(store, config.ledger));
        let calculations = CalculationService::new(Evaluator::new(config.evaluator), ledger);
        let credentials =
            CredentialStore::new(db.pool().clone(), config.auth.bcrypt_cost);
        let jwt = Arc::new(JwtManager::new(&config.auth.jwt_config()));

        info!(
            "State ready: max_expression_len={}, ledger timeout={}ms, token ttl={}h",
            config.evaluator.max_expression_len,
            config.ledger.timeout_ms,
            config.auth.token_ttl_hours
        );

        Ok(Self {
            calculations,
            credentials,
            jwt,
            db,
            config: Arc::new(config),
            started_at: Utc::now(),
        })
    }

    pub fn uptime_seconds(&self) -> u64 {
        (Utc::now() - self.started_at)
            .num_seconds()
            .try_into()
            .unwrap_or(0)
    }
}

impl FromRef<AppState> for Arc<JwtManager> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.jwt)
    }
}
