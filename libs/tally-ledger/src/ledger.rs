//! Calculation ledger
//!
//! Records successful evaluations against their principal and reads them
//! back in order. Failed evaluations are skipped, not recorded.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tally_calc::{format_value, EvaluationOutcome};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::clock::MonotonicClock;
use crate::error::{LedgerError, Result, StoreError};
use crate::record::{CalculationRecord, NewRecord, Principal, RecordOutcome};
use crate::store::LedgerStore;

/// Default deadline for a single store call
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Deadline applied to every read and write
    pub timeout_ms: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl LedgerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

pub struct Ledger {
    store: Arc<dyn LedgerStore>,
    clock: MonotonicClock,
    config: LedgerConfig,
    /// Held from stamping to insert so id order and `created_at` order agree.
    /// Waiting for it counts against the insert deadline.
    write_gate: Mutex<()>,
}

impl Ledger {
    pub fn new(store: Arc<dyn LedgerStore>, config: LedgerConfig) -> Self {
        Self::with_clock(store, config, MonotonicClock::system())
    }

    pub fn with_clock(
        store: Arc<dyn LedgerStore>,
        config: LedgerConfig,
        clock: MonotonicClock,
    ) -> Self {
        Self {
            store,
            clock,
            config,
            write_gate: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    /// Persist `outcome` for `principal` if it is a value
    ///
    /// A `Failure` outcome returns [`RecordOutcome::NotPersisted`] without
    /// touching the store.
    pub async fn record(
        &self,
        principal: Principal,
        expression: &str,
        outcome: &EvaluationOutcome,
    ) -> Result<RecordOutcome> {
        let value = match outcome {
            EvaluationOutcome::Value(value) => *value,
            EvaluationOutcome::Failure(err) => {
                debug!(%principal, kind = %err.kind(), "Skipping failed evaluation");
                return Ok(RecordOutcome::NotPersisted);
            },
        };

        // The deadline covers the wait for the gate as well as the insert
        let insert = async {
            let _gate = self.write_gate.lock().await;
            let new_record = NewRecord {
                principal,
                expression: expression.to_string(),
                result: format_value(value),
                created_at: self.clock.now(),
            };
            self.store.insert(new_record).await
        };
        let record = self.deadline("insert", insert).await?;
        debug!(%principal, id = %record.id, result = %record.result, "Calculation persisted");
        Ok(RecordOutcome::Persisted(record))
    }

    /// Records of `principal` ordered by `created_at`, ties by id
    pub async fn list_by_principal(&self, principal: Principal) -> Result<Vec<CalculationRecord>> {
        self.deadline("list_by_principal", self.store.list_by_principal(principal))
            .await
    }

    async fn deadline<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = std::result::Result<T, StoreError>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.config.timeout(), call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => {
                warn!(
                    operation,
                    store = self.store.name(),
                    error = %source,
                    "Ledger store call failed"
                );
                Err(LedgerError::storage(operation, source))
            },
            Err(_) => {
                warn!(
                    operation,
                    store = self.store.name(),
                    timeout_ms = self.config.timeout_ms,
                    "Ledger store call timed out"
                );
                Err(LedgerError::timeout(operation, self.config.timeout_ms))
            },
        }
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("store", &self.store.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
