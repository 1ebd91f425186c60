//! Storage abstraction for the ledger

use async_trait::async_trait;

use crate::error::StoreError;
use crate::record::{CalculationRecord, NewRecord, Principal};

/// Ledger storage backend
///
/// Implementations:
/// - `SqliteLedgerStore`: sqlx-backed, used by the service
/// - `MemoryLedgerStore`: in-process, for tests and embedded use
#[async_trait]
pub trait LedgerStore: Send + Sync + 'static {
    /// Atomically insert a record and return it with its assigned id
    ///
    /// Must fail with [`StoreError::UnknownPrincipal`] (or the backend's
    /// foreign-key error) when the principal does not exist. Ids are
    /// strictly increasing in insertion order.
    async fn insert(&self, record: NewRecord) -> Result<CalculationRecord, StoreError>;

    /// All records of a principal, ordered by `created_at` then `id`
    async fn list_by_principal(
        &self,
        principal: Principal,
    ) -> Result<Vec<CalculationRecord>, StoreError>;

    /// Backend name for logs
    fn name(&self) -> &'static str;
}
