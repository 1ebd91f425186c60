//! In-memory ledger store
//!
//! Mirrors the SQLite store's contract, including the foreign-key check:
//! principals must be registered before records can reference them.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::StoreError;
use crate::record::{CalculationRecord, NewRecord, Principal, RecordId};
use crate::store::LedgerStore;

#[derive(Default)]
struct Inner {
    principals: HashSet<Principal>,
    records: Vec<CalculationRecord>,
    next_id: i64,
}

/// In-memory ledger store for tests and embedded use
#[derive(Default)]
pub struct MemoryLedgerStore {
    inner: RwLock<Inner>,
    unavailable: AtomicBool,
    latency: RwLock<Option<Duration>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a principal known so records may reference it
    pub fn register_principal(&self, principal: Principal) {
        self.inner.write().principals.insert(principal);
    }

    /// Simulate an unreachable backend
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delay every operation, for exercising deadlines
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write() = latency;
    }

    /// Total number of stored records
    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn gate(&self) -> Result<(), StoreError> {
        let latency = *self.latency.read();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn insert(&self, record: NewRecord) -> Result<CalculationRecord, StoreError> {
        self.gate().await?;

        let mut inner = self.inner.write();
        if !inner.principals.contains(&record.principal) {
            return Err(StoreError::UnknownPrincipal {
                principal: record.principal,
            });
        }
        inner.next_id += 1;
        let stored = record.into_record(RecordId(inner.next_id));
        inner.records.push(stored.clone());
        Ok(stored)
    }

    async fn list_by_principal(
        &self,
        principal: Principal,
    ) -> Result<Vec<CalculationRecord>, StoreError> {
        self.gate().await?;

        let mut records: Vec<_> = self
            .inner
            .read()
            .records
            .iter()
            .filter(|r| r.principal == principal)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(records)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
