//! Error types for tally-ledger

use thiserror::Error;

use crate::record::Principal;

/// Failure reported by a [`LedgerStore`](crate::LedgerStore) backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unknown {principal}: no such user")]
    UnknownPrincipal { principal: Principal },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Ledger errors
///
/// Every variant is a storage failure; the ledger never retries.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Storage error during {operation}: {source}")]
    Storage {
        operation: &'static str,
        #[source]
        source: StoreError,
    },

    /// The deadline elapsed and the store call was dropped.
    ///
    /// A write that times out while waiting for the write gate never reaches
    /// the store. One that times out while the store is mid-commit may still
    /// land: SQLite can finish an `INSERT` the caller has stopped waiting
    /// for. Callers must treat the write's outcome as unknown, not as absent.
    #[error("Storage error during {operation}: deadline of {timeout_ms}ms exceeded")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },
}

impl LedgerError {
    pub fn storage(operation: &'static str, source: StoreError) -> Self {
        Self::Storage { operation, source }
    }

    pub fn timeout(operation: &'static str, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation,
            timeout_ms,
        }
    }

    pub fn operation(&self) -> &'static str {
        match self {
            Self::Storage { operation, .. } | Self::Timeout { operation, .. } => operation,
        }
    }

    /// Whether the principal did not exist at write time
    pub fn is_unknown_principal(&self) -> bool {
        matches!(
            self,
            Self::Storage {
                source: StoreError::UnknownPrincipal { .. },
                ..
            }
        )
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
