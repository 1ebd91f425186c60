//! Ledger record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authenticated user identity, the credential store's `users.id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(pub i64);

impl Principal {
    pub fn id(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "principal:{}", self.0)
    }
}

/// Store-assigned record identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted successful calculation; never updated or deleted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationRecord {
    pub id: RecordId,
    pub principal: Principal,
    pub expression: String,
    /// Canonical rendering of the evaluated value
    pub result: String,
    pub created_at: DateTime<Utc>,
}

/// Everything a store needs to write a record except its id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub principal: Principal,
    pub expression: String,
    pub result: String,
    pub created_at: DateTime<Utc>,
}

impl NewRecord {
    pub fn into_record(self, id: RecordId) -> CalculationRecord {
        CalculationRecord {
            id,
            principal: self.principal,
            expression: self.expression,
            result: self.result,
            created_at: self.created_at,
        }
    }
}

/// What [`Ledger::record`](crate::Ledger::record) did with an outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Persisted(CalculationRecord),
    /// The evaluation failed, so nothing was written
    NotPersisted,
}

impl RecordOutcome {
    pub fn record(&self) -> Option<&CalculationRecord> {
        match self {
            Self::Persisted(record) => Some(record),
            Self::NotPersisted => None,
        }
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted(_))
    }
}
