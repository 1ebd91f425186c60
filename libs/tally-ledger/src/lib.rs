//! tally-ledger - Calculation history for Tally
//!
//! Binds successful evaluations to the principal that submitted them and
//! reads them back in recording order.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tally_calc::Evaluator;
//! use tally_ledger::{
//!     CalculationService, Ledger, LedgerConfig, MemoryLedgerStore, Principal, SubmissionState,
//! };
//!
//! # let rt = tokio::runtime::Builder::new_current_thread()
//! #     .enable_all()
//! #     .build()
//! #     .unwrap();
//! # rt.block_on(async {
//! let store = Arc::new(MemoryLedgerStore::new());
//! store.register_principal(Principal(1));
//!
//! let ledger = Arc::new(Ledger::new(store, LedgerConfig::default()));
//! let service = CalculationService::new(Evaluator::default(), ledger);
//!
//! let ok = service.submit(Some(Principal(1)), "2+2*2").await.unwrap();
//! assert_eq!(ok.state(), SubmissionState::Persisted);
//!
//! let skipped = service.submit(Some(Principal(1)), "1/0").await.unwrap();
//! assert_eq!(skipped.state(), SubmissionState::Skipped);
//!
//! assert_eq!(service.history(Some(Principal(1))).await.unwrap().len(), 1);
//! # });
//! ```

pub mod clock;
pub mod error;
pub mod ledger;
pub mod memory;
pub mod record;
pub mod service;
pub mod sqlite;
pub mod store;

pub use clock::{FixedTimeProvider, MonotonicClock, SystemTimeProvider, TimeProvider};
pub use error::{LedgerError, Result, StoreError};
pub use ledger::{Ledger, LedgerConfig, DEFAULT_TIMEOUT_MS};
pub use memory::MemoryLedgerStore;
pub use record::{CalculationRecord, NewRecord, Principal, RecordId, RecordOutcome};
pub use service::{CalculationService, Submission, SubmissionError, SubmissionState};
pub use sqlite::SqliteLedgerStore;
pub use store::LedgerStore;
