//! Calculation service - the per-request state machine
//!
//! `Received -> Evaluated -> {Persisted | Skipped | Errored}`
//!
//! `Persisted` and `Skipped` are both successful terminal states for the
//! caller; only `Errored` (a storage failure) is a server-side error. A
//! request without a principal never reaches `Received`.

use std::sync::Arc;

use serde::Serialize;
use tally_calc::{EvaluationOutcome, Evaluator};
use thiserror::Error;
use tracing::{debug, error};

use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::record::{CalculationRecord, Principal, RecordOutcome};

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error(transparent)]
    Storage(#[from] LedgerError),
}

/// Terminal state of a successful submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Persisted,
    Skipped,
}

/// Result of one accepted submission
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub expression: String,
    pub outcome: EvaluationOutcome,
    pub record: RecordOutcome,
}

impl Submission {
    pub fn state(&self) -> SubmissionState {
        match self.record {
            RecordOutcome::Persisted(_) => SubmissionState::Persisted,
            RecordOutcome::NotPersisted => SubmissionState::Skipped,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CalculationService {
    evaluator: Evaluator,
    ledger: Arc<Ledger>,
}

impl CalculationService {
    pub fn new(evaluator: Evaluator, ledger: Arc<Ledger>) -> Self {
        Self { evaluator, ledger }
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    /// Evaluate `expression` for `principal` and record it when it succeeds
    pub async fn submit(
        &self,
        principal: Option<Principal>,
        expression: &str,
    ) -> Result<Submission, SubmissionError> {
        let principal = principal.ok_or(SubmissionError::Unauthenticated)?;

        let outcome = self.evaluator.evaluate(expression);
        let record = match self.ledger.record(principal, expression, &outcome).await {
            Ok(record) => record,
            Err(e) => {
                error!(%principal, "Calculation not recorded: {}", e);
                return Err(e.into());
            },
        };

        let submission = Submission {
            expression: expression.to_string(),
            outcome,
            record,
        };
        debug!(%principal, state = ?submission.state(), "Submission complete");
        Ok(submission)
    }

    /// Calculation history of `principal`
    pub async fn history(
        &self,
        principal: Option<Principal>,
    ) -> Result<Vec<CalculationRecord>, SubmissionError> {
        let principal = principal.ok_or(SubmissionError::Unauthenticated)?;
        Ok(self.ledger.list_by_principal(principal).await?)
    }
}
