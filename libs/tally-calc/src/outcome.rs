//! Tagged result of evaluating one expression

use crate::error::{CalcError, ErrorKind};
use crate::format::format_value;

/// Either a numeric value or a classified failure
///
/// Transient: only `Value` outcomes are ever persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationOutcome {
    Value(f64),
    Failure(CalcError),
}

impl EvaluationOutcome {
    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&CalcError> {
        match self {
            Self::Value(_) => None,
            Self::Failure(e) => Some(e),
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.failure().map(CalcError::kind)
    }

    /// Canonical text of a successful value
    pub fn rendered(&self) -> Option<String> {
        self.value().map(format_value)
    }

    pub fn into_result(self) -> Result<f64, CalcError> {
        self.into()
    }
}

impl From<Result<f64, CalcError>> for EvaluationOutcome {
    fn from(result: Result<f64, CalcError>) -> Self {
        match result {
            Ok(v) => Self::Value(v),
            Err(e) => Self::Failure(e),
        }
    }
}

impl From<EvaluationOutcome> for Result<f64, CalcError> {
    fn from(outcome: EvaluationOutcome) -> Self {
        match outcome {
            EvaluationOutcome::Value(v) => Ok(v),
            EvaluationOutcome::Failure(e) => Err(e),
        }
    }
}
