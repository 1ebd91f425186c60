//! Error types for tally-calc

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of an evaluation failure
///
/// This is the stable, wire-facing part of a [`CalcError`]; the transport
/// layer serializes it as `snake_case`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    SyntaxError,
    DivisionByZero,
    InputTooLarge,
    NumericOverflow,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SyntaxError => "syntax_error",
            Self::DivisionByZero => "division_by_zero",
            Self::InputTooLarge => "input_too_large",
            Self::NumericOverflow => "numeric_overflow",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evaluation errors
///
/// Positions are byte offsets into the submitted expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("Syntax error at position {position}: {reason}")]
    Syntax { position: usize, reason: String },

    #[error("Division by zero at position {position}")]
    DivisionByZero { position: usize },

    #[error("Expression too large: {len} bytes exceeds limit of {max}")]
    InputTooLarge { len: usize, max: usize },

    #[error("Numeric overflow at position {position}")]
    NumericOverflow { position: usize },
}

impl CalcError {
    pub fn syntax(position: usize, reason: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            reason: reason.into(),
        }
    }

    pub fn division_by_zero(position: usize) -> Self {
        Self::DivisionByZero { position }
    }

    pub fn input_too_large(len: usize, max: usize) -> Self {
        Self::InputTooLarge { len, max }
    }

    pub fn numeric_overflow(position: usize) -> Self {
        Self::NumericOverflow { position }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Syntax { .. } => ErrorKind::SyntaxError,
            Self::DivisionByZero { .. } => ErrorKind::DivisionByZero,
            Self::InputTooLarge { .. } => ErrorKind::InputTooLarge,
            Self::NumericOverflow { .. } => ErrorKind::NumericOverflow,
        }
    }

    /// Byte offset the error points at, if it has one
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Syntax { position, .. }
            | Self::DivisionByZero { position }
            | Self::NumericOverflow { position } => Some(*position),
            Self::InputTooLarge { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;
