//! tally-calc - Arithmetic expression evaluator for Tally
//!
//! Evaluates infix expressions over decimal numbers with `+ - * /`,
//! parentheses and unary minus, using IEEE-754 double precision.
//!
//! # Features
//!
//! - **Single pass**: tokens are pulled on demand and folded as they are parsed
//! - **Classified failures**: syntax, division by zero, oversize input, overflow
//! - **Bounded work**: input length and nesting depth are capped by [`EvaluatorConfig`]
//! - **Canonical rendering**: [`format_value`] gives the exact text stored in the ledger
//!
//! # Example
//!
//! ```rust
//! use tally_calc::{ErrorKind, Evaluator, format_value};
//!
//! let evaluator = Evaluator::default();
//!
//! let outcome = evaluator.evaluate("(2 + 2) * 2");
//! assert_eq!(outcome.value(), Some(8.0));
//! assert_eq!(format_value(8.0), "8");
//!
//! let outcome = evaluator.evaluate("1 / 0");
//! assert_eq!(outcome.error_kind(), Some(ErrorKind::DivisionByZero));
//! ```
//!
//! # Precedence
//!
//! | Level | Operators | Associativity |
//! |-------|-----------|---------------|
//! | 1 (tightest) | unary `-` | right |
//! | 2 | `*` `/` | left |
//! | 3 | `+` `-` | left |

pub mod error;
pub mod evaluator;
pub mod format;
pub mod lexer;
pub mod outcome;

pub use error::{CalcError, ErrorKind, Result};
pub use evaluator::{Evaluator, EvaluatorConfig, DEFAULT_MAX_DEPTH, DEFAULT_MAX_EXPRESSION_LEN};
pub use format::format_value;
pub use outcome::EvaluationOutcome;
