//! Evaluator - recursive-descent parser that computes while it parses
//!
//! Grammar:
//! ```text
//! expr    := term (("+" | "-") term)*
//! term    := factor (("*" | "/") factor)*
//! factor  := number | "(" expr ")" | "-" factor
//! number  := digit+ ("." digit+)?
//! ```
//!
//! Each rule consumes tokens from the lexer with exactly one token of
//! lookahead, so work is linear in the expression length. Binary operators
//! fold left-to-right, which makes them left-associative.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{CalcError, Result};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::outcome::EvaluationOutcome;

/// Default upper bound on expression length in bytes
pub const DEFAULT_MAX_EXPRESSION_LEN: usize = 1024;

/// Default upper bound on nesting of parentheses and unary minus
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Evaluator limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Expressions longer than this (bytes) fail with `InputTooLarge`
    pub max_expression_len: usize,
    /// Maximum nesting of `(` and unary `-`
    pub max_depth: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            max_expression_len: DEFAULT_MAX_EXPRESSION_LEN,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Evaluator - stateless arithmetic expression engine
///
/// # Example
/// ```
/// use tally_calc::{EvaluationOutcome, Evaluator};
///
/// let evaluator = Evaluator::default();
/// assert_eq!(evaluator.evaluate("2 + 2 * 2"), EvaluationOutcome::Value(6.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: EvaluatorConfig,
}

impl Evaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Evaluate an expression into a tagged outcome
    pub fn evaluate(&self, expression: &str) -> EvaluationOutcome {
        self.try_evaluate(expression).into()
    }

    /// Evaluate an expression, returning the failure as an error
    pub fn try_evaluate(&self, expression: &str) -> Result<f64> {
        // Checked before the lexer sees a single byte
        if expression.len() > self.config.max_expression_len {
            return Err(CalcError::input_too_large(
                expression.len(),
                self.config.max_expression_len,
            ));
        }

        if expression.trim().is_empty() {
            return Err(CalcError::syntax(0, "empty expression"));
        }

        let mut parser = Parser::new(expression, self.config.max_depth)?;
        let value = parser.expr()?;
        parser.expect_end()?;

        trace!(expression, value, "Evaluated expression");
        Ok(value)
    }
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str, max_depth: usize) -> Result<Self> {
        let mut lexer = Lexer::new(src);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            depth: 0,
            max_depth,
        })
    }

    /// Consume the lookahead token and return it
    fn advance(&mut self) -> Result<Token> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn enter(&mut self, position: usize) -> Result<()> {
        if self.depth >= self.max_depth {
            return Err(CalcError::syntax(
                position,
                format!("nesting deeper than {} levels", self.max_depth),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn expr(&mut self) -> Result<f64> {
        let mut acc = self.term()?;
        loop {
            match self.current.kind {
                TokenKind::Plus => {
                    let op = self.advance()?;
                    let rhs = self.term()?;
                    acc = finite(acc + rhs, op.position)?;
                },
                TokenKind::Minus => {
                    let op = self.advance()?;
                    let rhs = self.term()?;
                    acc = finite(acc - rhs, op.position)?;
                },
                _ => return Ok(acc),
            }
        }
    }

    fn term(&mut self) -> Result<f64> {
        let mut acc = self.factor()?;
        loop {
            match self.current.kind {
                TokenKind::Star => {
                    let op = self.advance()?;
                    let rhs = self.factor()?;
                    acc = finite(acc * rhs, op.position)?;
                },
                TokenKind::Slash => {
                    let op = self.advance()?;
                    let rhs = self.factor()?;
                    if rhs == 0.0 {
                        return Err(CalcError::division_by_zero(op.position));
                    }
                    acc = finite(acc / rhs, op.position)?;
                },
                _ => return Ok(acc),
            }
        }
    }

    fn factor(&mut self) -> Result<f64> {
        let token = self.current;
        match token.kind {
            TokenKind::Number(value) => {
                self.advance()?;
                Ok(value)
            },
            TokenKind::LParen => {
                self.advance()?;
                self.enter(token.position)?;
                let value = self.expr()?;
                match self.current.kind {
                    TokenKind::RParen => {
                        self.advance()?;
                    },
                    TokenKind::End => {
                        return Err(CalcError::syntax(
                            self.current.position,
                            format!("unclosed '(' opened at position {}", token.position),
                        ));
                    },
                    other => {
                        return Err(CalcError::syntax(
                            self.current.position,
                            format!("expected ')' but found {}", other.describe()),
                        ));
                    },
                }
                self.leave();
                Ok(value)
            },
            TokenKind::Minus => {
                self.advance()?;
                self.enter(token.position)?;
                let value = self.factor()?;
                self.leave();
                Ok(-value)
            },
            TokenKind::End => Err(CalcError::syntax(
                token.position,
                "unexpected end of expression, expected operand",
            )),
            other => Err(CalcError::syntax(
                token.position,
                format!("unexpected {}, expected operand", other.describe()),
            )),
        }
    }

    fn expect_end(&self) -> Result<()> {
        match self.current.kind {
            TokenKind::End => Ok(()),
            TokenKind::RParen => Err(CalcError::syntax(
                self.current.position,
                "unmatched ')'",
            )),
            other => Err(CalcError::syntax(
                self.current.position,
                format!("unexpected {} after complete expression", other.describe()),
            )),
        }
    }
}

fn finite(value: f64, position: usize) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::numeric_overflow(position))
    }
}
