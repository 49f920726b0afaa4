//! Expression engine: lexer, parser, interpreter and result formatting.
//!
//! Input is display notation as typed on the keypad (`2×π`, `sqrt(`, `÷`).
//! It is lexed and parsed on every call; no tree outlives an evaluation.

pub mod eval;
pub mod format;
pub mod lexer;
pub mod parser;

pub use format::format_number;
pub use lexer::{contains_variable, normalize, tokenize, Token, VARIABLE};
pub use parser::{Expr, Parser};

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Literal shown for any failed scalar evaluation.
pub const ERROR_TEXT: &str = "Error";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalcError {
    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Domain error: {0}")]
    Domain(String),

    #[error("Overflow: {0}")]
    Overflow(String),

    #[error("Unbound variable '{0}'")]
    UnboundVariable(char),
}

/// Outcome of a scalar evaluation. Error subtypes are deliberately collapsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EvaluationResult {
    Number(String),
    Error,
}

impl EvaluationResult {
    pub fn is_error(&self) -> bool {
        matches!(self, EvaluationResult::Error)
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            EvaluationResult::Number(s) => Some(s),
            EvaluationResult::Error => None,
        }
    }
}

impl fmt::Display for EvaluationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationResult::Number(s) => f.write_str(s),
            EvaluationResult::Error => f.write_str(ERROR_TEXT),
        }
    }
}

/// Lexes and parses without evaluating.
pub fn compile(input: &str) -> Result<Expr, CalcError> {
    let tokens = tokenize(input)?;
    Parser::new(tokens).parse()
}

/// Evaluates a scalar expression, keeping the error subtype.
pub fn evaluate_value(input: &str) -> Result<f64, CalcError> {
    compile(input)?.eval(None)
}

/// Evaluates a scalar expression into its display form.
pub fn evaluate(input: &str) -> EvaluationResult {
    match evaluate_value(input) {
        Ok(value) => EvaluationResult::Number(format_number(value)),
        Err(e) => {
            debug!(
                "evaluation of {:?} ({}) failed: {}",
                input,
                normalize(input).unwrap_or_default(),
                e
            );
            EvaluationResult::Error
        }
    }
}
