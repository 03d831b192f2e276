use crate::tokens::{Kind, Span};
use thiserror::Error;

/// Every way tokenizing, converting or evaluating an expression can fail.
///
/// Errors are values: a failing `evaluate` call never leaves partial state
/// behind (history and cache stay untouched).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Token text does not match the recognition pattern of its kind.
    #[error("invalid token value {text:?} for {kind}")]
    InvalidTokenValue { kind: Kind, text: String },

    /// A token of a kind that cannot take part in evaluation was found.
    #[error("unrecognized token {text:?} at {span}")]
    UnrecognizedToken { text: String, span: Span },

    /// A closing bracket had no matching opening bracket.
    #[error("unbalanced bracket {text:?} at {span}")]
    UnbalancedBracket { text: String, span: Span },

    /// A separator was used outside a function body, or a function got a
    /// separator count outside its bounds.
    #[error("separator error: {message} (separators at {positions:?})")]
    Separator {
        message: String,
        positions: Vec<usize>,
    },

    /// Too many or too few operands for an operator or function.
    #[error("{operator} expects {expected} operand(s), got {got}")]
    ArgumentCount {
        operator: String,
        expected: String,
        got: usize,
    },

    /// The expression handed to the calculator was not text.
    #[error("invalid input type: {0}")]
    InvalidInputType(String),

    /// A rule was built with no identity kinds.
    #[error("rule cannot be empty")]
    EmptyRule,

    /// A rule was registered under a name that cannot label a group.
    #[error("invalid rule name {0:?}")]
    InvalidRule(String),

    /// An operation produced a non-finite number from finite operands.
    #[error("calculation failed on {operator}: {message}")]
    Calculation { operator: String, message: String },

    /// A rule pattern failed to compile.
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

pub type EvalResult<T> = Result<T, EvalError>;
