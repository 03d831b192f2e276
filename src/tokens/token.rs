use crate::error::{EvalError, EvalResult};
use crate::tokens::Kind;
use std::fmt;

/// Byte range of a token inside the whitespace-stripped expression.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A lexeme tagged with its kind. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    kind: Kind,
    text: String,
    span: Span,
}

impl Token {
    /// Builds a token, rejecting text the kind's pattern does not match.
    pub fn new(kind: Kind, text: impl Into<String>, span: Span) -> EvalResult<Self> {
        let text = text.into();
        if !kind.accepts(&text)? {
            return Err(EvalError::InvalidTokenValue { kind, text });
        }
        Ok(Self { kind, text, span })
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Numeric value of an operand token, `None` for everything else.
    pub fn cast(&self) -> Option<f64> {
        match self.kind {
            Kind::Number => self.text.parse().ok(),
            Kind::Constant(constant) => Some(constant.value()),
            _ => None,
        }
    }

    pub(crate) fn unrecognized(&self) -> EvalError {
        EvalError::UnrecognizedToken {
            text: self.text.clone(),
            span: self.span,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?} at {})", self.kind, self.text, self.span)
    }
}
