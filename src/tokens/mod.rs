use crate::error::{EvalError, EvalResult};
use crate::functions::{self, FunctionOp};
use crate::options::EvalOptions;
use log::trace;
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

mod token;

pub use token::{Span, Token};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Associativity {
    LeftToRight,
    RightToLeft,
}

/// Where a unary operator sits relative to its operand.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Side {
    /// Prefix, e.g. negation.
    Left,
    /// Postfix, e.g. factorial.
    Right,
}

/// Inclusive bound on the number of operands an operator accepts.
/// `max == None` means unbounded.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Arity {
    pub min: usize,
    pub max: Option<usize>,
}

impl Arity {
    pub const fn exactly(n: usize) -> Self {
        Self {
            min: n,
            max: Some(n),
        }
    }

    pub const fn at_least(n: usize) -> Self {
        Self { min: n, max: None }
    }

    pub fn contains(&self, count: usize) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{}", max),
            Some(max) => write!(f, "{}-{}", self.min, max),
            None => write!(f, "{}-inf", self.min),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
}

impl BinaryOp {
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Subtract => 1,
            BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo => 2,
            BinaryOp::Power => 3,
        }
    }

    pub fn apply(self, x: f64, y: f64) -> f64 {
        match self {
            BinaryOp::Add => x + y,
            BinaryOp::Subtract => x - y,
            BinaryOp::Multiply => x * y,
            BinaryOp::Divide => x / y,
            BinaryOp::Modulo => functions::floored_rem(x, y),
            BinaryOp::Power => x.powf(y),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Negate,
    Factorial,
}

impl UnaryOp {
    pub fn side(self) -> Side {
        match self {
            UnaryOp::Negate => Side::Left,
            UnaryOp::Factorial => Side::Right,
        }
    }

    pub fn apply(self, x: f64) -> f64 {
        match self {
            UnaryOp::Negate => -x,
            UnaryOp::Factorial => functions::gamma(x + 1.0),
        }
    }
}

/// The closed set of token kinds a grammar can be built from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    Number,
    Constant(Constant),
    OpenBracket,
    CloseBracket,
    StartAnchor,
    EndAnchor,
    AnyChar,
    Binary(BinaryOp),
    /// The comma. Binary-shaped, but joins operands into an argument list.
    Separator,
    Unary(UnaryOp),
    Function(FunctionOp),
}

const BASE_KINDS: [Kind; 17] = [
    Kind::Number,
    Kind::Constant(Constant::Pi),
    Kind::Constant(Constant::E),
    Kind::OpenBracket,
    Kind::CloseBracket,
    Kind::StartAnchor,
    Kind::EndAnchor,
    Kind::AnyChar,
    Kind::Separator,
    Kind::Binary(BinaryOp::Add),
    Kind::Binary(BinaryOp::Subtract),
    Kind::Binary(BinaryOp::Multiply),
    Kind::Binary(BinaryOp::Divide),
    Kind::Binary(BinaryOp::Modulo),
    Kind::Binary(BinaryOp::Power),
    Kind::Unary(UnaryOp::Negate),
    Kind::Unary(UnaryOp::Factorial),
];

impl Kind {
    /// Every kind, in declaration order.
    pub fn catalog() -> Vec<Kind> {
        BASE_KINDS.into_iter().chain(Self::functions()).collect()
    }

    pub fn functions() -> Vec<Kind> {
        FunctionOp::ALL.iter().copied().map(Kind::Function).collect()
    }

    pub fn constants() -> Vec<Kind> {
        vec![Kind::Constant(Constant::Pi), Kind::Constant(Constant::E)]
    }

    /// The binary operator family. The separator belongs to it.
    pub fn binary_operators() -> Vec<Kind> {
        vec![
            Kind::Separator,
            Kind::Binary(BinaryOp::Add),
            Kind::Binary(BinaryOp::Subtract),
            Kind::Binary(BinaryOp::Multiply),
            Kind::Binary(BinaryOp::Divide),
            Kind::Binary(BinaryOp::Modulo),
            Kind::Binary(BinaryOp::Power),
        ]
    }

    pub fn unary_operators(side: Side) -> Vec<Kind> {
        [UnaryOp::Negate, UnaryOp::Factorial]
            .into_iter()
            .filter(|op| op.side() == side)
            .map(Kind::Unary)
            .collect()
    }

    /// Recognition pattern, as regex source.
    pub fn pattern(&self) -> &'static str {
        match self {
            Kind::Number => r"[0-9]+(?:\.[0-9]+)?(?:e(?:-|\+)[0-9]+)?",
            Kind::Constant(Constant::Pi) => "PI",
            Kind::Constant(Constant::E) => "E",
            Kind::OpenBracket => r"[({\[]",
            Kind::CloseBracket => r"[)}\]]",
            Kind::StartAnchor => "^",
            Kind::EndAnchor => "$",
            Kind::AnyChar => ".+",
            Kind::Separator => ",",
            Kind::Binary(BinaryOp::Add) => r"\+",
            Kind::Binary(BinaryOp::Subtract) => "-",
            Kind::Binary(BinaryOp::Multiply) => r"\*",
            Kind::Binary(BinaryOp::Divide) => "/",
            Kind::Binary(BinaryOp::Modulo) => "%",
            Kind::Binary(BinaryOp::Power) => r"\^",
            Kind::Unary(UnaryOp::Negate) => "-",
            Kind::Unary(UnaryOp::Factorial) => "!",
            Kind::Function(op) => op.pattern(),
        }
    }

    pub fn precedence(&self) -> Option<u8> {
        match self {
            Kind::Separator => Some(0),
            Kind::Binary(op) => Some(op.precedence()),
            Kind::Unary(op) => match op.side() {
                Side::Left => Some(3),
                Side::Right => Some(4),
            },
            Kind::Function(_) => Some(5),
            _ => None,
        }
    }

    pub fn associativity(&self) -> Associativity {
        match self {
            Kind::Binary(BinaryOp::Power) => Associativity::RightToLeft,
            Kind::Unary(op) if op.side() == Side::Left => Associativity::RightToLeft,
            _ => Associativity::LeftToRight,
        }
    }

    pub fn arity(&self) -> Option<Arity> {
        match self {
            Kind::Binary(_) | Kind::Separator => Some(Arity::exactly(2)),
            Kind::Unary(_) => Some(Arity::exactly(1)),
            Kind::Function(op) => Some(op.arity()),
            _ => None,
        }
    }

    pub fn is_operand(&self) -> bool {
        matches!(self, Kind::Number | Kind::Constant(_))
    }

    pub fn is_operator(&self) -> bool {
        self.precedence().is_some()
    }

    /// Binary operators and the separator: both pop two stack values.
    pub fn is_binary_shaped(&self) -> bool {
        matches!(self, Kind::Binary(_) | Kind::Separator)
    }

    /// Whether `text` is, in full, a lexeme of this kind.
    pub fn accepts(&self, text: &str) -> EvalResult<bool> {
        static MATCHERS: OnceLock<HashMap<Kind, Result<Regex, regex::Error>>> = OnceLock::new();

        let matchers = MATCHERS.get_or_init(|| {
            Kind::catalog()
                .into_iter()
                .map(|kind| (kind, kind.full_match_regex()))
                .collect()
        });

        match matchers.get(self) {
            Some(Ok(regex)) => Ok(regex.is_match(text)),
            Some(Err(e)) => Err(e.clone().into()),
            None => Ok(self.full_match_regex()?.is_match(text)),
        }
    }

    fn full_match_regex(&self) -> Result<Regex, regex::Error> {
        RegexBuilder::new(&format!(r"\A(?:{})\z", self.pattern()))
            .case_insensitive(true)
            .build()
    }

    /// Runs the operator on a flat operand pack, checking arity first.
    ///
    /// The separator is not handled here: it builds argument lists rather
    /// than numbers (see `rpn::Value::concat`).
    pub fn apply(&self, pack: &[f64], options: &EvalOptions) -> EvalResult<f64> {
        let arity = self.arity().ok_or_else(|| EvalError::UnrecognizedToken {
            text: self.to_string(),
            span: Span::default(),
        })?;
        if !arity.contains(pack.len()) {
            return Err(EvalError::ArgumentCount {
                operator: self.to_string(),
                expected: arity.to_string(),
                got: pack.len(),
            });
        }

        let result = match self {
            Kind::Binary(op) => op.apply(pack[0], pack[1]),
            Kind::Unary(op) => op.apply(pack[0]),
            Kind::Function(op) => op.apply(pack, options),
            _ => {
                return Err(EvalError::UnrecognizedToken {
                    text: self.to_string(),
                    span: Span::default(),
                })
            }
        };
        trace!("{} {:?} = {}", self, pack, result);

        if !result.is_finite() && pack.iter().all(|x| x.is_finite()) {
            return Err(EvalError::Calculation {
                operator: self.to_string(),
                message: format!("no finite result for operands {:?}", pack),
            });
        }
        Ok(result)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Number => write!(f, "Number"),
            Kind::Constant(c) => write!(f, "Constant({:?})", c),
            Kind::OpenBracket => write!(f, "OpenBracket"),
            Kind::CloseBracket => write!(f, "CloseBracket"),
            Kind::StartAnchor => write!(f, "StartAnchor"),
            Kind::EndAnchor => write!(f, "EndAnchor"),
            Kind::AnyChar => write!(f, "AnyChar"),
            Kind::Separator => write!(f, "Separator"),
            Kind::Binary(op) => write!(f, "BinaryOperator({:?})", op),
            Kind::Unary(op) => write!(f, "UnaryOperator({:?})", op),
            Kind::Function(op) => write!(f, "Function({})", op.name()),
        }
    }
}
