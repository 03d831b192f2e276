//! Infix-to-postfix conversion and postfix evaluation.

mod compiler;
mod executor;

pub use compiler::Compiler;
pub use executor::Executor;

/// A value on the evaluation stack. Separators turn numbers into argument
/// lists, which functions and unary operators consume flattened.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    List(Vec<f64>),
}

impl Value {
    /// Joins two values into one argument list, promoting bare numbers.
    pub fn concat(self, other: Value) -> Value {
        let mut pack = self.into_pack();
        pack.extend(other.into_pack());
        Value::List(pack)
    }

    /// The value as a flat operand pack.
    pub fn into_pack(self) -> Vec<f64> {
        match self {
            Value::Number(n) => vec![n],
            Value::List(list) => list,
        }
    }
}
