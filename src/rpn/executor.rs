use crate::error::{EvalError, EvalResult};
use crate::options::EvalOptions;
use crate::rpn::Value;
use crate::tokens::{Kind, Token};
use log::debug;

/// Stack machine over postfix token sequences.
#[derive(Debug, Default)]
pub struct Executor {
    stack: Vec<Value>,
}

impl Executor {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Evaluates a postfix sequence on a fresh stack.
    pub fn eval_rpn(rpn: &[Token], options: &EvalOptions) -> EvalResult<f64> {
        Self::new().execute(rpn, options)
    }

    /// Runs `rpn` and returns the value left on top, or `0.0` when nothing
    /// was pushed.
    pub fn execute(&mut self, rpn: &[Token], options: &EvalOptions) -> EvalResult<f64> {
        self.stack.clear();

        for token in rpn {
            let kind = token.kind();
            match kind {
                Kind::Number | Kind::Constant(_) => {
                    let value = token.cast().ok_or_else(|| token.unrecognized())?;
                    self.stack.push(Value::Number(value));
                }
                _ if kind.is_binary_shaped() => {
                    let (x, y) = self.pop_pair(token)?;
                    let value = match kind {
                        Kind::Separator => x.concat(y),
                        _ => {
                            let mut pack = x.into_pack();
                            pack.extend(y.into_pack());
                            Value::Number(kind.apply(&pack, options)?)
                        }
                    };
                    self.stack.push(value);
                }
                Kind::Unary(_) | Kind::Function(_) => {
                    let pack = match self.stack.pop() {
                        Some(value) => value.into_pack(),
                        None => Vec::new(),
                    };
                    self.stack.push(Value::Number(kind.apply(&pack, options)?));
                }
                _ => return Err(token.unrecognized()),
            }
        }

        let result = match self.stack.pop() {
            None => 0.0,
            Some(Value::Number(value)) => value,
            Some(Value::List(list)) => {
                return Err(EvalError::Separator {
                    message: format!("argument list {:?} outside function call", list),
                    positions: Vec::new(),
                })
            }
        };
        debug!("Result: {}", result);
        Ok(result)
    }

    /// Pops two values, returned in push order.
    fn pop_pair(&mut self, token: &Token) -> EvalResult<(Value, Value)> {
        match (self.stack.pop(), self.stack.pop()) {
            (Some(y), Some(x)) => Ok((x, y)),
            (y, _) => Err(EvalError::ArgumentCount {
                operator: token.kind().to_string(),
                expected: "2".to_string(),
                got: usize::from(y.is_some()),
            }),
        }
    }
}
