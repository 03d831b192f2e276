pub mod calculator;
pub mod defaults;
pub mod error;
pub mod functions;
pub mod lexer;
pub mod options;
pub mod rpn;
pub mod tokens;
pub mod validators;

pub use calculator::{Calculator, HistoryEntry};
pub use error::{EvalError, EvalResult};
pub use lexer::{Rule, Tokenizer, Validator};
pub use options::{EvalOptions, OptionValue};
pub use tokens::{Kind, Span, Token};

/// One-off evaluation with the default grammar and validators.
pub fn evaluate_expression(expression: &str, options: &EvalOptions) -> EvalResult<f64> {
    let mut calculator = Calculator::with_defaults()?;
    calculator.evaluate(expression, false, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_expression() {
        let options = EvalOptions::new();
        assert_eq!(evaluate_expression("2 * (3 + 4)", &options), Ok(14.0));
        assert!(evaluate_expression("2 *", &options).is_err());
    }
}
