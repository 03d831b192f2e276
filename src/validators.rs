//! Structural checks run by the tokenizer after matching.

use crate::error::{EvalError, EvalResult};
use crate::lexer::Validator;
use crate::tokens::{Kind, Token};
use std::sync::Arc;

/// Fails on the first token no rule could recognize.
pub fn verify_groups(tokens: &[Token]) -> EvalResult<()> {
    match tokens.iter().find(|token| token.kind() == Kind::AnyChar) {
        Some(token) => Err(token.unrecognized()),
        None => Ok(()),
    }
}

/// Bracket group being scanned, innermost last.
#[derive(Debug, Default)]
struct Frame {
    separators: Vec<usize>,
}

/// Checks that separators only appear directly inside a function's brackets
/// and that every function gets a separator count its arity allows.
///
/// Tokens are scanned right to left with an explicit stack of bracket
/// frames, so nesting depth is bounded only by memory.
pub fn verify_functions(tokens: &[Token]) -> EvalResult<()> {
    let mut frames = vec![Frame::default()];
    let mut index = tokens.len();

    while index > 0 {
        index -= 1;
        let token = &tokens[index];

        match token.kind() {
            Kind::CloseBracket => frames.push(Frame::default()),
            Kind::Separator => {
                if let Some(frame) = frames.last_mut() {
                    frame.separators.push(token.span().start);
                }
            }
            Kind::OpenBracket => {
                let frame = if frames.len() > 1 {
                    frames.pop().unwrap_or_default()
                } else {
                    std::mem::take(&mut frames[0])
                };

                let function = index
                    .checked_sub(1)
                    .map(|prev| &tokens[prev])
                    .filter(|prev| matches!(prev.kind(), Kind::Function(_)));

                match function {
                    Some(function) => {
                        index -= 1;
                        check_separator_count(function, frame)?;
                    }
                    None if !frame.separators.is_empty() => {
                        return Err(separator_error(
                            "separators outside function body".to_string(),
                            frame,
                        ));
                    }
                    None => {}
                }
            }
            _ => {}
        }
    }

    let stray: Vec<usize> = frames
        .into_iter()
        .flat_map(|frame| frame.separators)
        .collect();
    if !stray.is_empty() {
        return Err(separator_error(
            "separators outside bracket group".to_string(),
            Frame { separators: stray },
        ));
    }
    Ok(())
}

fn check_separator_count(function: &Token, frame: Frame) -> EvalResult<()> {
    let Some(arity) = function.kind().arity() else {
        return Ok(());
    };
    let min = arity.min.saturating_sub(1);
    let max = arity.max.map(|max| max.saturating_sub(1));
    let count = frame.separators.len();

    if count < min || max.is_some_and(|max| count > max) {
        let expected = match max {
            Some(max) => format!("{}-{}", min, max),
            None => format!("{}-inf", min),
        };
        return Err(separator_error(
            format!(
                "invalid number of separators for {}: expected {}, got {}",
                function.text(),
                expected,
                count
            ),
            frame,
        ));
    }
    Ok(())
}

fn separator_error(message: String, frame: Frame) -> EvalError {
    let mut positions = frame.separators;
    positions.sort_unstable();
    EvalError::Separator { message, positions }
}

/// The validators installed by `Calculator::with_defaults`, in run order.
pub fn default_validators() -> Vec<(String, Validator)> {
    vec![
        ("group".to_string(), Arc::new(verify_groups) as Validator),
        ("function".to_string(), Arc::new(verify_functions) as Validator),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::FunctionOp;
    use crate::tokens::Span;

    /// Builds tokens from `(kind, text)` pairs laid out back to back.
    fn tokens(parts: &[(Kind, &str)]) -> Vec<Token> {
        let mut start = 0;
        parts
            .iter()
            .map(|(kind, text)| {
                let span = Span::new(start, start + text.len());
                start = span.end;
                Token::new(*kind, *text, span).unwrap()
            })
            .collect()
    }

    const OPEN: (Kind, &str) = (Kind::OpenBracket, "(");
    const CLOSE: (Kind, &str) = (Kind::CloseBracket, ")");
    const COMMA: (Kind, &str) = (Kind::Separator, ",");

    fn num(text: &str) -> (Kind, &str) {
        (Kind::Number, text)
    }

    fn func(op: FunctionOp) -> (Kind, &'static str) {
        (Kind::Function(op), op.name())
    }

    #[test]
    fn test_verify_groups() {
        assert!(verify_groups(&tokens(&[num("1")])).is_ok());
        assert!(verify_groups(&[]).is_ok());

        let err = verify_groups(&tokens(&[num("1"), (Kind::AnyChar, "+x")])).unwrap_err();
        assert_eq!(
            err,
            EvalError::UnrecognizedToken {
                text: "+x".to_string(),
                span: Span::new(1, 3),
            }
        );
    }

    #[test]
    fn test_function_arguments() {
        // MAX(1,2,3)
        let list = tokens(&[
            func(FunctionOp::Max),
            OPEN,
            num("1"),
            COMMA,
            num("2"),
            COMMA,
            num("3"),
            CLOSE,
        ]);
        assert!(verify_functions(&list).is_ok());

        // SIN(7,6)
        let list = tokens(&[func(FunctionOp::Sin), OPEN, num("7"), COMMA, num("6"), CLOSE]);
        match verify_functions(&list).unwrap_err() {
            EvalError::Separator { positions, .. } => assert_eq!(positions, vec![5]),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_separator_outside_function_body() {
        // (1,2)
        let list = tokens(&[OPEN, num("1"), COMMA, num("2"), CLOSE]);
        assert!(matches!(
            verify_functions(&list),
            Err(EvalError::Separator { .. })
        ));

        // 1,2
        let list = tokens(&[num("1"), COMMA, num("2")]);
        assert_eq!(
            verify_functions(&list),
            Err(EvalError::Separator {
                message: "separators outside bracket group".to_string(),
                positions: vec![1],
            })
        );
    }

    #[test]
    fn test_nested_groups_count_separately() {
        // MAX(SIN(1),(2),MIN(3,4))
        let list = tokens(&[
            func(FunctionOp::Max),
            OPEN,
            func(FunctionOp::Sin),
            OPEN,
            num("1"),
            CLOSE,
            COMMA,
            OPEN,
            num("2"),
            CLOSE,
            COMMA,
            func(FunctionOp::Min),
            OPEN,
            num("3"),
            COMMA,
            num("4"),
            CLOSE,
            CLOSE,
        ]);
        assert!(verify_functions(&list).is_ok());

        // SIN((1),(2))
        let list = tokens(&[
            func(FunctionOp::Sin),
            OPEN,
            OPEN,
            num("1"),
            CLOSE,
            COMMA,
            OPEN,
            num("2"),
            CLOSE,
            CLOSE,
        ]);
        assert!(verify_functions(&list).is_err());
    }

    #[test]
    fn test_unclosed_function_separators() {
        // MAX(1,2 without a closing bracket
        let list = tokens(&[func(FunctionOp::Max), OPEN, num("1"), COMMA, num("2")]);
        assert!(verify_functions(&list).is_ok());

        // 1,2) with a dangling close bracket
        let list = tokens(&[num("1"), COMMA, num("2"), CLOSE]);
        assert!(verify_functions(&list).is_err());
    }

    #[test]
    fn test_deep_nesting() {
        let depth = 100_000;
        let mut parts = Vec::with_capacity(depth * 3 + 1);
        for _ in 0..depth {
            parts.push(func(FunctionOp::Add));
            parts.push(OPEN);
        }
        parts.push(num("1"));
        parts.extend(std::iter::repeat(CLOSE).take(depth));
        assert!(verify_functions(&tokens(&parts)).is_ok());
    }

    #[test]
    fn test_default_validator_order() {
        let names: Vec<_> = default_validators()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["group", "function"]);
    }
}
