use crate::error::{EvalError, EvalResult};
use crate::tokens::{Associativity, Kind, Token};
use log::debug;

/// Reorders infix tokens into postfix order (shunting-yard).
pub struct Compiler;

impl Compiler {
    pub fn to_rpn(tokens: &[Token]) -> EvalResult<Vec<Token>> {
        let mut output = Vec::with_capacity(tokens.len());
        let mut operators: Vec<&Token> = Vec::new();

        for token in tokens {
            let kind = token.kind();
            match kind {
                _ if kind.is_operand() => output.push(token.clone()),

                // Functions wait on the stack until their group closes.
                Kind::OpenBracket | Kind::Function(_) => operators.push(token),

                Kind::CloseBracket => loop {
                    match operators.pop() {
                        Some(top) if top.kind() == Kind::OpenBracket => break,
                        Some(top) => output.push(top.clone()),
                        None => {
                            return Err(EvalError::UnbalancedBracket {
                                text: token.text().to_string(),
                                span: token.span(),
                            })
                        }
                    }
                },

                _ if kind.is_operator() => {
                    while let Some(top) = operators.last() {
                        if !Self::yields_to(top.kind(), kind) {
                            break;
                        }
                        output.push((*top).clone());
                        operators.pop();
                    }
                    operators.push(token);
                }

                _ => return Err(token.unrecognized()),
            }
        }

        // Unclosed groups are implicitly closed at the end.
        while let Some(top) = operators.pop() {
            if top.kind() != Kind::OpenBracket {
                output.push(top.clone());
            }
        }

        debug!(
            "RPN: {}",
            output.iter().map(Token::text).collect::<Vec<_>>().join(" ")
        );
        Ok(output)
    }

    /// Whether `top` must be emitted before `incoming` is pushed.
    fn yields_to(top: Kind, incoming: Kind) -> bool {
        if top == Kind::OpenBracket {
            return false;
        }
        match (top.precedence(), incoming.precedence()) {
            (Some(p_top), Some(p_incoming)) => {
                p_top > p_incoming
                    || (p_top == p_incoming
                        && incoming.associativity() == Associativity::LeftToRight)
            }
            _ => false,
        }
    }
}
