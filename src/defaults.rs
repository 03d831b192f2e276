//! The standard grammar.
//!
//! Context wiring is what tells a negation `-` from a subtraction `-`:
//! a prefix minus may only follow an operator, an open bracket, a separator
//! or the start of the expression.

use crate::error::EvalResult;
use crate::lexer::Rule;
use crate::tokens::{Kind, Side};

/// Rule names in registration order.
pub const RULE_NAMES: [&str; 10] = [
    "function",
    "separator",
    "constant",
    "open_bracket",
    "close_bracket",
    "number",
    "ul_operator",
    "ul_start_operator",
    "b_operator",
    "ur_operator",
];

/// Every default rule, in registration order.
pub fn rules() -> EvalResult<Vec<(String, Rule)>> {
    let function = Kind::functions();
    let separator = vec![Kind::Separator];
    let constant = Kind::constants();
    let open_bracket = vec![Kind::OpenBracket];
    let close_bracket = vec![Kind::CloseBracket];
    let number = vec![Kind::Number];
    let ul_operator = Kind::unary_operators(Side::Left);
    let b_operator = Kind::binary_operators();
    let ur_operator = Kind::unary_operators(Side::Right);

    // Anything that can start an operand.
    let operand_start = [
        ul_operator.clone(),
        number.clone(),
        open_bracket.clone(),
        constant.clone(),
        function.clone(),
    ]
    .concat();
    // Anything that can follow a finished operand.
    let operand_end = [
        ur_operator.clone(),
        close_bracket.clone(),
        b_operator.clone(),
        separator.clone(),
        vec![Kind::EndAnchor],
    ]
    .concat();
    let unary_after = [
        number.clone(),
        ul_operator.clone(),
        open_bracket.clone(),
        function.clone(),
        constant.clone(),
    ]
    .concat();

    let rules = vec![
        (
            "function",
            Rule::new(function.clone())?.enclosed(vec![], open_bracket.clone()),
        ),
        (
            "separator",
            Rule::new(separator.clone())?.enclosed(vec![], operand_start.clone()),
        ),
        (
            "constant",
            Rule::new(constant.clone())?.enclosed(vec![], operand_end.clone()),
        ),
        (
            "open_bracket",
            Rule::new(open_bracket.clone())?.enclosed(
                vec![],
                [
                    number.clone(),
                    ul_operator.clone(),
                    open_bracket.clone(),
                    constant.clone(),
                    function.clone(),
                ]
                .concat(),
            ),
        ),
        (
            "close_bracket",
            Rule::new(close_bracket.clone())?.enclosed(vec![], operand_end.clone()),
        ),
        (
            "number",
            Rule::new(number.clone())?.enclosed(vec![], operand_end.clone()),
        ),
        (
            "ul_operator",
            Rule::new(ul_operator.clone())?.enclosed(
                [b_operator.clone(), open_bracket.clone(), separator.clone()].concat(),
                unary_after.clone(),
            ),
        ),
        (
            "ul_start_operator",
            Rule::new(ul_operator.clone())?.enclosed(vec![Kind::StartAnchor], unary_after),
        ),
        (
            "b_operator",
            Rule::new(b_operator)?.enclosed(vec![], operand_start),
        ),
        (
            "ur_operator",
            Rule::new(ur_operator.clone())?.enclosed(
                vec![],
                [
                    separator,
                    ur_operator,
                    number,
                    Kind::binary_operators(),
                    close_bracket,
                    vec![Kind::EndAnchor],
                ]
                .concat(),
            ),
        ),
    ];

    Ok(rules
        .into_iter()
        .map(|(name, rule)| (name.to_string(), rule))
        .collect())
}

/// The named subset of [`rules`], keeping registration order. Unknown names
/// are ignored.
pub fn select(names: &[&str]) -> EvalResult<Vec<(String, Rule)>> {
    Ok(rules()?
        .into_iter()
        .filter(|(name, _)| names.contains(&name.as_str()))
        .collect())
}
