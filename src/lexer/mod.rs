mod grammar;
mod rule;
mod tokenizer;

pub use grammar::{Grammar, Matcher, RuleMatch, INVALID_RULE};
pub use rule::Rule;
pub use tokenizer::{Tokenizer, Validator};
