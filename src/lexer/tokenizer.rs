use crate::error::EvalResult;
use crate::lexer::grammar::{Grammar, Matcher, RuleMatch};
use crate::lexer::rule::Rule;
use crate::tokens::{Kind, Token};
use log::{debug, warn};
use std::fmt;
use std::sync::Arc;

/// A check run over the whole token sequence after matching.
pub type Validator = Arc<dyn Fn(&[Token]) -> EvalResult<()> + Send + Sync>;

/// Splits expressions into tokens according to a [`Grammar`].
#[derive(Clone, Default)]
pub struct Tokenizer {
    grammar: Grammar,
    matcher: Option<Matcher>,
    validators: Vec<(String, Validator)>,
}

impl fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokenizer")
            .field("grammar", &self.grammar)
            .field(
                "validators",
                &self.validators.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Merges `rules` into the grammar and recompiles it. On failure the
    /// tokenizer keeps its previous grammar.
    pub fn set_rules<I, S>(&mut self, rules: I) -> EvalResult<()>
    where
        I: IntoIterator<Item = (S, Rule)>,
        S: Into<String>,
    {
        let mut grammar = self.grammar.clone();
        grammar.extend(rules)?;
        let matcher = grammar.compile()?;

        self.grammar = grammar;
        self.matcher = Some(matcher);
        Ok(())
    }

    /// Replaces the active validators. They run in the given order.
    pub fn set_validators<I, S>(&mut self, validators: I)
    where
        I: IntoIterator<Item = (S, Validator)>,
        S: Into<String>,
    {
        self.validators = validators
            .into_iter()
            .map(|(name, validator)| (name.into(), validator))
            .collect();
    }

    pub fn validator_names(&self) -> impl Iterator<Item = &str> {
        self.validators.iter().map(|(name, _)| name.as_str())
    }

    /// Tokenizes `expression` and runs every validator over the result.
    ///
    /// Whitespace is insignificant and removed before matching, so spans
    /// index into the stripped text.
    pub fn parse(&self, expression: &str) -> EvalResult<Vec<Token>> {
        let text: String = expression.chars().filter(|c| !c.is_whitespace()).collect();

        let tokens = match &self.matcher {
            Some(matcher) => Self::tokenize(matcher, &text)?,
            None => Self::tokenize(&self.grammar.compile()?, &text)?,
        };
        debug!("Tokens: {:?}", tokens);

        for (name, validator) in &self.validators {
            if let Err(e) = validator(&tokens) {
                warn!("Validator '{}' rejected {:?}: {}", name, text, e);
                return Err(e);
            }
        }

        Ok(tokens)
    }

    fn tokenize(matcher: &Matcher, text: &str) -> EvalResult<Vec<Token>> {
        matcher
            .find_all(text)
            .into_iter()
            .map(Self::to_token)
            .collect()
    }

    /// Picks the first kind of the matched rule that accepts the whole lexeme.
    fn to_token(found: RuleMatch<'_>) -> EvalResult<Token> {
        let mut kind = Kind::AnyChar;
        for candidate in found.identity {
            if candidate.accepts(&found.text)? {
                kind = *candidate;
                break;
            }
        }
        Token::new(kind, found.text, found.span)
    }
}
