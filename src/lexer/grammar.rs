use crate::error::{EvalError, EvalResult};
use crate::lexer::rule::{CompiledRule, Rule};
use crate::tokens::{Kind, Span};
use log::debug;

/// Name of the catch-all rule appended to every compiled grammar.
pub const INVALID_RULE: &str = "invalid";

/// Ordered set of named rules. Re-inserting a name replaces the rule in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grammar {
    rules: Vec<(String, Rule)>,
}

impl Grammar {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Adds or replaces a named rule. Names label match groups, so they must
    /// be identifiers, and `invalid` is reserved for the catch-all.
    pub fn insert(&mut self, name: impl Into<String>, rule: Rule) -> EvalResult<()> {
        let name = name.into();
        validate_name(&name)?;

        match self.rules.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = rule,
            None => self.rules.push((name, rule)),
        }
        Ok(())
    }

    pub fn extend<I, S>(&mut self, rules: I) -> EvalResult<()>
    where
        I: IntoIterator<Item = (S, Rule)>,
        S: Into<String>,
    {
        for (name, rule) in rules {
            self.insert(name, rule)?;
        }
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The composite pattern: every rule as a named group, in insertion
    /// order, followed by the catch-all.
    pub fn pattern(&self) -> String {
        self.with_invalid()
            .iter()
            .map(|(name, rule)| format!("(?P<{}>{})", name, rule.pattern()))
            .collect::<Vec<_>>()
            .join("|")
    }

    /// Freezes the grammar into a matcher. Must be re-run after any change,
    /// since rule contexts refer to other rules' kinds.
    pub fn compile(&self) -> EvalResult<Matcher> {
        let rules = self
            .with_invalid()
            .into_iter()
            .map(|(name, rule)| {
                let compiled = rule.compile()?;
                Ok(MatcherRule {
                    name,
                    identity: rule.identity().to_vec(),
                    compiled,
                })
            })
            .collect::<EvalResult<Vec<_>>>()?;

        debug!("Compiled grammar: {}", self.pattern());
        Ok(Matcher { rules })
    }

    fn with_invalid(&self) -> Vec<(String, Rule)> {
        let mut rules = self.rules.clone();
        rules.push((INVALID_RULE.to_string(), Rule::catch_all()));
        rules
    }
}

fn validate_name(name: &str) -> EvalResult<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid_start || !valid_rest || name == INVALID_RULE {
        return Err(EvalError::InvalidRule(name.to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct MatcherRule {
    name: String,
    identity: Vec<Kind>,
    compiled: CompiledRule,
}

/// One match of the composite pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMatch<'m> {
    pub rule: &'m str,
    /// Kinds registered to the matched rule, in trial order.
    pub identity: &'m [Kind],
    pub text: String,
    pub span: Span,
}

/// A compiled grammar. Immutable, so it can be shared across threads.
#[derive(Debug, Clone)]
pub struct Matcher {
    rules: Vec<MatcherRule>,
}

impl Matcher {
    /// All non-overlapping matches, left to right. At each position the
    /// rules are tried in grammar order and the first one to match wins.
    pub fn find_all<'m>(&'m self, text: &str) -> Vec<RuleMatch<'m>> {
        let mut matches = Vec::new();
        let mut pos = 0;

        while pos < text.len() {
            let found = self.rules.iter().find_map(|rule| {
                rule.compiled
                    .match_at(text, pos)
                    .map(|end| (rule, end))
            });

            match found {
                Some((rule, end)) => {
                    matches.push(RuleMatch {
                        rule: &rule.name,
                        identity: &rule.identity,
                        text: text[pos..end].to_string(),
                        span: Span::new(pos, end),
                    });
                    pos = end;
                }
                None => pos += text[pos..].chars().next().map_or(1, char::len_utf8),
            }
        }

        matches
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.name.as_str())
    }
}
