use crate::error::{EvalError, EvalResult};
use crate::tokens::Kind;
use regex::{Regex, RegexBuilder};

/// A group of token kinds recognised together, optionally constrained by the
/// kinds that must appear right before (`before`) or right after (`after`)
/// the match. Context is checked but never consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    identity: Vec<Kind>,
    before: Vec<Kind>,
    after: Vec<Kind>,
}

impl Rule {
    /// Builds a rule whose alternatives are ordered longest pattern first,
    /// so `FDIV` is tried before `DIV`. Ties keep their given order.
    pub fn new(identity: Vec<Kind>) -> EvalResult<Self> {
        let mut rule = Self::unsorted(identity)?;
        rule.identity
            .sort_by(|a, b| b.pattern().len().cmp(&a.pattern().len()));
        Ok(rule)
    }

    /// Builds a rule that tries its alternatives in the given order.
    pub fn unsorted(identity: Vec<Kind>) -> EvalResult<Self> {
        if identity.is_empty() {
            return Err(EvalError::EmptyRule);
        }
        Ok(Self {
            identity,
            before: Vec::new(),
            after: Vec::new(),
        })
    }

    /// Matches whatever is left of the input.
    pub(crate) fn catch_all() -> Self {
        Self {
            identity: vec![Kind::AnyChar],
            before: Vec::new(),
            after: Vec::new(),
        }
    }

    /// Sets the lookbehind and lookahead kinds, replacing earlier ones.
    pub fn enclose(&mut self, before: Vec<Kind>, after: Vec<Kind>) {
        self.before = before;
        self.after = after;
    }

    /// Builder form of [`Rule::enclose`].
    pub fn enclosed(mut self, before: Vec<Kind>, after: Vec<Kind>) -> Self {
        self.enclose(before, after);
        self
    }

    pub fn identity(&self) -> &[Kind] {
        &self.identity
    }

    pub fn before(&self) -> &[Kind] {
        &self.before
    }

    pub fn after(&self) -> &[Kind] {
        &self.after
    }

    /// The rule as one lookaround regex, e.g. `(?<=ADD|DIV)(PI|E)(?=DIV)`.
    pub fn pattern(&self) -> String {
        let mut pattern = String::new();
        if !self.before.is_empty() {
            pattern.push_str(&format!("(?<={})", alternation(&self.before)));
        }
        pattern.push_str(&format!("({})", alternation(&self.identity)));
        if !self.after.is_empty() {
            pattern.push_str(&format!("(?={})", alternation(&self.after)));
        }
        pattern
    }

    pub(crate) fn compile(&self) -> EvalResult<CompiledRule> {
        let identity = self
            .identity
            .iter()
            .map(|kind| {
                Ok(Alternative {
                    prefix: build(&format!(r"\A(?:{})", kind.pattern()))?,
                    whole: build(&format!(r"\A(?:{})\z", kind.pattern()))?,
                })
            })
            .collect::<EvalResult<Vec<_>>>()?;

        let before = if self.before.is_empty() {
            None
        } else {
            Some(build(&format!(r"(?:{})\z", alternation(&self.before)))?)
        };
        let after = if self.after.is_empty() {
            None
        } else {
            Some(build(&format!(r"\A(?:{})", alternation(&self.after)))?)
        };

        Ok(CompiledRule {
            identity,
            before,
            after,
        })
    }
}

fn alternation(kinds: &[Kind]) -> String {
    kinds
        .iter()
        .map(Kind::pattern)
        .collect::<Vec<_>>()
        .join("|")
}

fn build(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .ignore_whitespace(true)
        .build()
}

/// One identity kind: its preferred match at a position, and a full-match
/// check for shorter candidates.
#[derive(Debug, Clone)]
struct Alternative {
    prefix: Regex,
    whole: Regex,
}

/// Matchers for one rule: an anchored regex pair per identity kind plus
/// end-anchored (lookbehind) and start-anchored (lookahead) context checks.
#[derive(Debug, Clone)]
pub(crate) struct CompiledRule {
    identity: Vec<Alternative>,
    before: Option<Regex>,
    after: Option<Regex>,
}

impl CompiledRule {
    /// End offset of this rule's match starting exactly at `pos`, if any.
    ///
    /// Alternatives are tried in order. Within one alternative the preferred
    /// match is tried first, then every shorter lexeme of the same kind,
    /// longest first, until one is followed by an allowed context. Empty
    /// matches never count.
    pub(crate) fn match_at(&self, text: &str, pos: usize) -> Option<usize> {
        if let Some(before) = &self.before {
            if !before.is_match(&text[..pos]) {
                return None;
            }
        }

        self.identity.iter().find_map(|alternative| {
            let found = alternative.prefix.find(&text[pos..])?;
            if found.end() == 0 {
                return None;
            }
            let end = pos + found.end();
            let after = match &self.after {
                Some(after) => after,
                None => return Some(end),
            };
            if after.is_match(&text[end..]) {
                return Some(end);
            }

            text[pos..end]
                .char_indices()
                .rev()
                .filter(|&(offset, _)| offset != 0)
                .map(|(offset, _)| pos + offset)
                .find(|&shorter| {
                    alternative.whole.is_match(&text[pos..shorter])
                        && after.is_match(&text[shorter..])
                })
        })
    }
}
