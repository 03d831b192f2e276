use crate::defaults;
use crate::error::{EvalError, EvalResult};
use crate::lexer::{Rule, Tokenizer, Validator};
use crate::options::EvalOptions;
use crate::rpn::{Compiler, Executor};
use crate::tokens::Token;
use crate::validators;
use log::debug;
use lru::LruCache;
use rayon::prelude::*;
use std::num::NonZeroUsize;

/// One saved evaluation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HistoryEntry {
    pub expression: String,
    pub result: String,
}

/// Evaluates expressions with its own grammar, validators and history.
///
/// A fresh calculator knows no rules, so everything it reads is
/// unrecognized; use [`Calculator::with_defaults`] for the standard grammar.
#[derive(Debug)]
pub struct Calculator {
    tokenizer: Tokenizer,
    history: Vec<HistoryEntry>,
    cache: Option<LruCache<String, Vec<Token>>>,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    pub fn new() -> Self {
        Self {
            tokenizer: Tokenizer::new(),
            history: Vec::new(),
            cache: None,
        }
    }

    /// A calculator with every default rule and both default validators.
    pub fn with_defaults() -> EvalResult<Self> {
        let mut calculator = Self::new();
        calculator.set_rules(defaults::rules()?)?;
        calculator.set_validators(validators::default_validators());
        Ok(calculator)
    }

    /// Keeps the postfix form of up to `capacity` recent expressions so that
    /// repeated evaluations skip tokenizing. Zero disables the cache.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = NonZeroUsize::new(capacity).map(LruCache::new);
        self
    }

    /// Merges `rules` into the grammar and recompiles it.
    pub fn set_rules<I, S>(&mut self, rules: I) -> EvalResult<()>
    where
        I: IntoIterator<Item = (S, Rule)>,
        S: Into<String>,
    {
        self.tokenizer.set_rules(rules)?;
        self.clear_cache();
        Ok(())
    }

    /// Replaces the validators run after tokenizing.
    pub fn set_validators<I, S>(&mut self, validators: I)
    where
        I: IntoIterator<Item = (S, Validator)>,
        S: Into<String>,
    {
        self.tokenizer.set_validators(validators);
        self.clear_cache();
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Saved evaluations, newest first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Evaluates `expression`, rounding the result to 15 decimal places.
    ///
    /// With `save`, a successful evaluation is put at the front of the
    /// history. Failures leave history untouched.
    pub fn evaluate(
        &mut self,
        expression: &str,
        save: bool,
        options: &EvalOptions,
    ) -> EvalResult<f64> {
        debug!("Evaluating {:?}", expression);

        let cached = self
            .cache
            .as_mut()
            .and_then(|cache| cache.get(expression).cloned());
        let rpn = match cached {
            Some(rpn) => rpn,
            None => {
                let rpn = self.compile(expression)?;
                if let Some(cache) = self.cache.as_mut() {
                    cache.put(expression.to_string(), rpn.clone());
                }
                rpn
            }
        };

        let result = round(Executor::eval_rpn(&rpn, options)?);

        if save {
            self.history.insert(
                0,
                HistoryEntry {
                    expression: expression.to_string(),
                    result: stringify(result),
                },
            );
        }
        Ok(result)
    }

    /// Like [`Calculator::evaluate`], for raw input that may not be text.
    pub fn evaluate_bytes(
        &mut self,
        expression: &[u8],
        save: bool,
        options: &EvalOptions,
    ) -> EvalResult<f64> {
        let expression = std::str::from_utf8(expression)
            .map_err(|e| EvalError::InvalidInputType(format!("expression is not text: {}", e)))?;
        self.evaluate(expression, save, options)
    }

    /// Evaluates independent expressions in parallel. Neither history nor
    /// the cache is used.
    pub fn evaluate_batch<S>(&self, expressions: &[S], options: &EvalOptions) -> Vec<EvalResult<f64>>
    where
        S: AsRef<str> + Sync,
    {
        expressions
            .par_iter()
            .map(|expression| -> EvalResult<f64> {
                let rpn = self.compile(expression.as_ref())?;
                Ok(round(Executor::eval_rpn(&rpn, options)?))
            })
            .collect()
    }

    fn compile(&self, expression: &str) -> EvalResult<Vec<Token>> {
        let tokens = self.tokenizer.parse(expression)?;
        Compiler::to_rpn(&tokens)
    }

    fn clear_cache(&mut self) {
        if let Some(cache) = self.cache.as_mut() {
            cache.clear();
        }
    }
}

/// Absorbs floating point noise such as `0.1 + 0.2`.
fn round(value: f64) -> f64 {
    format!("{:.15}", value).parse().unwrap_or(value)
}

/// Shortest text that reads back as `value`, without a trailing `.0`.
/// Exponents carry a sign and at least two digits, as in `1e+21`.
fn stringify(value: f64) -> String {
    let text = format!("{:?}", value);
    if let Some((mantissa, exponent)) = text.split_once('e') {
        if let Ok(exponent) = exponent.parse::<i32>() {
            let sign = if exponent < 0 { '-' } else { '+' };
            return format!("{}e{}{:02}", mantissa, sign, exponent.abs());
        }
    }
    match text.strip_suffix(".0") {
        Some(whole) => whole.to_string(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{E, PI};
    use std::sync::Arc;

    fn calculator() -> Calculator {
        Calculator::with_defaults().unwrap()
    }

    fn eval(expression: &str) -> EvalResult<f64> {
        calculator().evaluate(expression, false, &EvalOptions::new())
    }

    fn assert_approx(expression: &str, expected: f64) {
        let result = eval(expression).unwrap();
        assert!(
            (result - expected).abs() < 1e-9,
            "{} = {}, expected {}",
            expression,
            result,
            expected
        );
    }

    #[test]
    fn test_operator_precedence() {
        assert_eq!(eval("3^4").unwrap(), 81.0);
        assert_eq!(eval("2*5").unwrap(), 10.0);
        assert_eq!(eval("11%3").unwrap(), 2.0);
        assert_eq!(eval("2+3*4").unwrap(), 14.0);
        assert_eq!(eval("10-4-3").unwrap(), 3.0);
        assert_eq!(eval("2^3^2").unwrap(), 512.0);
    }

    #[test]
    fn test_unary_chains() {
        assert_eq!(eval("--3").unwrap(), 3.0);
        assert_eq!(eval("3!!").unwrap(), 720.0);
        assert_eq!(eval("-3^2").unwrap(), -9.0);
        assert_eq!(eval("2^-1").unwrap(), 0.5);
        assert_eq!(eval("2--3").unwrap(), 5.0);
        assert_eq!(eval("-2!").unwrap(), -2.0);
    }

    #[test]
    fn test_brackets() {
        assert_eq!(eval("(2-(-5/2)*4)^2").unwrap(), 144.0);
        assert_eq!(eval("[1+2]*{3}").unwrap(), 9.0);
        assert_eq!(eval("(2 - (-5/2) * 4)^2").unwrap(), 144.0);
    }

    #[test]
    fn test_functions() {
        assert_eq!(eval("add(8)").unwrap(), 8.0);
        assert_eq!(eval("pow(3)").unwrap(), 9.0);
        assert_eq!(eval("root(16)").unwrap(), 4.0);
        assert_eq!(eval("root(27,3)").unwrap(), 3.0);
        assert_eq!(eval("sub(10,1,2)").unwrap(), 7.0);
        assert_eq!(eval("fdiv(7.5)").unwrap(), 7.0);
        assert_eq!(eval("fdiv(7,2)").unwrap(), 3.0);
        assert_eq!(eval("max(1,min(5,3),2)").unwrap(), 3.0);
        assert_eq!(eval("log(100)").unwrap(), 2.0);
        assert_eq!(eval("log(8,2)").unwrap(), 3.0);
        assert_eq!(eval("ln(e)").unwrap(), 1.0);
        assert_eq!(eval("MOD(-7,3)").unwrap(), 2.0);
    }

    #[test]
    fn test_compound_expressions() {
        assert_approx("2*pi", 2.0 * PI);
        assert_approx("e^2", E * E);
        assert_approx("sin(30)+cos(60)", 1.0);
        assert_approx("add(1,2)*mul(2,3)-div(8,4)", 16.0);
        assert_approx("pow(2,3)!", 40320.0);
        assert_approx("-(3+4)*2", -14.0);
        assert_approx("max(1,-2,3!)", 6.0);
        assert_approx("1.5e+2/3", 50.0);
    }

    #[test]
    fn test_argument_validation() {
        assert!(matches!(
            eval("sin(7,6)"),
            Err(EvalError::Separator { .. }) | Err(EvalError::ArgumentCount { .. })
        ));
        assert!(eval("sin").is_err());
        assert!(eval("sub()").is_err());
        assert!(eval("add(2,)").is_err());
        assert!(matches!(eval("(1,2)"), Err(EvalError::Separator { .. })));
    }

    #[test]
    fn test_unrecognized_input() {
        assert!(matches!(
            eval("token"),
            Err(EvalError::UnrecognizedToken { .. })
        ));
        assert!(matches!(
            eval("2+"),
            Err(EvalError::UnrecognizedToken { .. })
        ));
        assert!(matches!(
            Calculator::new().evaluate("1+1", false, &EvalOptions::new()),
            Err(EvalError::UnrecognizedToken { .. })
        ));
    }

    #[test]
    fn test_calculation_errors() {
        assert!(matches!(eval("1/0"), Err(EvalError::Calculation { .. })));
        assert!(matches!(eval("ln(0)"), Err(EvalError::Calculation { .. })));
    }

    #[test]
    fn test_empty_expression_is_saved() {
        let mut calculator = calculator();
        assert_eq!(calculator.evaluate("", true, &EvalOptions::new()).unwrap(), 0.0);
        assert_eq!(
            calculator.history(),
            &[HistoryEntry {
                expression: String::new(),
                result: "0".to_string(),
            }]
        );
    }

    #[test]
    fn test_history_newest_first() {
        let mut calculator = calculator();
        let options = EvalOptions::new();
        calculator.evaluate("1+1", true, &options).unwrap();
        calculator.evaluate("5/2", false, &options).unwrap();
        calculator.evaluate("2+2", true, &options).unwrap();
        calculator.evaluate("1/4", true, &options).unwrap();
        assert!(calculator.evaluate("1+", true, &options).is_err());

        let history: Vec<_> = calculator
            .history()
            .iter()
            .map(|entry| (entry.expression.as_str(), entry.result.as_str()))
            .collect();
        assert_eq!(history, vec![("1/4", "0.25"), ("2+2", "4"), ("1+1", "2")]);

        calculator.clear_history();
        assert!(calculator.history().is_empty());
    }

    #[test]
    fn test_rounding() {
        assert_eq!(eval("0.1+0.2").unwrap(), 0.3);
        assert_eq!(eval("sin(180)").unwrap(), 0.0);
    }

    #[test]
    fn test_idempotence() {
        let mut calculator = calculator().with_cache_capacity(4);
        let options = EvalOptions::new();
        let first = calculator.evaluate("root(2)*pi", false, &options).unwrap();
        for _ in 0..3 {
            assert_eq!(calculator.evaluate("root(2)*pi", false, &options).unwrap(), first);
        }
    }

    #[test]
    fn test_degrees_and_radians() {
        let mut calculator = calculator();
        let result = calculator.evaluate("sin(30)", false, &EvalOptions::new()).unwrap();
        assert!((result - 0.5).abs() < 1e-12);

        let rad = EvalOptions::new().with("rad", true);
        let result = calculator.evaluate("sin(1)", false, &rad).unwrap();
        assert!((result - 0.84147).abs() < 1e-5);

        let result = calculator.evaluate("tan(45)", false, &EvalOptions::new()).unwrap();
        assert!((result - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_partial_grammar() {
        let mut calculator = Calculator::new();
        calculator
            .set_rules(defaults::select(&["number", "b_operator"]).unwrap())
            .unwrap();
        let options = EvalOptions::new();
        assert_eq!(calculator.evaluate("4*5+8%4", true, &options).unwrap(), 20.0);
        assert_eq!(calculator.evaluate("2.3", true, &options).unwrap(), 2.3);
        assert!(calculator.evaluate("(1)", false, &options).is_err());

        let mut calculator = Calculator::new();
        calculator
            .set_rules(defaults::select(&["constant"]).unwrap())
            .unwrap();
        assert_eq!(calculator.evaluate("pi", false, &options).unwrap(), PI);
        assert_eq!(calculator.evaluate("E", false, &options).unwrap(), E);
    }

    #[test]
    fn test_cache_follows_grammar_changes() {
        let mut calculator = Calculator::new().with_cache_capacity(8);
        calculator
            .set_rules(defaults::select(&["number", "b_operator"]).unwrap())
            .unwrap();
        let options = EvalOptions::new();
        assert_eq!(calculator.evaluate("2*3", false, &options).unwrap(), 6.0);

        let reject: Validator = Arc::new(|_: &[Token]| Err(EvalError::EmptyRule));
        calculator.set_validators([("reject", reject)]);
        assert_eq!(
            calculator.evaluate("2*3", false, &options),
            Err(EvalError::EmptyRule)
        );
    }

    #[test]
    fn test_evaluate_bytes() {
        let mut calculator = calculator();
        let options = EvalOptions::new();
        assert_eq!(calculator.evaluate_bytes(b"6/4", true, &options).unwrap(), 1.5);
        assert!(matches!(
            calculator.evaluate_bytes(&[0xff, 0xfe], true, &options),
            Err(EvalError::InvalidInputType(_))
        ));
        assert_eq!(calculator.history().len(), 1);
    }

    #[test]
    fn test_evaluate_batch() {
        let calculator = calculator();
        let results = calculator.evaluate_batch(&["1+1", "3!", "sin", ""], &EvalOptions::new());
        assert_eq!(results[0], Ok(2.0));
        assert_eq!(results[1], Ok(6.0));
        assert!(results[2].is_err());
        assert_eq!(results[3], Ok(0.0));
        assert!(calculator.history().is_empty());
    }

    #[test]
    fn test_stringify() {
        assert_eq!(stringify(2.0), "2");
        assert_eq!(stringify(2.5), "2.5");
        assert_eq!(stringify(-0.25), "-0.25");
        assert_eq!(stringify(100.0), "100");
    }

    #[test]
    fn test_stringify_exponents() {
        assert_eq!(stringify(1e21), "1e+21");
        assert_eq!(stringify(1e16), "1e+16");
        assert_eq!(stringify(1e-7), "1e-07");
        assert_eq!(stringify(-2.5e-5), "-2.5e-05");
        assert_eq!(stringify(1.5e100), "1.5e+100");
        assert_eq!(stringify(0.0001), "0.0001");
    }

    #[test]
    fn test_history_exponent_text() {
        let mut calculator = calculator();
        let options = EvalOptions::new();
        calculator
            .evaluate("1000000000000000000000", true, &options)
            .unwrap();
        calculator.evaluate("0.0000001", true, &options).unwrap();

        let results: Vec<_> = calculator
            .history()
            .iter()
            .map(|entry| entry.result.as_str())
            .collect();
        assert_eq!(results, vec!["1e-07", "1e+21"]);
    }
}
