use std::collections::HashMap;

/// A single option value passed along to operators during evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl OptionValue {
    /// Helper to get a boolean or return an error
    pub fn as_bool(&self) -> Result<bool, String> {
        if let OptionValue::Bool(value) = self {
            Ok(*value)
        } else {
            Err("Expected a Bool option".to_string())
        }
    }

    /// Helper to get a number or return an error
    pub fn as_number(&self) -> Result<f64, String> {
        if let OptionValue::Number(value) = self {
            Ok(*value)
        } else {
            Err("Expected a Number option".to_string())
        }
    }

    /// Helper to get a string or return an error
    pub fn as_text(&self) -> Result<&str, String> {
        if let OptionValue::Text(value) = self {
            Ok(value)
        } else {
            Err("Expected a Text option".to_string())
        }
    }

    /// Loose truthiness: missing-or-false-like values read as `false`.
    pub fn is_truthy(&self) -> bool {
        match self {
            OptionValue::Bool(value) => *value,
            OptionValue::Number(value) => *value != 0.0,
            OptionValue::Text(value) => !value.is_empty(),
        }
    }
}

/// Options for one `evaluate` call, e.g. `rad` for trigonometric functions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvalOptions {
    pub(crate) options: HashMap<String, OptionValue>,
}

impl EvalOptions {
    /// Creates a new empty EvalOptions instance
    pub fn new() -> Self {
        Self {
            options: HashMap::new(),
        }
    }

    /// Builder-style insert.
    pub fn with<T: Into<OptionValue>>(mut self, key: &str, value: T) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts a key-value pair into the options
    pub fn insert<T: Into<OptionValue>>(&mut self, key: &str, value: T) {
        self.options.insert(key.to_string(), value.into());
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, String> {
        self.options
            .get(key)
            .ok_or_else(|| format!("Missing option: {}", key))?
            .as_bool()
    }

    pub fn get_number(&self, key: &str) -> Result<f64, String> {
        self.options
            .get(key)
            .ok_or_else(|| format!("Missing option: {}", key))?
            .as_number()
    }

    pub fn get_text(&self, key: &str) -> Result<&str, String> {
        self.options
            .get(key)
            .ok_or_else(|| format!("Missing option: {}", key))?
            .as_text()
    }

    /// Reads a switch-like option; absent keys are `false`.
    pub fn flag(&self, key: &str) -> bool {
        self.options.get(key).is_some_and(OptionValue::is_truthy)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Number(value)
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}
