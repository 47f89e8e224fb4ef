//! Format registry for rule table serialization
//!
//! Each output format implements [`Formatter`] and is registered by name with
//! [`FormatRegistry`]. The CLI `compile` command looks formats up here.

use crate::dialects::{custom, w3c};
use crate::grammar::Rule;
use std::collections::HashMap;
use std::fmt;

/// Error that can occur during formatting
#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    /// Format not found in registry
    FormatNotFound(String),
    /// Error during serialization
    SerializationError(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::FormatNotFound(name) => write!(f, "Format '{name}' not found"),
            FormatError::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
        }
    }
}

impl std::error::Error for FormatError {}

/// Trait for rule table formatters
pub trait Formatter: Send + Sync {
    /// The name of this format (e.g., "json", "ebnf")
    fn name(&self) -> &str;

    fn serialize(&self, rules: &[Rule]) -> Result<String, FormatError>;

    fn description(&self) -> &str {
        ""
    }
}

/// Rules as pretty-printed JSON
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn serialize(&self, rules: &[Rule]) -> Result<String, FormatError> {
        serde_json::to_string_pretty(rules).map_err(|e| FormatError::SerializationError(e.to_string()))
    }

    fn description(&self) -> &str {
        "Rule table as JSON, loadable with serde"
    }
}

pub struct YamlFormatter;

impl Formatter for YamlFormatter {
    fn name(&self) -> &str {
        "yaml"
    }

    fn serialize(&self, rules: &[Rule]) -> Result<String, FormatError> {
        serde_yaml::to_string(rules).map_err(|e| FormatError::SerializationError(e.to_string()))
    }

    fn description(&self) -> &str {
        "Rule table as YAML"
    }
}

/// Attributed EBNF, the lossless text form
pub struct EbnfFormatter;

impl Formatter for EbnfFormatter {
    fn name(&self) -> &str {
        "ebnf"
    }

    fn serialize(&self, rules: &[Rule]) -> Result<String, FormatError> {
        Ok(custom::emit(rules))
    }

    fn description(&self) -> &str {
        "Attributed EBNF with pins, recovery and whitespace attributes"
    }
}

pub struct W3cFormatter;

impl Formatter for W3cFormatter {
    fn name(&self) -> &str {
        "w3c"
    }

    fn serialize(&self, rules: &[Rule]) -> Result<String, FormatError> {
        Ok(w3c::emit(rules))
    }

    fn description(&self) -> &str {
        "W3C EBNF; parser attributes are dropped"
    }
}

/// Registry of rule table formatters
pub struct FormatRegistry {
    formatters: HashMap<String, Box<dyn Formatter>>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        FormatRegistry {
            formatters: HashMap::new(),
        }
    }

    /// Register a formatter, replacing any with the same name
    pub fn register<F: Formatter + 'static>(&mut self, formatter: F) {
        self.formatters
            .insert(formatter.name().to_string(), Box::new(formatter));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Formatter> {
        self.formatters.get(name).map(|f| f.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.formatters.contains_key(name)
    }

    /// Serialize rules using the named format
    pub fn serialize(&self, rules: &[Rule], format: &str) -> Result<String, FormatError> {
        let formatter = self
            .get(format)
            .ok_or_else(|| FormatError::FormatNotFound(format.to_string()))?;
        formatter.serialize(rules)
    }

    /// All format names, sorted
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formatters.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(JsonFormatter);
        registry.register(YamlFormatter);
        registry.register(EbnfFormatter);
        registry.register(W3cFormatter);
        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
