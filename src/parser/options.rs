//! Parser configuration
//!
//! Options are plain serde data so they can be loaded from a YAML or JSON
//! config file:
//!
//!     keep-upper-rules: true
//!     whitespace-rule: WS
//!     max-depth: 512

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ParserOptions {
    /// Keep `UPPER_SNAKE` nodes in the finished tree
    pub keep_upper_rules: bool,
    /// Rule injected between phases of rules with implicit whitespace
    pub whitespace_rule: String,
    /// Deepest rule nesting a match may reach; unbounded when `None`
    pub max_depth: Option<usize>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            keep_upper_rules: false,
            whitespace_rule: "WS".to_string(),
            max_depth: None,
        }
    }
}

impl ParserOptions {
    pub fn keep_upper_rules(mut self, keep: bool) -> Self {
        self.keep_upper_rules = keep;
        self
    }

    pub fn whitespace_rule(mut self, name: impl Into<String>) -> Self {
        self.whitespace_rule = name.into();
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Read options from YAML (or JSON) text
    pub fn from_config_str(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| ConfigError(e.to_string()))
    }
}

/// A config file could not be read as [`ParserOptions`]
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid parser configuration: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}
