//! Grammar data model
//!
//! A grammar is an ordered list of named [`Rule`]s. Each rule holds ordered
//! alternatives and each alternative is an ordered list of [`Symbol`]s, its
//! phases. Rules are plain data: the front-ends in [`crate::dialects`] produce
//! them, [`table::RuleTable`] validates them and the parser walks them.
//!
//! Naming conventions carry meaning:
//!     `%Name`          helper rule, never appears in a finished tree
//!     `UPPER_SNAKE`    internal rule, stripped from trees unless asked to keep
//!     `EOF`            reserved end-of-input pseudo-terminal

pub mod descriptor;
pub mod table;
pub mod terminal;

pub use descriptor::{Descriptor, Lookahead, Repetition};
pub use table::{ConstructionError, Problem, RuleTable};
pub use terminal::{decode_literal, quote_literal, Terminal, TerminalMatch};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Name of the reserved end-of-input pseudo-terminal
pub const EOF: &str = "EOF";

static INTERNAL_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9_]+$").unwrap());

/// True for `%`-prefixed helper rule names
pub fn is_fragment_name(name: &str) -> bool {
    name.starts_with('%')
}

/// True for all-uppercase internal rule names such as `WS` or `RULE_EOL`
pub fn is_internal_name(name: &str) -> bool {
    INTERNAL_NAME.is_match(name)
}

/// Error raised when a regular-expression terminal does not compile
#[derive(Debug, Clone, PartialEq)]
pub struct PatternError {
    pub pattern: String,
    pub message: String,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid pattern /{}/: {}", self.pattern, self.message)
    }
}

impl std::error::Error for PatternError {}

/// A regular-expression terminal
///
/// The expression is compiled anchored, so it only ever matches at the cursor.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, PatternError> {
        let regex = Regex::new(&format!("^(?:{source})")).map_err(|e| PatternError {
            pattern: source.to_string(),
            message: e.to_string(),
        })?;
        Ok(Pattern {
            source: source.to_string(),
            regex,
        })
    }

    /// The expression as written, without the anchor
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Length in bytes of the match at the start of `input`.
    ///
    /// A zero-length match of a non-empty expression counts as no match.
    pub fn match_len(&self, input: &str) -> Option<usize> {
        let found = self.regex.find(input)?;
        if found.end() == 0 && !self.source.is_empty() {
            return None;
        }
        Some(found.end())
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.source)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(&source).map_err(serde::de::Error::custom)
    }
}

/// One phase of an alternative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbol {
    /// An exact string, already decoded. The empty string is a zero-width match.
    Literal(String),
    /// A regular-expression terminal
    Pattern(Pattern),
    /// A possibly decorated reference to a rule, `EOF` or a quoted literal
    Reference(Descriptor),
}

impl Symbol {
    /// Parse grammar notation: `Name`, `Name*`, `!Name`, `"lit"`, `'lit'+`.
    ///
    /// Undecorated quoted text becomes a [`Symbol::Literal`]; decorated quoted
    /// text stays a reference so its decoration survives.
    pub fn parse(raw: &str) -> Self {
        let descriptor = Descriptor::parse(raw);
        if descriptor.is_literal() && descriptor.is_plain() {
            return Symbol::Literal(decode_literal(&descriptor.name));
        }
        Symbol::Reference(descriptor)
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Symbol::Literal(value.into())
    }

    pub fn pattern(source: &str) -> Result<Self, PatternError> {
        Pattern::new(source).map(Symbol::Pattern)
    }

    /// The descriptor of a reference, `None` for raw terminals
    pub fn descriptor(&self) -> Option<&Descriptor> {
        match self {
            Symbol::Reference(descriptor) => Some(descriptor),
            _ => None,
        }
    }

    /// Name of the referenced rule, if this symbol refers to one
    pub fn rule_name(&self) -> Option<&str> {
        self.descriptor()
            .filter(|d| !d.is_literal())
            .map(|d| d.name.as_str())
    }
}

impl From<&str> for Symbol {
    fn from(raw: &str) -> Self {
        Symbol::parse(raw)
    }
}

impl From<Pattern> for Symbol {
    fn from(pattern: Pattern) -> Self {
        Symbol::Pattern(pattern)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Literal(value) => write!(f, "{}", quote_literal(value)),
            Symbol::Pattern(pattern) => write!(f, "/{}/", pattern.as_str()),
            Symbol::Reference(descriptor) => write!(f, "{descriptor}"),
        }
    }
}

/// Build one alternative from grammar notation and patterns
///
///     symbols!["\"(\"", "Expr*", Pattern::new("[a-z]+")?, "\")\""]
#[macro_export]
macro_rules! symbols {
    ($($symbol:expr),* $(,)?) => {
        vec![$($crate::grammar::Symbol::from($symbol)),*]
    };
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A named production
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub alternatives: Vec<Vec<Symbol>>,
    /// Rule to synchronize on when a required phase fails
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recover_to: Option<String>,
    /// Never materialized; children are spliced into the caller
    #[serde(default, skip_serializing_if = "is_false")]
    pub fragment: bool,
    /// 1-based phase index that commits the alternative
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_at: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implicit_whitespace: Option<bool>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub collapse_single_child: bool,
}

impl Rule {
    pub fn new(name: impl Into<String>, alternatives: Vec<Vec<Symbol>>) -> Self {
        Rule {
            name: name.into(),
            alternatives,
            recover_to: None,
            fragment: false,
            pin_at: None,
            implicit_whitespace: None,
            collapse_single_child: false,
        }
    }

    pub fn as_fragment(mut self) -> Self {
        self.fragment = true;
        self
    }

    pub fn with_pin(mut self, phase: usize) -> Self {
        self.pin_at = Some(phase);
        self
    }

    pub fn with_recovery(mut self, target: impl Into<String>) -> Self {
        self.recover_to = Some(target.into());
        self
    }

    pub fn with_implicit_whitespace(mut self, implicit: bool) -> Self {
        self.implicit_whitespace = Some(implicit);
        self
    }

    pub fn collapsing(mut self) -> Self {
        self.collapse_single_child = true;
        self
    }

    /// Whether the parser may pick this rule as the default entry point
    pub fn is_entry_candidate(&self) -> bool {
        !self.fragment && !is_fragment_name(&self.name)
    }
}
