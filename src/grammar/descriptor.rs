//! Symbol descriptors
//!
//! A rule reference inside an alternative may carry one trailing decoration
//! (`?`, `*`, `+`) and one leading decoration (`&`, `!`, `@`). The descriptor
//! is the parsed form of such a reference.
//!
//!     Name      exactly once
//!     Name?     optional
//!     Name*     zero or more
//!     Name+     one or more
//!     &Name     positive lookahead, consumes nothing
//!     !Name     negative lookahead, consumes nothing
//!     @Name     pin marker, commits the alternative once it matches
//!
//! A name starting with a quote character refers to a literal instead of a rule.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How many times a phase may match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Repetition {
    #[default]
    Once,
    Optional,
    ZeroOrMore,
    OneOrMore,
}

impl Repetition {
    fn suffix(self) -> &'static str {
        match self {
            Repetition::Once => "",
            Repetition::Optional => "?",
            Repetition::ZeroOrMore => "*",
            Repetition::OneOrMore => "+",
        }
    }
}

/// Lookahead mode of a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lookahead {
    #[default]
    None,
    Positive,
    Negative,
}

/// A parsed, possibly decorated, symbol reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Descriptor {
    pub name: String,
    pub repetition: Repetition,
    pub lookahead: Lookahead,
    pub pin: bool,
}

impl Descriptor {
    /// Parse a raw reference such as `Foo*`, `&Bar`, `!"x"` or `@Baz`.
    pub fn parse(raw: &str) -> Self {
        let (repetition, rest) = match raw.chars().last() {
            Some('?') => (Repetition::Optional, &raw[..raw.len() - 1]),
            Some('*') => (Repetition::ZeroOrMore, &raw[..raw.len() - 1]),
            Some('+') => (Repetition::OneOrMore, &raw[..raw.len() - 1]),
            _ => (Repetition::Once, raw),
        };

        let (lookahead, pin, name) = match rest.chars().next() {
            Some('&') => (Lookahead::Positive, false, &rest[1..]),
            Some('!') => (Lookahead::Negative, false, &rest[1..]),
            Some('@') => (Lookahead::None, true, &rest[1..]),
            _ => (Lookahead::None, false, rest),
        };

        Descriptor {
            name: name.to_string(),
            repetition,
            lookahead,
            pin,
        }
    }

    /// An undecorated reference to `name`
    pub fn plain(name: impl Into<String>) -> Self {
        Descriptor {
            name: name.into(),
            repetition: Repetition::Once,
            lookahead: Lookahead::None,
            pin: false,
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(
            self.repetition,
            Repetition::Optional | Repetition::ZeroOrMore
        )
    }

    pub fn allows_repetition(&self) -> bool {
        matches!(
            self.repetition,
            Repetition::ZeroOrMore | Repetition::OneOrMore
        )
    }

    pub fn requires_at_least_one(&self) -> bool {
        self.repetition == Repetition::OneOrMore
    }

    pub fn is_positive_lookahead(&self) -> bool {
        self.lookahead == Lookahead::Positive
    }

    pub fn is_negative_lookahead(&self) -> bool {
        self.lookahead == Lookahead::Negative
    }

    pub fn is_lookahead(&self) -> bool {
        self.lookahead != Lookahead::None
    }

    /// True when the name is a quoted literal rather than a rule name
    pub fn is_literal(&self) -> bool {
        self.name.starts_with('"') || self.name.starts_with('\'')
    }

    /// True when the reference carries no decoration at all
    pub fn is_plain(&self) -> bool {
        self.repetition == Repetition::Once && self.lookahead == Lookahead::None && !self.pin
    }

    /// Leading decoration as written in grammar text
    pub fn prefix(&self) -> &'static str {
        match (self.lookahead, self.pin) {
            (Lookahead::Positive, _) => "&",
            (Lookahead::Negative, _) => "!",
            (Lookahead::None, true) => "@",
            (Lookahead::None, false) => "",
        }
    }

    /// Trailing decoration as written in grammar text
    pub fn suffix(&self) -> &'static str {
        self.repetition.suffix()
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.prefix(), self.name, self.suffix())
    }
}

impl From<String> for Descriptor {
    fn from(raw: String) -> Self {
        Descriptor::parse(&raw)
    }
}

impl From<Descriptor> for String {
    fn from(descriptor: Descriptor) -> Self {
        descriptor.to_string()
    }
}
