//! Grammar front-ends
//!
//! Each dialect compiles grammar text into the rule table the parser runs.
//! The dialects are themselves grammars: every module exposes its meta rule
//! table as `RULES`, parses the source with it and walks the resulting tree.
//!
//!     bnf      <name> ::= <other> "literal" | ...
//!     w3c      Name ::= Other "literal"* [a-z]+ (Group | #x20)?
//!     custom   w3c plus { pin=1, recoverUntil=X, ws=implicit, ... } attributes
//!
//! All three share the same entry points: `get_rules(source)`,
//! `parser(source, options)`; `w3c` and `custom` can also `emit` a rule table
//! back as grammar text.

pub mod bnf;
pub mod custom;
mod productions;
pub mod w3c;

use crate::grammar::{ConstructionError, Pattern, PatternError, Rule};
use crate::parser::{ParseFailure, Parser, ParserOptions};
use crate::token::{ParseError, Token};
use std::fmt;

/// Failure to turn grammar text into a parser
#[derive(Debug, Clone, PartialEq)]
pub enum GrammarError {
    /// The grammar text did not parse at all
    NotResolved(ParseFailure),
    /// The grammar text parsed with errors; the first one
    Syntax(ParseError),
    /// `A - B` productions
    UnsupportedDifference { rule: String },
    DuplicateAttribute { name: String },
    InvalidAttribute {
        rule: String,
        attribute: String,
        reason: String,
    },
    /// A node the compiler does not know how to translate
    UnexpectedNode { kind: String, text: String },
    Pattern(PatternError),
    Construction(ConstructionError),
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::NotResolved(failure) => write!(f, "Could not parse grammar: {failure}"),
            GrammarError::Syntax(error) => write!(f, "Grammar syntax error: {error}"),
            GrammarError::UnsupportedDifference { rule } => {
                write!(f, "Difference not supported, rule: {rule}")
            }
            GrammarError::DuplicateAttribute { name } => write!(f, "Duplicated attribute {name}"),
            GrammarError::InvalidAttribute {
                rule,
                attribute,
                reason,
            } => write!(f, "Invalid attribute {attribute} on rule {rule}: {reason}"),
            GrammarError::UnexpectedNode { kind, text } => {
                write!(f, "Unexpected {kind} node {text:?}")
            }
            GrammarError::Pattern(error) => write!(f, "{error}"),
            GrammarError::Construction(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for GrammarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GrammarError::NotResolved(failure) => Some(failure),
            GrammarError::Syntax(error) => Some(error),
            GrammarError::Pattern(error) => Some(error),
            GrammarError::Construction(error) => Some(error),
            _ => None,
        }
    }
}

impl From<PatternError> for GrammarError {
    fn from(error: PatternError) -> Self {
        GrammarError::Pattern(error)
    }
}

impl From<ConstructionError> for GrammarError {
    fn from(error: ConstructionError) -> Self {
        GrammarError::Construction(error)
    }
}

/// The available grammar notations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Bnf,
    W3c,
    Custom,
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::Bnf, Dialect::W3c, Dialect::Custom];

    pub fn name(self) -> &'static str {
        match self {
            Dialect::Bnf => "bnf",
            Dialect::W3c => "w3c",
            Dialect::Custom => "custom",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|dialect| dialect.name() == name)
    }

    /// The rule table that parses this dialect's grammar text
    pub fn meta_rules(self) -> &'static [Rule] {
        match self {
            Dialect::Bnf => bnf::RULES.as_slice(),
            Dialect::W3c => w3c::RULES.as_slice(),
            Dialect::Custom => custom::RULES.as_slice(),
        }
    }

    pub fn get_rules(self, source: &str) -> Result<Vec<Rule>, GrammarError> {
        match self {
            Dialect::Bnf => bnf::get_rules(source),
            Dialect::W3c => w3c::get_rules(source),
            Dialect::Custom => custom::get_rules(source),
        }
    }

    pub fn parser(self, source: &str, options: ParserOptions) -> Result<Parser, GrammarError> {
        Ok(Parser::with_options(self.get_rules(source)?, options)?)
    }

    /// Grammar text for `rules`; BNF has no emitter
    pub fn emit(self, rules: &[Rule]) -> Option<String> {
        match self {
            Dialect::Bnf => None,
            Dialect::W3c => Some(w3c::emit(rules)),
            Dialect::Custom => Some(custom::emit(rules)),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse grammar text with a meta parser, rejecting any parse error
fn parse_grammar(meta: &Parser, source: &str) -> Result<Token, GrammarError> {
    let ast = meta.parse(source).map_err(GrammarError::NotResolved)?;
    match ast.errors.first() {
        Some(error) => Err(GrammarError::Syntax(error.clone())),
        None => Ok(ast),
    }
}

/// Compile a pattern of a static meta grammar
fn re(source: &str) -> Pattern {
    Pattern::new(source).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_names() {
        for dialect in Dialect::ALL {
            assert_eq!(Dialect::from_name(dialect.name()), Some(dialect));
        }
        assert_eq!(Dialect::from_name("yacc"), None);
    }

    #[test]
    fn test_meta_grammars_build() {
        for dialect in Dialect::ALL {
            assert!(Parser::new(dialect.meta_rules().to_vec()).is_ok(), "{dialect}");
        }
    }

    #[test]
    fn test_same_grammar_in_every_dialect() {
        let bnf = Dialect::Bnf
            .parser("<Greeting> ::= \"hi\" <EOF>\n", ParserOptions::default())
            .unwrap();
        let w3c = Dialect::W3c
            .parser("Greeting ::= \"hi\" EOF\n", ParserOptions::default())
            .unwrap();
        let custom = Dialect::Custom
            .parser("Greeting ::= \"hi\" EOF\n", ParserOptions::default())
            .unwrap();
        for parser in [bnf, w3c, custom] {
            let tree = parser.parse("hi").unwrap();
            assert!(tree.is("Greeting"));
            assert!(tree.errors.is_empty());
        }
    }
}
