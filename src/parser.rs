//! Parser
//!
//! [`Parser`] ties a validated [`RuleTable`] to the matching engine. A parse
//! runs the engine once for the entry rule and normalizes the raw match into
//! the public tree.
//!
//! Usage:
//!     let parser = Parser::new(rules)?;
//!     let tree = parser.parse("input")?;
//!     for error in &tree.errors { ... }
//!
//! A parse has three outcomes: a tree without errors, a tree with recoverable
//! [`ParseError`](crate::token::ParseError)s, or [`ParseFailure`] when the
//! entry rule matches no prefix of the input at all.

mod engine;
pub mod options;
mod postprocess;
mod recovery;
pub mod trace;

pub use options::{ConfigError, ParserOptions};
pub use trace::{ConsoleTrace, NoTrace, TraceEvent, TraceLog, TraceSink};

use crate::grammar::{ConstructionError, Rule, RuleTable};
use crate::token::Token;
use engine::Engine;
use std::fmt;

/// The parse produced no tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    /// The rule matched no prefix of the input
    NotResolved { rule: String },
    /// The requested rule does not exist
    UnknownRule(String),
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseFailure::NotResolved { rule } => write!(f, "Input did not resolve as {rule}"),
            ParseFailure::UnknownRule(name) => write!(f, "Unknown rule {name}"),
        }
    }
}

impl std::error::Error for ParseFailure {}

pub struct Parser {
    table: RuleTable,
    options: ParserOptions,
    trace: Box<dyn TraceSink + Send + Sync>,
}

impl Parser {
    pub fn new(rules: Vec<Rule>) -> Result<Self, ConstructionError> {
        Self::with_options(rules, ParserOptions::default())
    }

    pub fn with_options(rules: Vec<Rule>, options: ParserOptions) -> Result<Self, ConstructionError> {
        let table = RuleTable::build(rules, &options.whitespace_rule)?;
        Ok(Parser {
            table,
            options,
            trace: Box::new(NoTrace),
        })
    }

    /// Send engine events to `sink`
    pub fn with_trace(mut self, sink: impl TraceSink + Send + Sync + 'static) -> Self {
        self.trace = Box::new(sink);
        self
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    pub fn rules(&self) -> &[Rule] {
        self.table.rules()
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parse `input` from the default entry rule
    pub fn parse(&self, input: &str) -> Result<Token, ParseFailure> {
        self.parse_rule(input, None)
    }

    /// Parse `input` from `target`, or from the default entry rule when `None`.
    ///
    /// The default entry rule is the first rule that is neither a fragment nor
    /// a `%` helper.
    ///
    /// When the entry rule collapses, the root is its only child: the root's
    /// text and span cover that child alone, while `rest` still starts after
    /// everything the entry rule consumed.
    pub fn parse_rule(&self, input: &str, target: Option<&str>) -> Result<Token, ParseFailure> {
        let name = match target {
            Some(name) => name,
            None => self
                .table
                .entry_rule()
                .map(|rule| rule.name.as_str())
                .ok_or_else(|| ParseFailure::UnknownRule(String::new()))?,
        };
        let index = self
            .table
            .index_of(name)
            .ok_or_else(|| ParseFailure::UnknownRule(name.to_string()))?;

        let engine = Engine::new(&self.table, &self.options, self.trace.as_ref());
        let found = engine
            .match_rule(index, input, 0)
            .ok_or_else(|| ParseFailure::NotResolved {
                rule: name.to_string(),
            })?;

        Ok(postprocess::normalize(found, input, &self.options))
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("rules", &self.table.rules().len())
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Pattern;
    use crate::symbols;
    use std::sync::Arc;

    fn digits() -> Parser {
        Parser::new(vec![Rule::new(
            "Digits",
            vec![symbols![Pattern::new("[0-9]+").unwrap()]],
        )])
        .unwrap()
    }

    #[test]
    fn test_not_resolved() {
        assert_eq!(
            digits().parse("abc"),
            Err(ParseFailure::NotResolved {
                rule: "Digits".into()
            })
        );
    }

    #[test]
    fn test_collapsed_entry_rule() {
        let parser = Parser::new(vec![
            Rule::new("Doc", vec![symbols!["\"(\"", "Word", "\")\""]]).collapsing(),
            Rule::new("Word", vec![symbols![Pattern::new("[a-z]+").unwrap()]]),
        ])
        .unwrap();
        let tree = parser.parse("(ab)").unwrap();

        assert!(tree.is("Word"));
        assert_eq!(tree.text, "ab");
        assert_eq!(tree.span(), 1..3);
        assert!(tree.rest.is_empty());
        assert!(tree.errors.is_empty());
    }

    #[test]
    fn test_unknown_rule() {
        assert_eq!(
            digits().parse_rule("1", Some("Nope")),
            Err(ParseFailure::UnknownRule("Nope".into()))
        );
    }

    #[test]
    fn test_trace_is_observational() {
        let log = Arc::new(TraceLog::new());
        let traced = digits().with_trace(Arc::clone(&log));
        assert_eq!(traced.parse("12x"), digits().parse("12x"));
        assert_eq!(
            log.lines(),
            vec!["Trying to get Digits from \"12x\"", ">>> Got Digits \"12\""]
        );
    }

    #[test]
    fn test_parser_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Parser>();
    }
}
