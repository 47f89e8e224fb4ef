//! Parse tracing
//!
//! The engine reports what it does to a [`TraceSink`] given to the parser at
//! construction. Sinks only observe; they never change a parse result.

use crate::grammar::is_internal_name;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Longest input excerpt shown in a rendered event
const EXCERPT: usize = 40;

/// One step of the matching engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent<'a> {
    Attempt { rule: &'a str, input: &'a str, depth: usize },
    Matched { rule: &'a str, text: &'a str, depth: usize },
    Failed { rule: &'a str, depth: usize },
    Pinned { rule: &'a str, phase: usize, depth: usize },
    SyntaxError { rule: &'a str, expected: &'a str, depth: usize },
    Recovering { rule: &'a str, target: &'a str, depth: usize },
    Recovered { rule: &'a str, skipped: &'a str, depth: usize },
    DepthExceeded { rule: &'a str, depth: usize },
}

impl TraceEvent<'_> {
    pub fn rule(&self) -> &str {
        match *self {
            TraceEvent::Attempt { rule, .. }
            | TraceEvent::Matched { rule, .. }
            | TraceEvent::Failed { rule, .. }
            | TraceEvent::Pinned { rule, .. }
            | TraceEvent::SyntaxError { rule, .. }
            | TraceEvent::Recovering { rule, .. }
            | TraceEvent::Recovered { rule, .. }
            | TraceEvent::DepthExceeded { rule, .. } => rule,
        }
    }

    pub fn depth(&self) -> usize {
        match *self {
            TraceEvent::Attempt { depth, .. }
            | TraceEvent::Matched { depth, .. }
            | TraceEvent::Failed { depth, .. }
            | TraceEvent::Pinned { depth, .. }
            | TraceEvent::SyntaxError { depth, .. }
            | TraceEvent::Recovering { depth, .. }
            | TraceEvent::Recovered { depth, .. }
            | TraceEvent::DepthExceeded { depth, .. } => depth,
        }
    }

    /// The event as one indented line
    pub fn render(&self) -> String {
        format!("{}{}", "│  ".repeat(self.depth()), self)
    }
}

fn excerpt(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() > EXCERPT {
        format!("{}...", line.chars().take(EXCERPT).collect::<String>())
    } else {
        line.to_string()
    }
}

impl fmt::Display for TraceEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::Attempt { rule, input, .. } => {
                write!(f, "Trying to get {rule} from {:?}", excerpt(input))
            }
            TraceEvent::Matched { rule, text, .. } => {
                write!(f, ">>> Got {rule} {:?}", excerpt(text))
            }
            TraceEvent::Failed { rule, .. } => write!(f, "<<< No match for {rule}"),
            TraceEvent::Pinned { rule, phase, .. } => write!(f, "Pinned {rule} at phase {phase}"),
            TraceEvent::SyntaxError { rule, expected, .. } => {
                write!(f, "!!! {rule}: expecting {expected}")
            }
            TraceEvent::Recovering { rule, target, .. } => {
                write!(f, "Recovering {rule} until {target}")
            }
            TraceEvent::Recovered { rule, skipped, .. } => {
                write!(f, "Recovered {rule}, skipped {:?}", excerpt(skipped))
            }
            TraceEvent::DepthExceeded { rule, depth } => {
                write!(f, "Depth limit reached at {rule} ({depth})")
            }
        }
    }
}

/// Receiver of engine events
pub trait TraceSink {
    fn event(&self, event: &TraceEvent<'_>);
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrace;

impl TraceSink for NoTrace {
    fn event(&self, _event: &TraceEvent<'_>) {}
}

/// Prints the trace tree to stderr, leaving out internal rules
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleTrace;

impl TraceSink for ConsoleTrace {
    fn event(&self, event: &TraceEvent<'_>) {
        if !is_internal_name(event.rule()) {
            eprintln!("{}", event.render());
        }
    }
}

/// Keeps rendered events in memory
#[derive(Debug, Default)]
pub struct TraceLog {
    lines: Mutex<Vec<String>>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|lines| lines.clone()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().map(|lines| lines.is_empty()).unwrap_or(true)
    }
}

impl TraceSink for TraceLog {
    fn event(&self, event: &TraceEvent<'_>) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(event.render());
        }
    }
}

impl<T: TraceSink + ?Sized> TraceSink for Arc<T> {
    fn event(&self, event: &TraceEvent<'_>) {
        (**self).event(event)
    }
}
