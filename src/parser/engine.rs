//! Matching engine
//!
//! A recursive interpreter over a [`RuleTable`]. Matching a rule tries its
//! alternatives in order and accepts the first one whose phases all succeed.
//! Each phase is a rule, a literal, a pattern or `EOF`, with an optional
//! decoration (optional, repeated, lookahead, pin marker).
//!
//! A rule re-entered at the same position before the first call returns can
//! only recurse forever (matching is a pure function of rule and position),
//! so the re-entrant call fails. This covers left recursion hidden behind a
//! nullable first symbol, which the table cannot see.
//!
//! Tokens built here carry offsets relative to their parent; the
//! post-processor turns them into absolute offsets. Only rule tokens, `EOF`,
//! whitespace and syntax-error tokens become children. Literals and patterns
//! contribute text but are never materialized.

use super::options::ParserOptions;
use super::recovery;
use super::trace::{TraceEvent, TraceSink};
use crate::grammar::table::{Phase, RuleTable, Target};
use crate::grammar::{Rule, Terminal, TerminalMatch, EOF};
use crate::token::{ParseError, Token};
use std::cell::RefCell;
use std::collections::HashSet;

/// A successful rule match
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Match {
    pub token: Token,
    /// Bytes of input consumed. Differs from the token text when the token
    /// was collapsed into its only child.
    pub len: usize,
}

/// Result of matching one phase target
enum Hit {
    /// The empty literal: zero width, nothing to add
    Empty,
    /// A literal or pattern: consumed text, no token
    Raw(usize),
    Node(Match),
}

pub(crate) struct Engine<'p> {
    table: &'p RuleTable,
    options: &'p ParserOptions,
    trace: &'p dyn TraceSink,
    /// Rule calls in progress, keyed by rule index and remaining input length
    active: RefCell<HashSet<(usize, usize)>>,
}

impl<'p> Engine<'p> {
    pub(crate) fn new(
        table: &'p RuleTable,
        options: &'p ParserOptions,
        trace: &'p dyn TraceSink,
    ) -> Self {
        Engine {
            table,
            options,
            trace,
            active: RefCell::new(HashSet::new()),
        }
    }

    pub(crate) fn table(&self) -> &RuleTable {
        self.table
    }

    pub(crate) fn trace(&self, event: TraceEvent<'_>) {
        self.trace.event(&event);
    }

    /// Match rule `index` against the start of `input`
    pub(crate) fn match_rule(&self, index: usize, input: &str, depth: usize) -> Option<Match> {
        let rule = self.table.rule_at(index);

        if self.options.max_depth.is_some_and(|max| depth > max) {
            self.trace(TraceEvent::DepthExceeded {
                rule: &rule.name,
                depth,
            });
            return None;
        }

        self.trace(TraceEvent::Attempt {
            rule: &rule.name,
            input,
            depth,
        });

        let call = (index, input.len());
        if !self.active.borrow_mut().insert(call) {
            self.trace(TraceEvent::Failed {
                rule: &rule.name,
                depth,
            });
            return None;
        }

        let accepted = self
            .table
            .alternatives(index)
            .iter()
            .find_map(|phases| self.match_alternative(rule, phases, input, depth));
        self.active.borrow_mut().remove(&call);

        let Some(mut found) = accepted else {
            self.trace(TraceEvent::Failed {
                rule: &rule.name,
                depth,
            });
            return None;
        };

        if rule.collapse_single_child && found.token.children.len() == 1 {
            if let Some(child) = found.token.children.pop() {
                found.token = child;
            }
        }

        self.trace(TraceEvent::Matched {
            rule: &rule.name,
            text: &input[..found.len],
            depth,
        });
        Some(found)
    }

    fn match_target(&self, target: &Target, input: &str, depth: usize) -> Option<Hit> {
        let terminal = match target {
            Target::Rule(index) => return self.match_rule(*index, input, depth).map(Hit::Node),
            Target::Eof => {
                return input.is_empty().then(|| {
                    Hit::Node(Match {
                        token: Token::new(Some(EOF), "", 0),
                        len: 0,
                    })
                })
            }
            Target::Literal(value) => Terminal::literal(value),
            Target::Pattern(pattern) => Terminal::pattern(pattern),
        };

        match terminal.match_at(input)? {
            TerminalMatch::Empty => Some(Hit::Empty),
            TerminalMatch::Text(len) => Some(Hit::Raw(len)),
        }
    }

    fn match_alternative(
        &self,
        rule: &Rule,
        phases: &[Phase],
        input: &str,
        depth: usize,
    ) -> Option<Match> {
        let mut node = Token::new(Some(&rule.name), "", 0);
        node.fragment = rule.fragment;

        let implicit_whitespace = rule.implicit_whitespace == Some(true);
        let mut cursor = 0;
        let mut pinned = false;
        let mut found_something = false;

        'phases: for (i, phase) in phases.iter().enumerate() {
            let descriptor = &phase.descriptor;
            let pins_here = descriptor.pin || rule.pin_at == Some(i + 1);
            let mut found_one = false;

            loop {
                let mut got = self.match_target(&phase.target, &input[cursor..], depth + 1);
                if got.is_none() && implicit_whitespace {
                    cursor = self.skip_whitespace(&mut node, input, cursor, depth + 1);
                    got = self.match_target(&phase.target, &input[cursor..], depth + 1);
                }

                if descriptor.is_negative_lookahead() {
                    if got.is_some() {
                        return None;
                    }
                    break;
                }

                let hit = match got {
                    Some(hit) => {
                        if pins_here && !pinned {
                            pinned = true;
                            self.trace(TraceEvent::Pinned {
                                rule: &rule.name,
                                phase: i + 1,
                                depth,
                            });
                        }
                        hit
                    }
                    None if descriptor.is_positive_lookahead() => return None,
                    None if descriptor.is_optional() => break,
                    None if descriptor.allows_repetition() && found_one => break,
                    None if pinned => {
                        let rest = &input[cursor..];
                        self.trace(TraceEvent::SyntaxError {
                            rule: &rule.name,
                            expected: &descriptor.name,
                            depth,
                        });
                        let error = ParseError::expected(&descriptor.name, rest);
                        let mut token = Token::syntax_error(rest, error);
                        token.start = cursor;
                        token.end = input.len();
                        node.children.push(token);
                        cursor = input.len();
                        found_something = true;
                        break 'phases;
                    }
                    None => match recovery::recover(self, rule, &input[cursor..], depth + 1) {
                        Some(recovered) => Hit::Node(recovered),
                        None => return None,
                    },
                };

                found_one = true;
                found_something = true;

                let len = match hit {
                    Hit::Empty => break,
                    Hit::Raw(len) => len,
                    Hit::Node(found) => {
                        let len = found.len;
                        if !descriptor.is_positive_lookahead() {
                            attach(&mut node, found.token, cursor);
                        }
                        len
                    }
                };

                if descriptor.is_positive_lookahead() {
                    break;
                }
                cursor += len;

                if !descriptor.allows_repetition() || cursor >= input.len() || len == 0 {
                    break;
                }
            }
        }

        if !found_something {
            return None;
        }

        node.text = input[..cursor].to_string();
        node.end = cursor;
        Some(Match {
            token: node,
            len: cursor,
        })
    }

    /// Consume whitespace-rule matches at `cursor`, attaching them to `node`.
    /// Returns the new cursor.
    fn skip_whitespace(&self, node: &mut Token, input: &str, mut cursor: usize, depth: usize) -> usize {
        let Some(whitespace) = self.table.whitespace() else {
            return cursor;
        };

        while cursor < input.len() {
            match self.match_rule(whitespace, &input[cursor..], depth) {
                Some(found) if found.len > 0 => {
                    let len = found.len;
                    attach(node, found.token, cursor);
                    cursor += len;
                }
                _ => break,
            }
        }
        cursor
    }
}

/// Add a matched token found at `offset` inside `node`. Fragment tokens are
/// dissolved: their children and errors move up into `node`.
fn attach(node: &mut Token, mut token: Token, offset: usize) {
    let base = offset + token.start;
    if token.fragment {
        node.errors.append(&mut token.errors);
        for mut child in token.children {
            child.start += base;
            child.end += base;
            node.children.push(child);
        }
    } else {
        token.start = base;
        token.end += offset;
        node.children.push(token);
    }
}
