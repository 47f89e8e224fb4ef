//! Error recovery
//!
//! When a required phase fails inside a rule that names a recovery target,
//! input is skipped one character at a time until the target rule matches.
//! The skipped span becomes a `SyntaxError` token standing in for the failed
//! phase, and matching resumes at the synchronization point.

use super::engine::{Engine, Match};
use super::trace::TraceEvent;
use crate::grammar::Rule;
use crate::token::{ParseError, Token};

pub(crate) fn recover(engine: &Engine<'_>, rule: &Rule, input: &str, depth: usize) -> Option<Match> {
    let target = rule.recover_to.as_deref()?;
    let target_index = engine.table().index_of(target)?;
    // Nothing to skip when the input ends or already resumes at the target.
    if input.is_empty() || engine.match_rule(target_index, input, depth).is_some() {
        return None;
    }

    engine.trace(TraceEvent::Recovering {
        rule: &rule.name,
        target,
        depth,
    });

    let sync_points = input
        .char_indices()
        .map(|(i, _)| i)
        .skip(1)
        .chain(std::iter::once(input.len()));

    for offset in sync_points {
        if engine.match_rule(target_index, &input[offset..], depth).is_none() {
            continue;
        }

        let skipped = &input[..offset];
        engine.trace(TraceEvent::Recovered {
            rule: &rule.name,
            skipped,
            depth,
        });
        let error = ParseError::unexpected_input(skipped, &rule.name);
        return Some(Match {
            token: Token::syntax_error(skipped, error),
            len: offset,
        });
    }

    None
}
