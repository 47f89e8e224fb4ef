//! Tree normalization after a match
//!
//! One bottom-up rebuild of the raw match:
//! - relative offsets become absolute,
//! - every attached error is collected on the root in pre-order,
//! - `%` helper nodes are removed, and `UPPER_SNAKE` nodes too unless kept,
//! - unconsumed input is recorded on the root with a trailing-input error.
//!
//! Errors attached to removed nodes are still collected.

use super::engine::Match;
use super::options::ParserOptions;
use crate::grammar::{is_fragment_name, is_internal_name};
use crate::token::{ParseError, Token};

pub(crate) fn normalize(found: Match, input: &str, options: &ParserOptions) -> Token {
    let Match { token, len } = found;
    let mut errors = Vec::new();
    let mut root = rebuild(token, 0, options, &mut errors);

    let rest = &input[len..];
    if !rest.is_empty() {
        errors.push(ParseError::trailing_input(rest, len, root.kind()));
    }
    root.errors = errors;
    root.rest = rest.to_string();
    root
}

fn rebuild(mut token: Token, base: usize, options: &ParserOptions, errors: &mut Vec<ParseError>) -> Token {
    token.start += base;
    token.end += base;

    for error in &mut token.errors {
        error.start = token.start;
        error.end = token.end;
    }
    errors.append(&mut token.errors);

    let start = token.start;
    token.children = std::mem::take(&mut token.children)
        .into_iter()
        .map(|child| rebuild(child, start, options, errors))
        .filter(|child| keeps(child, options))
        .collect();

    token.rest.clear();
    token.fragment = false;
    token
}

fn keeps(token: &Token, options: &ParserOptions) -> bool {
    match token.kind() {
        Some(kind) if is_fragment_name(kind) => false,
        Some(kind) if is_internal_name(kind) => options.keep_upper_rules,
        _ => true,
    }
}
