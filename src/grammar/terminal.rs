//! Terminal resolution
//!
//! Terminals are the leaves of a grammar: quoted literals and regular
//! expressions. Both are matched at the very start of the remaining input.
//! The empty literal is special: it always succeeds without consuming anything,
//! which lets a grammar say "this alternative may contribute nothing".

use super::Pattern;
use std::borrow::Cow;

/// Result of matching a terminal at the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalMatch {
    /// The empty literal matched; zero width, never materialized
    Empty,
    /// Matched this many bytes
    Text(usize),
}

/// A matchable terminal
#[derive(Debug, Clone, PartialEq)]
pub enum Terminal<'a> {
    Empty,
    Exact(Cow<'a, str>),
    Pattern(&'a Pattern),
}

impl<'a> Terminal<'a> {
    /// Resolve an already decoded literal value
    pub fn literal(value: &'a str) -> Self {
        if value.is_empty() {
            Terminal::Empty
        } else {
            Terminal::Exact(Cow::Borrowed(value))
        }
    }

    /// Resolve quoted grammar text such as `"abc"` or `'\n'`
    pub fn quoted(text: &str) -> Terminal<'static> {
        let value = decode_literal(text);
        if value.is_empty() {
            Terminal::Empty
        } else {
            Terminal::Exact(Cow::Owned(value))
        }
    }

    pub fn pattern(pattern: &'a Pattern) -> Self {
        Terminal::Pattern(pattern)
    }

    /// Match against the start of `input`
    pub fn match_at(&self, input: &str) -> Option<TerminalMatch> {
        match self {
            Terminal::Empty => Some(TerminalMatch::Empty),
            Terminal::Exact(value) => input
                .starts_with(value.as_ref())
                .then_some(TerminalMatch::Text(value.len())),
            Terminal::Pattern(pattern) => pattern.match_len(input).map(TerminalMatch::Text),
        }
    }
}

/// Decode a quoted literal into its raw value.
///
/// Outer quotes are removed when both ends carry the same quote character.
/// Backslash escapes `\n \r \t \0 \\ \' \"`, `\xHH` and `\uHHHH` are decoded;
/// any other escaped character stands for itself.
pub fn decode_literal(text: &str) -> String {
    let inner = strip_quotes(text);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some('x') => push_code(&mut out, &mut chars, 2, 'x'),
            Some('u') => push_code(&mut out, &mut chars, 4, 'u'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}

fn strip_quotes(text: &str) -> &str {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' || first == b'\'') && first == last {
            return &text[1..text.len() - 1];
        }
    }
    text
}

fn push_code(
    out: &mut String,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    digits: usize,
    marker: char,
) {
    let mut code = String::new();
    while code.len() < digits {
        match chars.peek() {
            Some(c) if c.is_ascii_hexdigit() => {
                code.push(*c);
                chars.next();
            }
            _ => break,
        }
    }

    match u32::from_str_radix(&code, 16).ok().and_then(char::from_u32) {
        Some(decoded) if code.len() == digits => out.push(decoded),
        _ => {
            out.push(marker);
            out.push_str(&code);
        }
    }
}

/// Quote a raw value so that [`decode_literal`] gives it back
pub fn quote_literal(value: &str) -> String {
    let quote = if value.contains('"') && !value.contains('\'') {
        '\''
    } else {
        '"'
    };

    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}
