//! Parse tree tokens and recoverable parse errors
//!
//! A [`Token`] is a node of the tree produced by [`crate::parser::Parser`].
//! Parents own their children. There is no pointer back to the parent;
//! [`TokenPath`] addresses a node from the root and gives the parent link by
//! dropping its last step.
//!
//! Offsets are byte offsets into the parsed input, `start` inclusive and `end`
//! exclusive.

use serde::Serialize;
use std::fmt;
use std::ops::Range;

/// Kind given to tokens synthesized for syntax errors
pub const SYNTAX_ERROR: &str = "SyntaxError";

/// What went wrong at a [`ParseError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseErrorKind {
    /// A committed (pinned) alternative could not continue
    Expected,
    /// Input was skipped to resynchronize on a recovery rule
    UnexpectedInput,
    /// The entry rule matched but input remained
    TrailingInput,
}

/// A recoverable error recorded in the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    /// The rule or terminal that was expected, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Kind of the token the error is attached to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_kind: Option<String>,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl ParseError {
    pub(crate) fn expected(expected: &str, found: &str) -> Self {
        let message = if found.is_empty() {
            format!("Unexpected end of input. Missing {expected}")
        } else {
            format!("Unexpected end of input. Expecting {expected} Got: {found}")
        };
        ParseError {
            kind: ParseErrorKind::Expected,
            message,
            expected: Some(expected.to_string()),
            token_kind: Some(SYNTAX_ERROR.to_string()),
            text: found.to_string(),
            start: 0,
            end: found.len(),
        }
    }

    pub(crate) fn unexpected_input(skipped: &str, expected: &str) -> Self {
        ParseError {
            kind: ParseErrorKind::UnexpectedInput,
            message: format!("Unexpected input: {skipped:?} Expecting: {expected}"),
            expected: Some(expected.to_string()),
            token_kind: Some(SYNTAX_ERROR.to_string()),
            text: skipped.to_string(),
            start: 0,
            end: skipped.len(),
        }
    }

    pub(crate) fn trailing_input(rest: &str, start: usize, token_kind: Option<&str>) -> Self {
        ParseError {
            kind: ParseErrorKind::TrailingInput,
            message: format!("Unexpected end of input: \n{rest}"),
            expected: None,
            token_kind: token_kind.map(str::to_string),
            text: rest.to_string(),
            start,
            end: start + rest.len(),
        }
    }

    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}..{})", self.message, self.start, self.end)
    }
}

impl std::error::Error for ParseError {}

/// A node of the parse tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Rule name; `None` for raw terminal matches
    pub kind: Option<String>,
    pub text: String,
    pub start: usize,
    pub end: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Token>,
    /// On the root: every error in the tree, in document order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ParseError>,
    /// On the root: input left unconsumed
    #[serde(skip_serializing_if = "String::is_empty")]
    pub rest: String,
    #[serde(skip)]
    pub(crate) fragment: bool,
}

impl Token {
    pub(crate) fn new(kind: Option<&str>, text: &str, start: usize) -> Self {
        Token {
            kind: kind.map(str::to_string),
            text: text.to_string(),
            start,
            end: start + text.len(),
            children: Vec::new(),
            errors: Vec::new(),
            rest: String::new(),
            fragment: false,
        }
    }

    pub(crate) fn syntax_error(text: &str, error: ParseError) -> Self {
        let mut token = Token::new(Some(SYNTAX_ERROR), text, 0);
        token.errors.push(error);
        token
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// True if this token was produced by rule `kind`
    pub fn is(&self, kind: &str) -> bool {
        self.kind() == Some(kind)
    }

    pub fn is_syntax_error(&self) -> bool {
        self.is(SYNTAX_ERROR)
    }

    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Direct children produced by rule `kind`
    pub fn children_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Token> {
        self.children.iter().filter(move |child| child.is(kind))
    }

    pub fn first_child_of_kind(&self, kind: &str) -> Option<&Token> {
        self.children.iter().find(|child| child.is(kind))
    }

    /// First token of `kind` in depth-first pre-order, including `self`
    pub fn find(&self, kind: &str) -> Option<&Token> {
        if self.is(kind) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(kind))
    }

    /// Every token in depth-first pre-order, paired with its path
    pub fn walk(&self) -> Vec<(TokenPath, &Token)> {
        let mut out = Vec::new();
        self.walk_into(TokenPath::root(), &mut out);
        out
    }

    fn walk_into<'a>(&'a self, path: TokenPath, out: &mut Vec<(TokenPath, &'a Token)>) {
        out.push((path.clone(), self));
        for (i, child) in self.children.iter().enumerate() {
            child.walk_into(path.child(i), out);
        }
    }

    /// The token at `path`, with `self` as the root
    pub fn at(&self, path: &TokenPath) -> Option<&Token> {
        path.0
            .iter()
            .try_fold(self, |token, &i| token.children.get(i))
    }

    /// The parent of the token at `path`
    pub fn parent_of(&self, path: &TokenPath) -> Option<&Token> {
        path.parent().and_then(|parent| self.at(&parent))
    }
}

/// Position of a token relative to the root: the child index at each level
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TokenPath(Vec<usize>);

impl TokenPath {
    pub fn root() -> Self {
        TokenPath(Vec::new())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut steps = self.0.clone();
        steps.push(index);
        TokenPath(steps)
    }

    /// The path one level up; `None` for the root
    pub fn parent(&self) -> Option<TokenPath> {
        let (_, rest) = self.0.split_last()?;
        Some(TokenPath(rest.to_vec()))
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl fmt::Display for TokenPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let steps: Vec<String> = self.0.iter().map(usize::to_string).collect();
        write!(f, "/{}", steps.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Token {
        let mut root = Token::new(Some("List"), "a,b", 0);
        let mut first = Token::new(Some("Item"), "a", 0);
        first.children.push(Token::new(Some("Name"), "a", 0));
        root.children.push(first);
        root.children.push(Token::new(Some("Item"), "b", 2));
        root
    }

    #[test]
    fn test_children_of_kind() {
        let root = sample();
        let texts: Vec<_> = root.children_of_kind("Item").map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn test_walk_is_pre_order() {
        let root = sample();
        let kinds: Vec<_> = root
            .walk()
            .into_iter()
            .map(|(path, token)| format!("{path} {}", token.kind().unwrap()))
            .collect();
        assert_eq!(kinds, vec!["/ List", "/0 Item", "/0/0 Name", "/1 Item"]);
    }

    #[test]
    fn test_path_lookup_and_parent() {
        let root = sample();
        let path = TokenPath::root().child(0).child(0);
        assert!(root.at(&path).unwrap().is("Name"));
        assert_eq!(root.parent_of(&path).unwrap().text, "a");
        assert!(root.parent_of(&TokenPath::root()).is_none());
        assert!(root.at(&TokenPath::root().child(5)).is_none());
    }

    #[test]
    fn test_find() {
        let root = sample();
        assert_eq!(root.find("Name").unwrap().start, 0);
        assert!(root.find("Missing").is_none());
    }

    #[test]
    fn test_expected_error_messages() {
        assert_eq!(
            ParseError::expected("B", "z").message,
            "Unexpected end of input. Expecting B Got: z"
        );
        assert_eq!(
            ParseError::expected("B", "").message,
            "Unexpected end of input. Missing B"
        );
    }

    #[test]
    fn test_unexpected_input_message() {
        let error = ParseError::unexpected_input("garbage", "Item");
        assert_eq!(error.message, "Unexpected input: \"garbage\" Expecting: Item");
        assert_eq!(error.span(), 0..7);
    }
}
