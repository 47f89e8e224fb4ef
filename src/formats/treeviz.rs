//! Treeviz formatter for parse trees
//!
//! One line per node, nesting drawn with box connectors:
//!
//!     ⧉ Pair 0..5 "ab,cd"
//!     ├─ • Word 0..2 "ab"
//!     └─ ✗ SyntaxError 3..5 "cd"
//!
//! Each line is `<icon> <kind> <start>..<end> <text>`, with the quoted text
//! truncated to 30 characters.
//!
//! Icons
//!     Root: ⧉
//!     SyntaxError: ✗
//!     EOF: ∎
//!     Other nodes: •

use crate::token::{Token, SYNTAX_ERROR};
use crate::grammar::EOF;

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

fn get_icon(kind: &str) -> &'static str {
    match kind {
        SYNTAX_ERROR => "✗",
        EOF => "∎",
        _ => "•",
    }
}

fn label(token: &Token) -> String {
    format!(
        "{} {}..{} {}",
        token.kind().unwrap_or("?"),
        token.start,
        token.end,
        truncate(&format!("{:?}", token.text), 30)
    )
}

fn format_token(token: &Token, prefix: &str, child_index: usize, child_count: usize) -> String {
    let mut output = String::new();

    let is_last = child_index == child_count - 1;
    let connector = if is_last { "└─" } else { "├─" };
    let icon = get_icon(token.kind().unwrap_or_default());

    output.push_str(&format!("{}{} {} {}\n", prefix, connector, icon, label(token)));

    let child_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
    let child_count = token.children.len();
    for (i, child) in token.children.iter().enumerate() {
        output.push_str(&format_token(child, &child_prefix, i, child_count));
    }

    output
}

pub fn to_treeviz_str(root: &Token) -> String {
    let mut output = format!("⧉ {}\n", label(root));

    let child_count = root.children.len();
    for (i, child) in root.children.iter().enumerate() {
        output.push_str(&format_token(child, "", i, child_count));
    }

    output
}
