//! Output formats
//!
//! Two kinds of output:
//! - rule tables, through the pluggable [`FormatRegistry`] (json, yaml, ebnf, w3c)
//! - parse trees, as treeviz text or JSON

pub mod registry;
pub mod treeviz;

pub use registry::{FormatError, FormatRegistry, Formatter};
pub use treeviz::to_treeviz_str;

use crate::token::Token;

/// A parse tree as pretty-printed JSON
pub fn tree_to_json(root: &Token) -> Result<String, FormatError> {
    serde_json::to_string_pretty(root).map_err(|e| FormatError::SerializationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialects::w3c;
    use crate::parser::ParserOptions;

    #[test]
    fn test_tree_to_json() {
        let parser = w3c::parser("Doc ::= Word+\nWord ::= [a-z]\n", ParserOptions::default()).unwrap();
        let tree = parser.parse("ab").unwrap();
        let value: serde_json::Value = serde_json::from_str(&tree_to_json(&tree).unwrap()).unwrap();

        assert_eq!(value["kind"], "Doc");
        assert_eq!(value["children"][1]["start"], 1);
        assert!(value.get("errors").is_none());
    }
}
