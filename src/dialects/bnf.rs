//! Classic BNF
//!
//!     <syntax>     ::= <rule> | <rule> <syntax>
//!     <rule>       ::= "<" <rule-name> ">" "::=" <expression> <line-end>
//!
//! Every rule sits on its own line. Terms are either quoted literals or
//! `<name>` references; there are no repetitions, groups or classes, so
//! recursion and empty literals (`""`) do all the work.
//!
//! An `EOL` rule matching `\r\n`, `\r` or `\n` is added unless the grammar
//! defines one.

use super::{parse_grammar, re, GrammarError};
use crate::grammar::{Rule, Symbol};
use crate::parser::{Parser, ParserOptions};
use crate::symbols;
use crate::token::Token;
use once_cell::sync::Lazy;

/// Meta rules that parse BNF grammar text
pub static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new("syntax", vec![symbols!["RULE_EOL*", "rule+"]]),
        Rule::new(
            "rule",
            vec![symbols![
                r#"" "*"#,
                r#""<""#,
                "rule-name",
                r#"">""#,
                r#"" "*"#,
                r#""::=""#,
                "firstExpression",
                "otherExpression*",
                r#"" "*"#,
                "RULE_EOL+",
                r#"" "*"#
            ]],
        ),
        Rule::new("firstExpression", vec![symbols![r#"" "*"#, "list"]]),
        Rule::new(
            "otherExpression",
            vec![symbols![r#"" "*"#, r#""|""#, r#"" "*"#, "list"]],
        ),
        Rule::new("RULE_EOL", vec![symbols![r#""\r""#], symbols![r#""\n""#]]),
        Rule::new(
            "list",
            vec![symbols!["term", r#"" "*"#, "list"], symbols!["term"]],
        ),
        Rule::new(
            "term",
            vec![
                symbols!["literal"],
                symbols![r#""<""#, "rule-name", r#"">""#],
            ],
        ),
        Rule::new(
            "literal",
            vec![
                symbols![r#"'"'"#, "RULE_CHARACTER1*", r#"'"'"#],
                symbols![r#""'""#, "RULE_CHARACTER2*", r#""'""#],
            ],
        ),
        Rule::new(
            "RULE_CHARACTER",
            vec![
                symbols![r#"" ""#],
                symbols!["RULE_LETTER"],
                symbols!["RULE_DIGIT"],
                symbols!["RULE_SYMBOL"],
            ],
        ),
        Rule::new("RULE_LETTER", vec![symbols![re("[A-Za-z]")]]),
        Rule::new("RULE_DIGIT", vec![symbols![re("[0-9]")]]),
        Rule::new(
            "RULE_SYMBOL",
            vec![symbols![re(r"[-_!#$%&()*+,./:;<=>?@\[\\\]^`{|}~]")]],
        ),
        Rule::new(
            "RULE_CHARACTER1",
            vec![symbols!["RULE_CHARACTER"], symbols![r#""'""#]],
        ),
        Rule::new(
            "RULE_CHARACTER2",
            vec![symbols!["RULE_CHARACTER"], symbols![r#"'"'"#]],
        ),
        Rule::new("rule-name", vec![symbols!["RULE_LETTER", "RULE_CHAR*"]]),
        Rule::new(
            "RULE_CHAR",
            vec![
                symbols!["RULE_LETTER"],
                symbols!["RULE_DIGIT"],
                symbols![r#""_""#],
                symbols![r#""-""#],
            ],
        ),
    ]
});

static META: Lazy<Parser> =
    Lazy::new(|| Parser::new(RULES.clone()).expect("BNF meta grammar is valid"));

/// Compile BNF text into rules
pub fn get_rules(source: &str) -> Result<Vec<Rule>, GrammarError> {
    let ast = parse_grammar(&META, source)?;

    let mut rules: Vec<Rule> = ast
        .children_of_kind("rule")
        .map(|rule| {
            let name = rule
                .first_child_of_kind("rule-name")
                .map(|n| n.text.clone())
                .unwrap_or_default();
            let alternatives = rule
                .children
                .iter()
                .filter(|c| c.is("firstExpression") || c.is("otherExpression"))
                .map(|expression| {
                    let mut terms = Vec::new();
                    collect_terms(expression, &mut terms);
                    terms
                })
                .collect();
            Rule::new(name, alternatives)
        })
        .collect();

    if !rules.iter().any(|rule| rule.name == "EOL") {
        rules.push(Rule::new(
            "EOL",
            vec![
                symbols![r#""\r\n""#],
                symbols![r#""\r""#],
                symbols![r#""\n""#],
            ],
        ));
    }

    Ok(rules)
}

/// Terms of an expression in order, following the nested `list`s
fn collect_terms(node: &Token, terms: &mut Vec<Symbol>) {
    for child in &node.children {
        if child.is("term") {
            let text = child
                .first_child_of_kind("literal")
                .or_else(|| child.first_child_of_kind("rule-name"))
                .map(|t| t.text.as_str())
                .unwrap_or_default();
            terms.push(Symbol::parse(text));
        } else if child.is("list") {
            collect_terms(child, terms);
        }
    }
}

/// Build a parser for BNF text
pub fn parser(source: &str, options: ParserOptions) -> Result<Parser, GrammarError> {
    Ok(Parser::with_options(get_rules(source)?, options)?)
}
