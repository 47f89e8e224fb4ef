//! W3C EBNF, the notation of the XML recommendation
//!
//!     Name     ::= Other "literal" 'literal'
//!     Choice   ::= A | B C
//!     Repeat   ::= A? B* C+ (D | E)*
//!     Chars    ::= [a-zA-Z] [^"] #x20 [#x30-#x39]
//!     Peek     ::= "true" ![a-z] | Name &"("
//!     /* comments anywhere whitespace is allowed */
//!
//! One production per line. The difference operator `A - B` parses but is
//! rejected when compiling.

use super::productions::{self, Flavor};
use super::{parse_grammar, GrammarError};
use crate::grammar::Rule;
use crate::parser::{Parser, ParserOptions};
use crate::symbols;
use once_cell::sync::Lazy;

/// Meta rules that parse W3C EBNF grammar text
pub static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    let mut rules = vec![
        Rule::new("Grammar", vec![symbols!["RULE_S*", "%Atomic*", "EOF"]]),
        Rule::new("%Atomic", vec![symbols!["Production", "RULE_S*"]]).as_fragment(),
        Rule::new(
            "Production",
            vec![symbols![
                "NCName",
                "RULE_S*",
                r#""::=""#,
                "RULE_WHITESPACE*",
                "Choice",
                "RULE_WHITESPACE*",
                "%EndOfProduction",
                "RULE_S*"
            ]],
        ),
        Rule::new("Choice", vec![symbols!["SequenceOrDifference", "%_Choice_1*"]]).as_fragment(),
        Rule::new(
            "%_Choice_1",
            vec![symbols![
                "RULE_WHITESPACE*",
                r#""|""#,
                "RULE_WHITESPACE*",
                "SequenceOrDifference"
            ]],
        )
        .as_fragment(),
        Rule::new(
            "SequenceOrDifference",
            vec![symbols!["Item", "RULE_WHITESPACE*", "%_Item_1?"]],
        ),
        Rule::new(
            "%_Item_1",
            vec![symbols!["Minus", "Item"], symbols!["Item*"]],
        )
        .as_fragment(),
        Rule::new("Minus", vec![symbols![r#""-""#]]),
        Rule::new(
            "Item",
            vec![symbols![
                "RULE_WHITESPACE*",
                "PrimaryPreDecoration?",
                "%Primary",
                "PrimaryDecoration?"
            ]],
        )
        .as_fragment(),
        Rule::new(
            "PrimaryDecoration",
            vec![symbols![r#""?""#], symbols![r#""*""#], symbols![r#""+""#]],
        ),
        Rule::new(
            "PrimaryPreDecoration",
            vec![symbols![r#""&""#], symbols![r#""!""#]],
        ),
        Rule::new(
            "%Primary",
            vec![
                symbols!["NCName"],
                symbols!["StringLiteral"],
                symbols!["CharCode"],
                symbols!["CharClass"],
                symbols!["SubItem"],
            ],
        )
        .as_fragment(),
        Rule::new(
            "SubItem",
            vec![symbols![
                r#""(""#,
                "RULE_WHITESPACE*",
                "Choice",
                "RULE_WHITESPACE*",
                r#"")""#
            ]],
        ),
    ];
    rules.extend(productions::lexical_rules(true));
    rules
});

static META: Lazy<Parser> =
    Lazy::new(|| Parser::new(RULES.clone()).expect("W3C meta grammar is valid"));

/// Compile W3C EBNF text into rules
pub fn get_rules(source: &str) -> Result<Vec<Rule>, GrammarError> {
    let ast = parse_grammar(&META, source)?;
    productions::compile(&ast, Flavor::W3c)
}

pub fn parser(source: &str, options: ParserOptions) -> Result<Parser, GrammarError> {
    Ok(Parser::with_options(get_rules(source)?, options)?)
}

/// Render rules as W3C EBNF. Pins are dropped; recovery targets survive as
/// comments only.
pub fn emit(rules: &[Rule]) -> String {
    productions::emit(rules, Flavor::W3c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Pattern, Symbol};
    use crate::parser::ParseFailure;
    use rstest::rstest;

    #[test]
    fn test_production_shapes() {
        let rules = get_rules("A ::= B 'x' C?\nB ::= [a-z]+ | #x20\nC ::= (B | A)*\n").unwrap();
        let names: Vec<_> = rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "%B_0", "B", "%C_1", "C"]);

        assert_eq!(rules[0].alternatives, vec![symbols!["B", "\"x\"", "C?"]]);
        assert_eq!(
            rules[1].alternatives,
            vec![vec![Symbol::Pattern(Pattern::new("[a-z]").unwrap())]]
        );
        assert!(rules[1].fragment);
        assert_eq!(
            rules[2].alternatives,
            vec![
                symbols!["%B_0+"],
                vec![Symbol::Pattern(Pattern::new(r"\x20").unwrap())]
            ]
        );
        assert_eq!(rules[3].alternatives, vec![symbols!["B"], symbols!["A"]]);
        assert_eq!(rules[4].alternatives, vec![symbols!["%C_1*"]]);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let rules = get_rules("\n/* greeting */\nA ::= 'hi' /* trailing */\n\n\nB ::= A\n").unwrap();
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn test_last_production_without_newline() {
        let rules = get_rules("A ::= 'a'").unwrap();
        assert_eq!(rules[0].alternatives, vec![vec![Symbol::literal("a")]]);
    }

    #[test]
    fn test_char_codes_in_sequence() {
        let parser = parser("Pair ::= #x41 #x42 'c'\n", ParserOptions::default()).unwrap();
        let tree = parser.parse("ABc").unwrap();
        assert_eq!(tree.text, "ABc");
        assert!(tree.errors.is_empty());
        assert!(parser.parse("AB").is_err());
    }

    #[test]
    fn test_difference_rejected() {
        assert_eq!(
            get_rules("A ::= B - C\n"),
            Err(GrammarError::UnsupportedDifference { rule: "A".into() })
        );
    }

    #[rstest]
    #[case("keyword")]
    #[case("true")]
    #[case("trueAAA")]
    #[case("falseaAAA")]
    #[case("true a")]
    #[case("trueAAA a")]
    #[case("falseaAAA a")]
    fn test_negative_lookahead(#[case] input: &str) {
        let parser = parser(
            "Document ::= ((Boolean | IdentifieR) \" \"*)+\nIdentifieR ::= [a-zA-Z]+\nBoolean ::= (\"true\" | \"false\") !IdentifieR\n",
            ParserOptions::default(),
        )
        .unwrap();
        let tree = parser.parse(input).unwrap();
        assert_eq!(tree.text, input);
        assert!(tree.errors.is_empty());
        let booleans = tree.children_of_kind("Boolean").count();
        let expected = input.split(' ').filter(|w| *w == "true" || *w == "false").count();
        assert_eq!(booleans, expected);
    }

    #[rstest]
    #[case("()", &["Parenthesis"])]
    #[case("hola", &["Identifier"])]
    #[case("hola()", &["FunctionName", "Parenthesis"])]
    fn test_positive_lookahead(#[case] input: &str, #[case] kinds: &[&str]) {
        let parser = parser(
            "Document ::= ((FunctionName | Identifier | Parenthesis) \" \"*)+\nIdentifier ::= [a-zA-Z_]+\nFunctionName ::= Identifier &\"(\"\nParenthesis ::= \"(\" (!\")\" [.])* \")\"\n",
            ParserOptions::default(),
        )
        .unwrap();
        let tree = parser.parse(input).unwrap();
        assert!(tree.rest.is_empty());
        let found: Vec<_> = tree.children.iter().filter_map(|c| c.kind()).collect();
        assert_eq!(found, kinds);
    }

    #[test]
    fn test_unresolved_input() {
        let parser = parser("Document ::= Word EOF\nWord ::= [a-z]+\n", ParserOptions::default()).unwrap();
        assert!(parser.parse("abc").unwrap().errors.is_empty());
        assert_eq!(
            parser.parse("123").unwrap_err(),
            ParseFailure::NotResolved {
                rule: "Document".into()
            }
        );
    }

    #[test]
    fn test_emit() {
        let rules = get_rules("A ::= B 'x' C?\nB ::= [a-z]+ | #x20\nC ::= (B | A)*\n").unwrap();
        assert_eq!(
            emit(&rules),
            "A ::= B \"x\" C?\nB ::= [a-z]+ | #x20\nC ::= (B | A)*\n"
        );
    }

    #[test]
    fn test_emit_recovery_as_comment() {
        let rules = vec![Rule::new("A", vec![symbols!["\"a\""]]).with_recovery("B")];
        assert_eq!(emit(&rules), "A ::= \"a\" /* { recoverUntil=B } */\n");
    }
}
