//! Attributed EBNF
//!
//! W3C EBNF plus parser controls:
//!
//!     { ws=implicit }                          grammar-wide attributes
//!     List  ::= "[" ~Item ("," Item)* "]"       `~` pins the sequence at Item
//!     Item  ::= Key | Word { simplifyWhenOneChildren=true }
//!     Stmt  ::= Expr ";" { pin=1, recoverUntil=Semi }
//!     Key   ::= 'null' { ignoreCase=true, fragment=true }
//!
//! Production attributes: `pin=N`, `recoverUntil=Rule`, `ws=implicit|explicit`,
//! `fragment=true`, `simplifyWhenOneChildren=true`, `ignoreCase=true`. Groups
//! inherit the attributes of their production. The only grammar-wide
//! attribute is `ws=implicit`, the default for productions that do not say.
//!
//! Plain short literals made of identifier and punctuation characters are
//! matched character by character, which is what lets `ignoreCase` work.

use super::productions::{self, Flavor};
use super::{parse_grammar, re, GrammarError};
use crate::grammar::Rule;
use crate::parser::{Parser, ParserOptions};
use crate::symbols;
use once_cell::sync::Lazy;

/// Meta rules that parse attributed EBNF grammar text
pub static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    let mut rules = vec![
        Rule::new(
            "Grammar",
            vec![symbols!["RULE_S*", "Attributes?", "RULE_S*", "%Atomic*", "EOF"]],
        ),
        Rule::new("%Atomic", vec![symbols!["Production", "RULE_S*"]]).as_fragment(),
        Rule::new(
            "Production",
            vec![symbols![
                "NCName",
                "RULE_S*",
                r#""::=""#,
                "RULE_WHITESPACE*",
                "%Choice",
                "RULE_WHITESPACE*",
                "Attributes?",
                "%EndOfProduction",
                "RULE_S*"
            ]],
        ),
        Rule::new(
            "Attributes",
            vec![symbols![r#""{""#, "Attribute", "%Attributes*", "RULE_S*", r#""}""#]],
        ),
        Rule::new(
            "%Attributes",
            vec![symbols!["RULE_S*", r#"",""#, "Attribute"]],
        )
        .as_fragment(),
        Rule::new(
            "Attribute",
            vec![symbols![
                "RULE_S*",
                "NCName",
                "RULE_WHITESPACE*",
                r#""=""#,
                "RULE_WHITESPACE*",
                "AttributeValue"
            ]],
        ),
        Rule::new(
            "AttributeValue",
            vec![symbols!["NCName"], symbols![re("[1-9][0-9]*")]],
        ),
        Rule::new("%Choice", vec![symbols!["SequenceOrDifference", "%_Choice_1*"]]).as_fragment(),
        Rule::new(
            "%_Choice_1",
            vec![symbols!["RULE_S*", r#""|""#, "RULE_S*", "SequenceOrDifference"]],
        )
        .as_fragment(),
        Rule::new(
            "SequenceOrDifference",
            vec![symbols!["%Item", "RULE_WHITESPACE*", "%_Item_1?"]],
        ),
        Rule::new(
            "%_Item_1",
            vec![symbols!["Minus", "%Item"], symbols!["%Item*"]],
        )
        .as_fragment(),
        Rule::new("Minus", vec![symbols![r#""-""#]]),
        Rule::new(
            "%Item",
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
            vec![symbols![r#""&""#], symbols![r#""!""#], symbols![r#""~""#]],
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
            vec![symbols![r#""(""#, "RULE_S*", "%Choice", "RULE_S*", r#"")""#]],
        ),
    ];
    rules.extend(productions::lexical_rules(false));
    rules
});

static META: Lazy<Parser> =
    Lazy::new(|| Parser::new(RULES.clone()).expect("attributed EBNF meta grammar is valid"));

/// Compile attributed EBNF text into rules
pub fn get_rules(source: &str) -> Result<Vec<Rule>, GrammarError> {
    let ast = parse_grammar(&META, source)?;
    productions::compile(&ast, Flavor::Custom)
}

pub fn parser(source: &str, options: ParserOptions) -> Result<Parser, GrammarError> {
    Ok(Parser::with_options(get_rules(source)?, options)?)
}

/// Render rules as attributed EBNF; `get_rules` reads the output back into
/// an equivalent table
pub fn emit(rules: &[Rule]) -> String {
    productions::emit(rules, Flavor::Custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Pattern, Symbol};
    use crate::parser::ParseFailure;
    use rstest::rstest;

    fn patterns(sources: &[&str]) -> Vec<Symbol> {
        sources
            .iter()
            .map(|s| Symbol::Pattern(Pattern::new(s).unwrap()))
            .collect()
    }

    const KEYWORDS: &str = "
Document          ::= Keyword1 | Keyword2

Keyword1          ::= 'And' | 'Or'
Keyword2          ::= 'Not' | 'Is' {ignoreCase=true}
";

    #[test]
    fn test_literals_split_per_character() {
        let rules = get_rules(KEYWORDS).unwrap();
        assert_eq!(
            rules[1].alternatives,
            vec![patterns(&["A", "n", "d"]), patterns(&["O", "r"])]
        );
        assert_eq!(
            rules[2].alternatives,
            vec![
                patterns(&["[Nn]", "[Oo]", "[Tt]"]),
                patterns(&["[Ii]", "[Ss]"])
            ]
        );
    }

    #[rstest]
    #[case("And", "Keyword1")]
    #[case("Or", "Keyword1")]
    #[case("is", "Keyword2")]
    #[case("IS", "Keyword2")]
    #[case("NoT", "Keyword2")]
    #[case("not", "Keyword2")]
    fn test_keywords(#[case] input: &str, #[case] kind: &str) {
        let parser = parser(KEYWORDS, ParserOptions::default()).unwrap();
        let tree = parser.parse(input).unwrap();
        assert!(tree.errors.is_empty());
        assert_eq!(tree.children.len(), 1);
        assert!(tree.children[0].is(kind));
    }

    #[test]
    fn test_case_sensitive_keyword() {
        let parser = parser(KEYWORDS, ParserOptions::default()).unwrap();
        assert_eq!(
            parser.parse("OR").unwrap_err(),
            ParseFailure::NotResolved {
                rule: "Document".into()
            }
        );
    }

    #[test]
    fn test_attributes() {
        let rules = get_rules(
            "{ ws=implicit }\n\
             List ::= \"[\" Item (\",\" Item)* \"]\" { pin=1 }\n\
             Item ::= Word | Key { simplifyWhenOneChildren=true }\n\
             Word ::= [a-z]+ { ws=explicit, fragment=true }\n\
             Key ::= \"k\" Word { recoverUntil=Word }\n",
        )
        .unwrap();
        let get = |name: &str| rules.iter().find(|r| r.name == name).unwrap();

        assert_eq!(get("List").pin_at, Some(1));
        assert_eq!(get("List").implicit_whitespace, Some(true));
        assert_eq!(get("%List_0").implicit_whitespace, Some(true));
        assert!(get("Item").collapse_single_child);
        assert!(get("Word").fragment);
        assert_eq!(get("Word").implicit_whitespace, Some(false));
        assert_eq!(get("%Word_1").implicit_whitespace, Some(false));
        assert_eq!(get("Key").recover_to.as_deref(), Some("Word"));
    }

    #[test]
    fn test_explicit_token_stops_at_whitespace() {
        let parser = parser(
            "{ ws=implicit }\nList ::= Word+\nWord ::= [a-z]+ { ws=explicit }\nWS ::= #x20+\n",
            ParserOptions::default(),
        )
        .unwrap();
        let tree = parser.parse("ab cd").unwrap();

        let words: Vec<_> = tree.children_of_kind("Word").map(|w| w.text.as_str()).collect();
        assert_eq!(words, vec!["ab", "cd"]);
        assert!(tree.errors.is_empty());
    }

    #[test]
    fn test_whitespace_unset_without_grammar_attribute() {
        let rules = get_rules("A ::= 'a'\n").unwrap();
        assert_eq!(rules[0].implicit_whitespace, None);
    }

    #[test]
    fn test_tilde_pins_reference() {
        let rules = get_rules("A ::= \"x\" ~B \"y\"\nB ::= [0-9]\n").unwrap();
        assert_eq!(
            rules[0].alternatives[0][1],
            Symbol::parse("@B")
        );
    }

    #[rstest]
    #[case("A ::= \"a\" { pin=1, pin=2 }\n", GrammarError::DuplicateAttribute { name: "pin".into() })]
    #[case("{ ws=implicit, ws=explicit }\nA ::= \"a\"\n", GrammarError::DuplicateAttribute { name: "ws".into() })]
    fn test_duplicate_attribute(#[case] source: &str, #[case] expected: GrammarError) {
        assert_eq!(get_rules(source), Err(expected));
    }

    #[rstest]
    #[case("A ::= \"a\" | \"b\" { pin=1 }\n", "pin")]
    #[case("A ::= \"a\" | \"b\" { recoverUntil=B }\nB ::= \"b\"\n", "recoverUntil")]
    #[case("A ::= \"a\" \"b\" { pin=first }\n", "pin")]
    fn test_invalid_attribute(#[case] source: &str, #[case] name: &str) {
        match get_rules(source) {
            Err(GrammarError::InvalidAttribute { rule, attribute, .. }) => {
                assert_eq!(rule, "A");
                assert_eq!(attribute, name);
            }
            other => panic!("expected invalid attribute, got {other:?}"),
        }
    }

    #[test]
    fn test_eof_grammar() {
        let parser = parser(
            "Rule ::= Item* EOF\n\
             Item ::= Space? Rules {recoverUntil=Space, fragment=true}\n\
             Rules ::= \"true\" | \"false\"\n\
             Space ::= \" \"+ | EOF\n",
            ParserOptions::default(),
        )
        .unwrap();
        for input in ["true", "true false true"] {
            let tree = parser.parse(input).unwrap();
            assert!(tree.errors.is_empty(), "{input}");
            assert!(tree.rest.is_empty());
        }
    }

    #[test]
    fn test_pinned_eof() {
        let parser = parser(
            "Rule ::= Rules EOF {pin=1}\nRules ::= \"true\" | \"false\"\n",
            ParserOptions::default(),
        )
        .unwrap();
        assert!(parser.parse("true").unwrap().errors.is_empty());
        let tree = parser.parse("true false true").unwrap();
        assert_eq!(tree.errors.len(), 1);
        assert_eq!(tree.errors[0].span(), 4..15);
    }

    #[test]
    fn test_emit() {
        let rules = get_rules(
            "{ ws=implicit }\n\
             List ::= \"[\" ~Item (\",\" Item)* \"]\" { pin=1 }\n\
             Word ::= [a-zA-Z]+ !\"(\"\n\
             Number ::= \"-\"? [0-9]+ { ws=explicit }\n\
             Key ::= 'Key' { ignoreCase=true, fragment=true }\n",
        )
        .unwrap();
        assert_eq!(
            emit(&rules),
            "List ::= \"[\" ~Item (\",\" Item)* \"]\" { pin=1, ws=implicit }\n\
             Word ::= [a-zA-Z]+ !\"(\" { ws=implicit }\n\
             Number ::= \"-\"? [0-9]+ { ws=explicit }\n\
             Key ::= [Kk] [Ee] [Yy] { ws=implicit, fragment=true }\n"
        );
    }

    #[test]
    fn test_emit_round_trip() {
        let source = "{ ws=implicit }\n\
             List ::= \"[\" ~Item (\",\" Item)* \"]\" { pin=1 }\n\
             Item ::= Word | Number { simplifyWhenOneChildren=true }\n\
             Word ::= [a-zA-Z]+ !\"(\"\n\
             Number ::= \"-\"? ([1-9] [0-9]* | \"0\") { ws=explicit }\n\
             Skip ::= Item Rest { recoverUntil=Rest }\n\
             Rest ::= \";\" | &EOF\n\
             WS ::= [#x20#x09]+\n";
        let emitted = emit(&get_rules(source).unwrap());
        assert_eq!(emit(&get_rules(&emitted).unwrap()), emitted);
    }
}
