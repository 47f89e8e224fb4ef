//! End-to-end parsing scenarios
//!
//! Each test builds a small grammar, parses one input and checks the
//! normalized tree: text, offsets, errors and remaining input.

use ebnf::dialects::{custom, w3c};
use ebnf::grammar::{Pattern, Problem};
use ebnf::token::{ParseErrorKind, SYNTAX_ERROR};
use ebnf::{symbols, ParseFailure, Parser, ParserOptions, Rule};

fn custom_parser(grammar: &str) -> Parser {
    custom::parser(grammar, ParserOptions::default()).unwrap()
}

fn kinds(children: &[ebnf::Token]) -> Vec<&str> {
    children.iter().filter_map(|child| child.kind()).collect()
}

#[test]
fn test_literal_then_repeated_spaces() {
    let parser = custom_parser("Greeting ::= \"hi\" \" \"*\n");
    let tree = parser.parse("hi   ").unwrap();

    assert!(tree.is("Greeting"));
    assert_eq!(tree.text, "hi   ");
    assert_eq!(tree.span(), 0..5);
    assert!(tree.children.is_empty());
    assert!(tree.errors.is_empty());
    assert!(tree.rest.is_empty());
}

#[test]
fn test_trailing_input_is_reported() {
    let parser = custom_parser("Digits ::= [0-9]+\n");
    let tree = parser.parse("123abc").unwrap();

    assert_eq!(tree.text, "123");
    assert_eq!(tree.rest, "abc");
    assert_eq!(tree.errors.len(), 1);
    assert_eq!(tree.errors[0].kind, ParseErrorKind::TrailingInput);
    assert_eq!(tree.errors[0].text, "abc");
    assert_eq!(tree.errors[0].span(), 3..6);
}

#[test]
fn test_pinned_failure_becomes_syntax_error() {
    let parser = custom_parser("A ::= \"x\" B { pin=1 }\nB ::= \"y\"\n");
    let tree = parser.parse("xz").unwrap();

    assert!(tree.is("A"));
    assert_eq!(tree.text, "xz");
    assert!(tree.rest.is_empty());
    assert_eq!(kinds(&tree.children), vec![SYNTAX_ERROR]);
    assert_eq!(tree.children[0].span(), 1..2);

    assert_eq!(tree.errors.len(), 1);
    let error = &tree.errors[0];
    assert_eq!(error.kind, ParseErrorKind::Expected);
    assert_eq!(error.expected.as_deref(), Some("B"));
    assert_eq!(error.text, "z");
    assert_eq!(error.span(), 1..2);
}

#[test]
fn test_pin_commits_to_first_alternative() {
    let parser = Parser::new(vec![
        Rule::new(
            "A",
            vec![symbols!["\"x\"", "B"], symbols!["\"x\"", "\"z\""]],
        )
        .with_pin(1),
        Rule::new("B", vec![symbols!["\"y\""]]),
    ])
    .unwrap();

    // The second alternative would match "xz" cleanly, but is never tried.
    let tree = parser.parse("xz").unwrap();
    assert_eq!(tree.errors.len(), 1);
    assert!(tree.children[0].is_syntax_error());

    let unpinned = Parser::new(vec![
        Rule::new(
            "A",
            vec![symbols!["\"x\"", "B"], symbols!["\"x\"", "\"z\""]],
        ),
        Rule::new("B", vec![symbols!["\"y\""]]),
    ])
    .unwrap();
    let tree = unpinned.parse("xz").unwrap();
    assert!(tree.errors.is_empty());
    assert!(tree.children.is_empty());
}

#[test]
fn test_recovery_resumes_at_sync_point() {
    let parser = custom_parser(
        "Items ::= Item+\n\
         Item ::= Space? True { recoverUntil=Space }\n\
         True ::= \"true\"\n\
         Space ::= \" \"+\n",
    );
    let tree = parser.parse("truegarbage true").unwrap();

    assert_eq!(tree.text, "truegarbage true");
    assert!(tree.rest.is_empty());
    assert_eq!(tree.children_of_kind("Item").count(), 3);

    assert_eq!(tree.errors.len(), 1);
    let error = &tree.errors[0];
    assert_eq!(error.kind, ParseErrorKind::UnexpectedInput);
    assert_eq!(error.text, "garbage");
    assert_eq!(error.span(), 4..11);
    assert_eq!(&tree.text[error.span()], error.text);

    let last = tree.children.last().unwrap();
    assert_eq!(kinds(&last.children), vec!["Space", "True"]);
    assert_eq!(last.span(), 11..16);
}

#[test]
fn test_recovery_skips_nothing_when_target_is_next() {
    let parser = Parser::new(vec![
        Rule::new("Doc", vec![symbols!["Item", "Sep"]]),
        Rule::new("Item", vec![symbols!["\"a\"", "\"b\""]]).with_recovery("Sep"),
        Rule::new("Sep", vec![symbols!["\";\""]]),
    ])
    .unwrap();

    // The separator right after "a" must not be swallowed as bad input.
    assert_eq!(
        parser.parse("a;;"),
        Err(ParseFailure::NotResolved { rule: "Doc".into() })
    );
    assert!(parser.parse("ab;").unwrap().errors.is_empty());
}

#[test]
fn test_pin_wins_over_recovery() {
    let parser = Parser::new(vec![
        Rule::new("A", vec![symbols!["\"x\"", "\"y\"", "\";\""]])
            .with_pin(1)
            .with_recovery("Semi"),
        Rule::new("Semi", vec![symbols!["\";\""]]),
    ])
    .unwrap();
    let tree = parser.parse("xz;").unwrap();

    assert_eq!(tree.text, "xz;");
    assert!(tree.rest.is_empty());
    assert_eq!(tree.errors.len(), 1);
    assert_eq!(tree.errors[0].kind, ParseErrorKind::Expected);
    assert_eq!(tree.errors[0].span(), 1..3);
    assert!(tree
        .errors
        .iter()
        .all(|error| error.kind != ParseErrorKind::UnexpectedInput));
}

#[test]
fn test_empty_literal_contributes_nothing() {
    let parser = custom_parser("Seq ::= Empty \"a\"\nEmpty ::= \"\"\n");
    let tree = parser.parse("a").unwrap();

    assert_eq!(tree.text, "a");
    assert!(tree.errors.is_empty());
    let empty = tree.first_child_of_kind("Empty").unwrap();
    assert_eq!(empty.span(), 0..0);
    assert_eq!(empty.text, "");
}

#[test]
fn test_duplicate_rule_rejected() {
    let err = Parser::new(vec![
        Rule::new("Foo", vec![symbols!["\"a\""]]),
        Rule::new("Foo", vec![symbols!["\"b\""]]),
    ])
    .unwrap_err();

    assert!(err.contains(&Problem::DuplicateRule("Foo".into())));
    assert!(err.to_string().contains("Duplicated rule Foo"));
}

#[test]
fn test_fragment_children_take_its_place() {
    let parser = Parser::new(vec![
        Rule::new("Doc", vec![symbols!["Pair+"]]),
        Rule::new("Pair", vec![symbols!["Key", "\"=\"", "Key"]]).as_fragment(),
        Rule::new("Key", vec![symbols![Pattern::new("[a-z]").unwrap()]]),
    ])
    .unwrap();
    let tree = parser.parse("a=bc=d").unwrap();

    assert!(tree.find("Pair").is_none());
    let spans: Vec<_> = tree.children.iter().map(|child| child.span()).collect();
    assert_eq!(spans, vec![0..1, 2..3, 3..4, 5..6]);
    for child in &tree.children {
        assert_eq!(&tree.text[child.span()], child.text);
    }
}

#[test]
fn test_collapsed_rule_never_wraps_one_child() {
    let parser = Parser::new(vec![
        Rule::new("Doc", vec![symbols!["Value+"]]),
        Rule::new("Value", vec![symbols!["Number"], symbols!["Word"]]).collapsing(),
        Rule::new("Number", vec![symbols![Pattern::new("[0-9]+").unwrap()]]),
        Rule::new("Word", vec![symbols![Pattern::new("[a-z]+").unwrap()]]),
    ])
    .unwrap();
    let tree = parser.parse("ab12").unwrap();

    assert_eq!(kinds(&tree.children), vec!["Word", "Number"]);
    assert_eq!(tree.children[1].span(), 2..4);
    assert!(tree.find("Value").is_none());
}

#[test]
fn test_explicit_target_rule() {
    let parser = w3c::parser("Doc ::= Word+\nWord ::= [a-z]\n", ParserOptions::default()).unwrap();
    let tree = parser.parse_rule("x", Some("Word")).unwrap();
    assert!(tree.is("Word"));
    assert!(tree.children.is_empty());
}

#[test]
fn test_implicit_whitespace_from_grammar_attribute() {
    let parser = custom::parser(
        "{ ws=implicit }\n\
         List ::= \"[\" Number (\",\" Number)* \"]\"\n\
         Number ::= [0-9]+ { ws=explicit }\n\
         WS ::= [ \\t\\n]+\n",
        ParserOptions::default().keep_upper_rules(true),
    )
    .unwrap();
    let tree = parser.parse("[ 1 ,\n 22 ]").unwrap();

    assert!(tree.errors.is_empty(), "{:?}", tree.errors);
    assert_eq!(tree.children_of_kind("Number").count(), 2);
    assert_eq!(tree.children_of_kind("WS").count(), 4);
    let number = tree.children_of_kind("Number").last().unwrap();
    assert_eq!(number.text, "22");
    assert_eq!(number.span(), 7..9);
}
