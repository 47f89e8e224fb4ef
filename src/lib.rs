//! # ebnf
//!
//! A grammar-driven parsing engine. Hand it a table of named rules and an
//! input string; get back a syntax tree annotated with recoverable errors, or
//! a failure when nothing matches.
//!
//! The same engine parses any textual language: the rule table is data. It can
//! be written by hand with [`grammar::Rule`] and [`symbols!`], or compiled from
//! grammar text by one of the [`dialects`]:
//!
//!     let parser = dialects::custom::parser(r#"
//!         List  ::= Item ("," Item)* EOF
//!         Item  ::= [a-z]+
//!     "#, ParserOptions::default())?;
//!     let tree = parser.parse("a,b,c")?;
//!
//! Layout:
//!     grammar    rules, symbols, descriptors, terminals and the validated table
//!     parser     the matching engine, recovery, tree normalization and tracing
//!     token      the tree and its errors
//!     dialects   BNF, W3C EBNF and attributed EBNF front-ends
//!     formats    rule table and tree output

pub mod dialects;
pub mod formats;
pub mod grammar;
pub mod parser;
pub mod token;

pub use grammar::{ConstructionError, Pattern, Rule, Symbol};
pub use parser::{ParseFailure, Parser, ParserOptions};
pub use token::{ParseError, ParseErrorKind, Token};
