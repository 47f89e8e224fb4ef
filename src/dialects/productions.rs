//! W3C-style productions, shared by the `w3c` and `custom` dialects
//!
//! Both dialects describe a grammar as `Name ::= Choice` productions and only
//! differ in extras (attributes, `~`, literal splitting). This module holds
//! the lexical meta rules they share, the compiler from their parse trees to
//! [`Rule`]s and the emitter back to text.
//!
//! Groups `( ... )` and decorated character classes cannot be expressed as a
//! single symbol, so they become helper rules named `%Parent_N`. Helpers are
//! fragments: they never show up in parse trees, and the emitter inlines them.

use super::{re, GrammarError};
use crate::grammar::{
    is_fragment_name, quote_literal, Pattern, Rule, Symbol,
};
use crate::symbols;
use crate::token::Token;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flavor {
    W3c,
    Custom,
}

/// Plain string literals the custom dialect splits into one pattern per char
static SPLITTABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^['"/()a-zA-Z0-9&_.:=,+*\-\^\\]+$"#).unwrap());

static CHAR_CODES: Lazy<[(Regex, &'static str); 4]> = Lazy::new(|| {
    [
        (Regex::new(r"#x([a-zA-Z0-9]{4})").unwrap(), r"\u${1}"),
        (Regex::new(r"#x([a-zA-Z0-9]{3})").unwrap(), r"\u0${1}"),
        (Regex::new(r"#x([a-zA-Z0-9]{2})").unwrap(), r"\x${1}"),
        (Regex::new(r"#x([a-zA-Z0-9]{1})").unwrap(), r"\x0${1}"),
    ]
});

static ESCAPED_CODES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\(?:x([0-9a-fA-F]{2})|u([0-9a-fA-F]{4}))").unwrap());

/// Meta rules for the lexical parts of a production: names, literals, char
/// codes and classes, whitespace, comments and line ends.
pub(crate) fn lexical_rules(pin_strings: bool) -> Vec<Rule> {
    let mut string_literal = Rule::new(
        "StringLiteral",
        vec![
            symbols![r#"'"'"#, "%RULE_DoubleQuoted?", r#"'"'"#],
            symbols![r#""'""#, "%RULE_SingleQuoted?", r#""'""#],
        ],
    );
    if pin_strings {
        string_literal = string_literal.with_pin(1);
    }

    vec![
        Rule::new("NCName", vec![symbols![re("[a-zA-Z][a-zA-Z_0-9]*")]]),
        string_literal,
        Rule::new("%RULE_DoubleQuoted", vec![symbols![re(r#"[^"]+"#)]]).as_fragment(),
        Rule::new("%RULE_SingleQuoted", vec![symbols![re("[^']+")]]).as_fragment(),
        Rule::new("CharCode", vec![symbols![r##""#x""##, re("[0-9a-zA-Z]+")]]),
        Rule::new(
            "CharClass",
            vec![symbols!["'['", "'^'?", "%RULE_CharClass_1+", r#""]""#]],
        ),
        Rule::new(
            "%RULE_CharClass_1",
            vec![
                symbols!["CharCodeRange"],
                symbols!["CharRange"],
                symbols!["CharCode"],
                symbols!["RULE_Char"],
            ],
        )
        .as_fragment(),
        Rule::new(
            "RULE_Char",
            vec![
                symbols![re(r"\x09")],
                symbols![re(r"\x0A")],
                symbols![re(r"\x0D")],
                symbols![re(r"[\x20-\x5c]")],
                symbols![re(r"[\x5e-\uD7FF]")],
                symbols![re(r"[\uE000-\uFFFD]")],
            ],
        ),
        Rule::new("CharRange", vec![symbols!["RULE_Char", r#""-""#, "RULE_Char"]]),
        Rule::new("CharCodeRange", vec![symbols!["CharCode", r#""-""#, "CharCode"]]),
        Rule::new(
            "RULE_WHITESPACE",
            vec![
                symbols!["%RULE_WHITESPACE_CHAR*"],
                symbols!["Comment", "RULE_WHITESPACE*"],
            ],
        ),
        Rule::new(
            "RULE_S",
            vec![
                symbols!["RULE_WHITESPACE", "RULE_S*"],
                symbols!["RULE_EOL", "RULE_S*"],
            ],
        ),
        Rule::new(
            "%RULE_WHITESPACE_CHAR",
            vec![symbols![re(r"\x09")], symbols![re(r"\x20")]],
        )
        .as_fragment(),
        Rule::new(
            "Comment",
            vec![symbols![r#""/*""#, "%RULE_Comment_Body*", r#""*/""#]],
        ),
        Rule::new(
            "%RULE_Comment_Body",
            vec![symbols![r#"!"*/""#, re("(?s:.)")]],
        )
        .as_fragment(),
        Rule::new(
            "RULE_EOL",
            vec![
                symbols![re(r"\x0D"), re(r"\x0A")],
                symbols![re(r"\x0A")],
                symbols![re(r"\x0D")],
            ],
        ),
        Rule::new("%EndOfProduction", vec![symbols!["RULE_EOL+"], symbols!["EOF"]]).as_fragment(),
    ]
}

type Attributes = HashMap<String, String>;

/// Compile a parsed grammar (a `Grammar` token) into rules
pub(crate) fn compile(ast: &Token, flavor: Flavor) -> Result<Vec<Rule>, GrammarError> {
    let global = read_attributes(ast.first_child_of_kind("Attributes"))?;
    let mut compiler = Compiler {
        flavor,
        rules: Vec::new(),
        helpers: 0,
    };

    for production in ast.children_of_kind("Production") {
        let name = child_text(production, "NCName");
        compiler.production(production, name, None)?;
    }

    let mut rules = compiler.rules;
    if global.get("ws").map(String::as_str) == Some("implicit") {
        for rule in rules.iter_mut().filter(|r| r.implicit_whitespace.is_none()) {
            rule.implicit_whitespace = Some(true);
        }
    }
    Ok(rules)
}

fn child_text(token: &Token, kind: &str) -> String {
    token
        .first_child_of_kind(kind)
        .map(|child| child.text.clone())
        .unwrap_or_default()
}

fn read_attributes(node: Option<&Token>) -> Result<Attributes, GrammarError> {
    let mut attributes = Attributes::new();
    let Some(node) = node else {
        return Ok(attributes);
    };

    for attribute in node.children_of_kind("Attribute") {
        let name = child_text(attribute, "NCName");
        let value = child_text(attribute, "AttributeValue");
        if attributes.insert(name.clone(), value).is_some() {
            return Err(GrammarError::DuplicateAttribute { name });
        }
    }
    Ok(attributes)
}

struct Compiler {
    flavor: Flavor,
    rules: Vec<Rule>,
    helpers: usize,
}

impl Compiler {
    fn helper_name(&mut self, parent: &str) -> String {
        let name = format!("%{}_{}", parent.trim_start_matches('%'), self.helpers);
        self.helpers += 1;
        name
    }

    /// Compile a production or group. Groups inherit the attribute scope of
    /// the production they appear in.
    fn production(
        &mut self,
        token: &Token,
        name: String,
        inherited: Option<&Attributes>,
    ) -> Result<(), GrammarError> {
        let own = read_attributes(token.first_child_of_kind("Attributes"))?;
        let scope = inherited.unwrap_or(&own).clone();

        let mut alternatives = Vec::new();
        for sequence in token.children_of_kind("SequenceOrDifference") {
            alternatives.push(self.sequence(sequence, &name, &scope)?);
        }

        let mut rule = Rule::new(name, alternatives);
        rule.fragment = is_fragment_name(&rule.name) || flag(&own, "fragment");
        rule.collapse_single_child = flag(&own, "simplifyWhenOneChildren");

        if let Some(target) = own.get("recoverUntil") {
            single_alternative(&rule, "recoverUntil")?;
            rule.recover_to = Some(target.clone());
        }

        if let Some(pin) = own.get("pin") {
            single_alternative(&rule, "pin")?;
            let phase = pin.parse::<usize>().map_err(|_| GrammarError::InvalidAttribute {
                rule: rule.name.clone(),
                attribute: "pin".into(),
                reason: format!("{pin:?} is not a phase number"),
            })?;
            rule.pin_at = Some(phase);
        }

        if let Some(ws) = scope.get("ws") {
            rule.implicit_whitespace = Some(ws != "explicit");
        }

        self.rules.push(rule);
        Ok(())
    }

    fn sequence(
        &mut self,
        sequence: &Token,
        parent: &str,
        scope: &Attributes,
    ) -> Result<Vec<Symbol>, GrammarError> {
        let items = &sequence.children;
        let mut symbols = Vec::new();

        for (i, item) in items.iter().enumerate() {
            let suffix = items
                .get(i + 1)
                .filter(|next| next.is("PrimaryDecoration"))
                .map_or("", |next| next.text.as_str());
            let prefix = match i.checked_sub(1).map(|j| &items[j]) {
                Some(previous) if previous.is("PrimaryPreDecoration") => {
                    if previous.text == "~" {
                        "@"
                    } else {
                        previous.text.as_str()
                    }
                }
                _ => "",
            };

            match item.kind().unwrap_or_default() {
                "Minus" => {
                    return Err(GrammarError::UnsupportedDifference {
                        rule: parent.to_string(),
                    })
                }
                "PrimaryDecoration" | "PrimaryPreDecoration" => {}
                "NCName" => symbols.push(Symbol::parse(&format!("{prefix}{}{suffix}", item.text))),
                "SubItem" => {
                    let name = self.helper_name(parent);
                    self.production(item, name.clone(), Some(scope))?;
                    symbols.push(Symbol::parse(&format!("{prefix}{name}{suffix}")));
                }
                "StringLiteral" => {
                    let decorated = !prefix.is_empty() || !suffix.is_empty();
                    if self.flavor == Flavor::Custom && !decorated {
                        symbols.extend(split_literal(&item.text, flag(scope, "ignoreCase"))?);
                    } else {
                        symbols.push(Symbol::parse(&format!("{prefix}{}{suffix}", item.text)));
                    }
                }
                "CharCode" | "CharClass" => {
                    let pattern = Pattern::new(&expand_char_codes(&item.text))?;
                    if prefix.is_empty() && suffix.is_empty() {
                        symbols.push(Symbol::Pattern(pattern));
                    } else {
                        let name = self.helper_name(parent);
                        // A token helper never skips whitespace unless its production does.
                        let helper = Rule::new(name.clone(), vec![vec![Symbol::Pattern(pattern)]])
                            .as_fragment()
                            .with_implicit_whitespace(scope.get("ws").is_some_and(|ws| ws != "explicit"));
                        self.rules.push(helper);
                        symbols.push(Symbol::parse(&format!("{prefix}{name}{suffix}")));
                    }
                }
                other => {
                    return Err(GrammarError::UnexpectedNode {
                        kind: other.to_string(),
                        text: item.text.clone(),
                    })
                }
            }
        }

        Ok(symbols)
    }
}

fn flag(attributes: &Attributes, name: &str) -> bool {
    attributes.get(name).map(String::as_str) == Some("true")
}

fn single_alternative(rule: &Rule, attribute: &str) -> Result<(), GrammarError> {
    if rule.alternatives.len() > 1 {
        return Err(GrammarError::InvalidAttribute {
            rule: rule.name.clone(),
            attribute: attribute.to_string(),
            reason: "only single-alternative productions support it".into(),
        });
    }
    Ok(())
}

/// Split a plain quoted literal into one pattern per character.
/// Literals with characters outside the splittable set stay whole.
fn split_literal(text: &str, ignore_case: bool) -> Result<Vec<Symbol>, GrammarError> {
    let inner = &text[1..text.len() - 1];
    if inner.is_empty() || !SPLITTABLE.is_match(text) {
        return Ok(vec![Symbol::parse(text)]);
    }

    inner
        .chars()
        .map(|c| {
            let source = if ignore_case && c.is_ascii_alphabetic() {
                format!("[{}{}]", c.to_ascii_uppercase(), c.to_ascii_lowercase())
            } else {
                regex::escape(&c.to_string())
            };
            Ok(Symbol::Pattern(Pattern::new(&source)?))
        })
        .collect()
}

/// `#xNN` codes to regex escapes
pub(crate) fn expand_char_codes(text: &str) -> String {
    CHAR_CODES
        .iter()
        .fold(text.to_string(), |acc, (pattern, replacement)| {
            pattern.replace_all(&acc, *replacement).into_owned()
        })
}

/// Regex escapes back to `#xNN` codes
pub(crate) fn restore_char_codes(source: &str) -> String {
    ESCAPED_CODES
        .replace_all(source, |caps: &regex::Captures<'_>| {
            let code = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            format!("#x{code}")
        })
        .into_owned()
}

/// The character a single-character pattern stands for, if it is one
fn single_char(source: &str) -> Option<char> {
    let mut chars = source.chars();
    let c = match (chars.next(), chars.next(), chars.next()) {
        (Some(c), None, _) => c,
        (Some('\\'), Some(c), None) => c,
        _ => return None,
    };
    (regex::escape(&c.to_string()) == source).then_some(c)
}

/// Render rules as production text, one per line
pub(crate) fn emit(rules: &[Rule], flavor: Flavor) -> String {
    let helpers: HashMap<&str, &Rule> = rules
        .iter()
        .filter(|rule| is_fragment_name(&rule.name))
        .map(|rule| (rule.name.as_str(), rule))
        .collect();
    let emitter = Emitter { helpers, flavor };

    let mut out = String::new();
    for rule in rules.iter().filter(|rule| !is_fragment_name(&rule.name)) {
        out.push_str(&format!(
            "{} ::= {}{}\n",
            rule.name,
            emitter.body(rule),
            emitter.trailer(rule)
        ));
    }
    out
}

struct Emitter<'a> {
    helpers: HashMap<&'a str, &'a Rule>,
    flavor: Flavor,
}

impl Emitter<'_> {
    fn body(&self, rule: &Rule) -> String {
        rule.alternatives
            .iter()
            .map(|alternative| {
                alternative
                    .iter()
                    .map(|symbol| self.symbol(symbol))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }

    fn symbol(&self, symbol: &Symbol) -> String {
        match symbol {
            Symbol::Literal(value) => quote_literal(value),
            Symbol::Pattern(pattern) => match single_char(pattern.as_str()) {
                Some(c) => quote_literal(&c.to_string()),
                None => restore_char_codes(pattern.as_str()),
            },
            Symbol::Reference(descriptor) => {
                let prefix = match (self.flavor, descriptor.pin) {
                    (Flavor::Custom, true) => "~",
                    (Flavor::W3c, true) => "",
                    _ => descriptor.prefix(),
                };
                let suffix = descriptor.suffix();
                match self.helpers.get(descriptor.name.as_str()) {
                    Some(helper) if is_lonely(helper) => {
                        format!("{prefix}{}{suffix}", self.body(helper))
                    }
                    Some(helper) => format!("{prefix}({}){suffix}", self.body(helper)),
                    None => format!("{prefix}{}{suffix}", descriptor.name),
                }
            }
        }
    }

    fn trailer(&self, rule: &Rule) -> String {
        match self.flavor {
            Flavor::W3c => rule
                .recover_to
                .as_ref()
                .map(|target| format!(" /* {{ recoverUntil={target} }} */"))
                .unwrap_or_default(),
            Flavor::Custom => {
                let mut attributes = Vec::new();
                if let Some(pin) = rule.pin_at {
                    attributes.push(format!("pin={pin}"));
                }
                if let Some(target) = &rule.recover_to {
                    attributes.push(format!("recoverUntil={target}"));
                }
                match rule.implicit_whitespace {
                    Some(true) => attributes.push("ws=implicit".into()),
                    Some(false) => attributes.push("ws=explicit".into()),
                    None => {}
                }
                if rule.fragment {
                    attributes.push("fragment=true".into());
                }
                if rule.collapse_single_child {
                    attributes.push("simplifyWhenOneChildren=true".into());
                }
                if attributes.is_empty() {
                    String::new()
                } else {
                    format!(" {{ {} }}", attributes.join(", "))
                }
            }
        }
    }
}

/// A helper that is a single terminal can be inlined without parentheses
fn is_lonely(rule: &Rule) -> bool {
    matches!(
        rule.alternatives.as_slice(),
        [alternative] if matches!(alternative.as_slice(), [Symbol::Literal(_) | Symbol::Pattern(_)])
    )
}
