//! Rule table construction and validation
//!
//! [`RuleTable::build`] takes the rules as written and either returns a
//! validated, immutable table or a [`ConstructionError`] listing every problem
//! found. Validation never stops at the first problem.
//!
//! Besides validating, the table resolves every symbol once: literals are
//! decoded, rule references become indices, and the reserved `EOF` name becomes
//! its own target. The engine then never looks anything up by name.

use super::{decode_literal, Descriptor, Pattern, Rule, Symbol, EOF};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// One validation failure
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Problem {
    DuplicateRule(String),
    EmptyRule(String),
    LeftRecursion(String),
    /// A cycle of rules reaching each other through their first symbols
    IndirectLeftRecursion(Vec<String>),
    UndefinedRule { rule: String, reference: String },
    MissingWhitespaceRule { rule: String, whitespace: String },
    UndefinedRecoveryTarget { rule: String, target: String },
    RepeatedLookahead { rule: String, symbol: String },
    NoEntryRule,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::DuplicateRule(name) => write!(f, "Duplicated rule {name}"),
            Problem::EmptyRule(name) => write!(f, "Missing rule content, rule: {name}"),
            Problem::LeftRecursion(name) => {
                write!(f, "Left recursion is not allowed, rule: {name}")
            }
            Problem::IndirectLeftRecursion(cycle) => write!(
                f,
                "Indirect left recursion is not allowed: {} -> {}",
                cycle.join(" -> "),
                cycle.first().map(String::as_str).unwrap_or_default()
            ),
            Problem::UndefinedRule { rule, reference } => {
                write!(f, "Missing rule {reference} (referenced by {rule})")
            }
            Problem::MissingWhitespaceRule { rule, whitespace } => write!(
                f,
                "Rule {rule} uses implicit whitespace but rule {whitespace} is not defined"
            ),
            Problem::UndefinedRecoveryTarget { rule, target } => {
                write!(f, "Missing recovery rule {target} (used by {rule})")
            }
            Problem::RepeatedLookahead { rule, symbol } => {
                write!(f, "Lookahead {symbol} cannot repeat, rule: {rule}")
            }
            Problem::NoEntryRule => write!(f, "No rule can be used as entry point"),
        }
    }
}

/// Aggregate error returned when a rule table fails validation
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructionError {
    pub problems: Vec<Problem>,
}

impl ConstructionError {
    pub fn contains(&self, problem: &Problem) -> bool {
        self.problems.contains(problem)
    }
}

impl fmt::Display for ConstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Invalid grammar ({} problems):", self.problems.len())?;
        for problem in &self.problems {
            writeln!(f, "  {problem}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConstructionError {}

/// What a phase matches, resolved at construction
#[derive(Debug, Clone)]
pub(crate) enum Target {
    Rule(usize),
    Literal(String),
    Pattern(Pattern),
    Eof,
}

/// A resolved phase: its decoration plus its target
#[derive(Debug, Clone)]
pub(crate) struct Phase {
    pub descriptor: Descriptor,
    pub target: Target,
}

/// A validated, read-only rule table
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
    index: HashMap<String, usize>,
    phases: Vec<Vec<Vec<Phase>>>,
    whitespace: Option<usize>,
}

impl RuleTable {
    /// Validate `rules` and resolve their symbols.
    ///
    /// The rule named `whitespace_rule` is the one injected between phases of
    /// rules with implicit whitespace; it never uses implicit whitespace itself.
    pub fn build(rules: Vec<Rule>, whitespace_rule: &str) -> Result<Self, ConstructionError> {
        let mut problems = Problems::default();
        let mut rules = rules;

        let mut index = HashMap::new();
        for (i, rule) in rules.iter_mut().enumerate() {
            if rule.name == whitespace_rule {
                rule.implicit_whitespace = Some(false);
            }
            if index.contains_key(&rule.name) {
                problems.push(Problem::DuplicateRule(rule.name.clone()));
            } else {
                index.insert(rule.name.clone(), i);
            }
        }

        let whitespace = index.get(whitespace_rule).copied();
        let mut phases = Vec::with_capacity(rules.len());

        for rule in &rules {
            if rule.alternatives.is_empty() || rule.alternatives.iter().all(Vec::is_empty) {
                problems.push(Problem::EmptyRule(rule.name.clone()));
            }

            for alternative in &rule.alternatives {
                if alternative.first().and_then(Symbol::rule_name) == Some(rule.name.as_str()) {
                    problems.push(Problem::LeftRecursion(rule.name.clone()));
                }
            }

            if rule.implicit_whitespace == Some(true) && whitespace.is_none() {
                problems.push(Problem::MissingWhitespaceRule {
                    rule: rule.name.clone(),
                    whitespace: whitespace_rule.to_string(),
                });
            }

            if let Some(target) = &rule.recover_to {
                if !index.contains_key(target) {
                    problems.push(Problem::UndefinedRecoveryTarget {
                        rule: rule.name.clone(),
                        target: target.clone(),
                    });
                }
            }

            let resolved = rule
                .alternatives
                .iter()
                .map(|alternative| {
                    alternative
                        .iter()
                        .filter_map(|symbol| resolve(rule, symbol, &index, &mut problems))
                        .collect()
                })
                .collect();
            phases.push(resolved);
        }

        for cycle in first_symbol_cycles(&phases, &rules) {
            problems.push(Problem::IndirectLeftRecursion(cycle));
        }

        if !rules.iter().any(Rule::is_entry_candidate) {
            problems.push(Problem::NoEntryRule);
        }

        if !problems.list.is_empty() {
            return Err(ConstructionError {
                problems: problems.list,
            });
        }

        Ok(RuleTable {
            rules,
            index,
            phases,
            whitespace,
        })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.index_of(name).map(|i| &self.rules[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// The first rule that is neither a fragment nor a `%` helper
    pub fn entry_rule(&self) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.is_entry_candidate())
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn rule_at(&self, index: usize) -> &Rule {
        &self.rules[index]
    }

    pub(crate) fn alternatives(&self, index: usize) -> &[Vec<Phase>] {
        &self.phases[index]
    }

    pub(crate) fn whitespace(&self) -> Option<usize> {
        self.whitespace
    }
}

#[derive(Default)]
struct Problems {
    list: Vec<Problem>,
    seen: HashSet<Problem>,
}

impl Problems {
    fn push(&mut self, problem: Problem) {
        if self.seen.insert(problem.clone()) {
            self.list.push(problem);
        }
    }
}

fn resolve(
    rule: &Rule,
    symbol: &Symbol,
    index: &HashMap<String, usize>,
    problems: &mut Problems,
) -> Option<Phase> {
    let (descriptor, target) = match symbol {
        Symbol::Literal(value) => (
            Descriptor::plain(symbol.to_string()),
            Target::Literal(value.clone()),
        ),
        Symbol::Pattern(pattern) => (
            Descriptor::plain(pattern.as_str()),
            Target::Pattern(pattern.clone()),
        ),
        Symbol::Reference(descriptor) => {
            let target = if descriptor.name == EOF {
                Target::Eof
            } else if descriptor.is_literal() {
                Target::Literal(decode_literal(&descriptor.name))
            } else if let Some(&i) = index.get(&descriptor.name) {
                Target::Rule(i)
            } else {
                problems.push(Problem::UndefinedRule {
                    rule: rule.name.clone(),
                    reference: descriptor.name.clone(),
                });
                return None;
            };
            (descriptor.clone(), target)
        }
    };

    if descriptor.is_lookahead() && descriptor.allows_repetition() {
        problems.push(Problem::RepeatedLookahead {
            rule: rule.name.clone(),
            symbol: descriptor.to_string(),
        });
    }

    Some(Phase { descriptor, target })
}

/// Find cycles of two or more rules linked through first symbols.
///
/// Each cycle is reported once, starting from its earliest declared rule.
fn first_symbol_cycles(phases: &[Vec<Vec<Phase>>], rules: &[Rule]) -> Vec<Vec<String>> {
    let edges: Vec<Vec<usize>> = phases
        .iter()
        .map(|alternatives| {
            alternatives
                .iter()
                .filter_map(|phases| match phases.first().map(|p| &p.target) {
                    Some(Target::Rule(i)) => Some(*i),
                    _ => None,
                })
                .collect()
        })
        .collect();

    let mut cycles = Vec::new();
    let mut seen: HashSet<Vec<usize>> = HashSet::new();

    for start in 0..edges.len() {
        let mut path = vec![start];
        let mut visited = HashSet::from([start]);
        if let Some(cycle) = walk_back_to(start, start, &edges, &mut path, &mut visited) {
            let mut key = cycle.clone();
            key.sort_unstable();
            if seen.insert(key) {
                cycles.push(cycle.iter().map(|&i| rules[i].name.clone()).collect());
            }
        }
    }

    cycles
}

fn walk_back_to(
    start: usize,
    current: usize,
    edges: &[Vec<usize>],
    path: &mut Vec<usize>,
    visited: &mut HashSet<usize>,
) -> Option<Vec<usize>> {
    for &next in &edges[current] {
        if next == start {
            if path.len() >= 2 {
                return Some(path.clone());
            }
            continue;
        }
        if visited.insert(next) {
            path.push(next);
            if let Some(cycle) = walk_back_to(start, next, edges, path, visited) {
                return Some(cycle);
            }
            path.pop();
        }
    }
    None
}
