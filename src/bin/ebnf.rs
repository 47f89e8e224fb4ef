//! Command-line interface for ebnf
//! Compiles grammars between notations and parses input files with them.
//!
//! Usage:
//!   ebnf compile `<grammar>` [--dialect `<dialect>`] [--format `<format>`]   - Compile a grammar and print its rules
//!   ebnf parse `<grammar>` `<input>` [--rule `<rule>`] [--format treeviz|json]  - Parse a file with a grammar
//!   ebnf list-formats                                                 - List rule output formats

use clap::{Arg, ArgAction, Command};
use ebnf::dialects::Dialect;
use ebnf::formats::{to_treeviz_str, tree_to_json, FormatRegistry};
use ebnf::parser::{ConsoleTrace, ParserOptions};

fn dialect_arg() -> Arg {
    Arg::new("dialect")
        .long("dialect")
        .short('d')
        .help("Grammar notation: bnf, w3c or custom")
        .default_value("custom")
}

fn main() {
    let matches = Command::new("ebnf")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compile grammars and parse text with them")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("compile")
                .about("Compile a grammar and print its rule table")
                .arg(
                    Arg::new("grammar")
                        .help("Path to the grammar file")
                        .required(true)
                        .index(1),
                )
                .arg(dialect_arg())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format (see list-formats)")
                        .default_value("ebnf"),
                ),
        )
        .subcommand(
            Command::new("parse")
                .about("Parse an input file with a grammar")
                .arg(
                    Arg::new("grammar")
                        .help("Path to the grammar file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("input")
                        .help("Path to the file to parse")
                        .required(true)
                        .index(2),
                )
                .arg(dialect_arg())
                .arg(
                    Arg::new("rule")
                        .long("rule")
                        .short('r')
                        .help("Rule to start from instead of the first one"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Tree output format: treeviz or json")
                        .default_value("treeviz"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .help("YAML file with parser options"),
                )
                .arg(
                    Arg::new("keep-upper-rules")
                        .long("keep-upper-rules")
                        .help("Keep UPPER_SNAKE rules in the tree")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("trace")
                        .long("trace")
                        .help("Print matching steps to stderr")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("list-formats").about("List available rule output formats"))
        .get_matches();

    match matches.subcommand() {
        Some(("compile", compile_matches)) => {
            let grammar = compile_matches.get_one::<String>("grammar").unwrap();
            let dialect = compile_matches.get_one::<String>("dialect").unwrap();
            let format = compile_matches.get_one::<String>("format").unwrap();
            handle_compile_command(grammar, dialect, format);
        }
        Some(("parse", parse_matches)) => {
            let options = ParseCommand {
                grammar: parse_matches.get_one::<String>("grammar").unwrap(),
                input: parse_matches.get_one::<String>("input").unwrap(),
                dialect: parse_matches.get_one::<String>("dialect").unwrap(),
                rule: parse_matches.get_one::<String>("rule").map(String::as_str),
                format: parse_matches.get_one::<String>("format").unwrap(),
                config: parse_matches.get_one::<String>("config").map(String::as_str),
                keep_upper_rules: parse_matches.get_flag("keep-upper-rules"),
                trace: parse_matches.get_flag("trace"),
            };
            handle_parse_command(&options);
        }
        Some(("list-formats", _)) => {
            handle_list_formats_command();
        }
        _ => unreachable!(),
    }
}

fn read_file(path: &str) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {}", path, e);
        std::process::exit(1);
    })
}

fn resolve_dialect(name: &str) -> Dialect {
    Dialect::from_name(name).unwrap_or_else(|| {
        eprintln!("Unknown dialect '{}' (expected bnf, w3c or custom)", name);
        std::process::exit(1);
    })
}

/// Handle the compile command
fn handle_compile_command(grammar: &str, dialect: &str, format: &str) {
    let source = read_file(grammar);
    let rules = resolve_dialect(dialect)
        .get_rules(&source)
        .unwrap_or_else(|e| {
            eprintln!("Grammar error: {}", e);
            std::process::exit(1);
        });

    let output = FormatRegistry::default()
        .serialize(&rules, format)
        .unwrap_or_else(|e| {
            eprintln!("Format error: {}", e);
            std::process::exit(1);
        });

    print!("{}", output);
}

struct ParseCommand<'a> {
    grammar: &'a str,
    input: &'a str,
    dialect: &'a str,
    rule: Option<&'a str>,
    format: &'a str,
    config: Option<&'a str>,
    keep_upper_rules: bool,
    trace: bool,
}

/// Handle the parse command
fn handle_parse_command(command: &ParseCommand<'_>) {
    let mut options = match command.config {
        Some(path) => ParserOptions::from_config_str(&read_file(path)).unwrap_or_else(|e| {
            eprintln!("{}", e);
            std::process::exit(1);
        }),
        None => ParserOptions::default(),
    };
    if command.keep_upper_rules {
        options.keep_upper_rules = true;
    }

    let source = read_file(command.grammar);
    let mut parser = resolve_dialect(command.dialect)
        .parser(&source, options)
        .unwrap_or_else(|e| {
            eprintln!("Grammar error: {}", e);
            std::process::exit(1);
        });
    if command.trace {
        parser = parser.with_trace(ConsoleTrace);
    }

    let input = read_file(command.input);
    let tree = parser.parse_rule(&input, command.rule).unwrap_or_else(|e| {
        eprintln!("Parse failed: {}", e);
        std::process::exit(1);
    });

    let output = match command.format {
        "treeviz" => to_treeviz_str(&tree),
        "json" => tree_to_json(&tree).unwrap_or_else(|e| {
            eprintln!("Format error: {}", e);
            std::process::exit(1);
        }),
        other => {
            eprintln!("Unknown tree format '{}' (expected treeviz or json)", other);
            std::process::exit(1);
        }
    };
    print!("{}", output);

    if !tree.errors.is_empty() {
        for error in &tree.errors {
            eprintln!("{}", error);
        }
        std::process::exit(1);
    }
}

/// Handle the list-formats command
fn handle_list_formats_command() {
    let registry = FormatRegistry::default();
    println!("Available rule formats:\n");
    for name in registry.list_formats() {
        let description = registry.get(&name).map(|f| f.description()).unwrap_or_default();
        println!("  {}", name);
        println!("    {}", description);
    }
}
