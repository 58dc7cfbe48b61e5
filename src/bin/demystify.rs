//! Command-line interface for demystify
//! Normalizes and parses card text from a card catalog dump (a JSON array of card records).
//!
//! Usage:
//!   demystify normalize `<cards.json>` [--parallel]  - Print every card's normalized text as JSON
//!   demystify parse `<rule>` `<text>`                 - Parse one text from an entry rule, print the model
//!   demystify check `<cards.json>` [--parallel]      - Parse every card and print the parseable ratio
//!
//! Global flags: `--debug` (debug logging), `--config <file>` (layered over the defaults;
//! without it `./demystify.toml` is layered when present).

use clap::{Arg, ArgAction, ArgMatches, Command};
use demystify::building::ModelBuilder;
use demystify::card::{CardRecord, Catalog, NormalizedCard};
use demystify::grammar::{EntryRule, Parser};
use demystify::normalize::{normalize, normalize_type_line};
use demystify::report::{ParseReport, ReportOptions};
use demystify::Error;
use demystify_config::{DemystifyConfig, Loader};
use serde::Serialize;
use tracing::Level;

/// Picked up from the working directory when `--config` isn't given.
const LOCAL_CONFIG: &str = "demystify.toml";

fn main() {
    let matches = Command::new("demystify")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A parser for Magic: The Gathering rules text")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Log at debug level")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Configuration file layered over the defaults")
                .global(true),
        )
        .subcommand(
            Command::new("normalize")
                .about("Normalize every card's text and print it as JSON")
                .arg(cards_arg())
                .arg(parallel_arg()),
        )
        .subcommand(
            Command::new("parse")
                .about("Parse one text from an entry rule and print the model as JSON")
                .arg(
                    Arg::new("rule")
                        .help("Entry rule: mana_cost, type_line or rules_text")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("text")
                        .help("The text to parse")
                        .required(true)
                        .index(2),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Parse every card and report the parseable ratio")
                .arg(cards_arg())
                .arg(parallel_arg()),
        )
        .get_matches();

    let level = if matches.get_flag("debug") {
        Level::DEBUG
    } else {
        Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(matches.get_one::<String>("config"));

    match matches.subcommand() {
        Some(("normalize", normalize_matches)) => {
            let cards = normalize_catalog(&config, normalize_matches);
            print_json(&cards);
        }
        Some(("parse", parse_matches)) => {
            let rule = parse_matches.get_one::<String>("rule").unwrap();
            let text = parse_matches.get_one::<String>("text").unwrap();
            handle_parse_command(&config, rule, text);
        }
        Some(("check", check_matches)) => {
            let cards = normalize_catalog(&config, check_matches);
            let parser = Parser::from_config(&config.parsing);
            let report = ParseReport::run(&parser, &cards, ReportOptions::from(&config.report));
            println!("{}", report);
        }
        _ => unreachable!(),
    }
}

fn cards_arg() -> Arg {
    Arg::new("cards")
        .help("Path to a JSON array of card records")
        .required(true)
        .index(1)
}

fn parallel_arg() -> Arg {
    Arg::new("parallel")
        .long("parallel")
        .help("Normalize cards on all cores")
        .action(ArgAction::SetTrue)
}

fn load_config(path: Option<&String>) -> DemystifyConfig {
    let loader = match path {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new().with_optional_file(LOCAL_CONFIG),
    };
    loader.build().unwrap_or_else(|e| {
        eprintln!("Error loading configuration: {}", e);
        std::process::exit(1);
    })
}

/// Load the catalog file and run both phases over it.
fn normalize_catalog(config: &DemystifyConfig, matches: &ArgMatches) -> Vec<NormalizedCard> {
    let path = matches.get_one::<String>("cards").unwrap();
    let source = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file: {}", e);
        std::process::exit(1);
    });
    let records: Vec<CardRecord> = serde_json::from_str(&source).unwrap_or_else(|e| {
        eprintln!("Error reading card records: {}", e);
        std::process::exit(1);
    });

    let mut catalog = Catalog::from_config(&config.names);
    catalog.load(records);
    if matches.get_flag("parallel") {
        catalog.normalize_all_parallel()
    } else {
        catalog.normalize_all()
    }
}

/// Handle the parse command; prose is normalized first, names are not resolved.
fn handle_parse_command(config: &DemystifyConfig, rule: &str, text: &str) {
    let rule: EntryRule = rule.parse().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    });
    let parser = Parser::from_config(&config.parsing);
    let builder = ModelBuilder::new();
    let result = match rule {
        EntryRule::ManaCost => parser
            .parse(rule, text)
            .map_err(Error::from)
            .and_then(|tree| builder.build_mana_cost(tree).map_err(Error::from))
            .map(|mana| to_json(&mana)),
        EntryRule::TypeLine => parser
            .parse(rule, &normalize_type_line(text))
            .map(|tree| to_json(&builder.build_typeline(tree)))
            .map_err(Error::from),
        EntryRule::RulesText => parser
            .parse(rule, &normalize(text))
            .map_err(Error::from)
            .and_then(|tree| builder.build_rules_text(tree))
            .map(|rules| to_json(&rules)),
    };
    match result {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error serializing output: {}", e);
        std::process::exit(1);
    })
}

fn print_json<T: Serialize>(value: &T) {
    println!("{}", to_json(value));
}
