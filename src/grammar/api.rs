//! Two-stage parse driver
//!
//! Text is tokenized once; the declarative stage gets the first try and the
//! combinator grammar is used when it fails or finds the input ambiguous.

use super::combinators::{self, P};
use super::declarative;
use super::ir::ParseNode;
use super::tokens::{tokenize, TokenSpan};
use crate::error::ParseFailure;
use chumsky::Parser as _;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// The grammar rule a parse starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryRule {
    ManaCost,
    TypeLine,
    RulesText,
}

impl EntryRule {
    pub const ALL: [EntryRule; 3] = [
        EntryRule::ManaCost,
        EntryRule::TypeLine,
        EntryRule::RulesText,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntryRule::ManaCost => "mana_cost",
            EntryRule::TypeLine => "type_line",
            EntryRule::RulesText => "rules_text",
        }
    }
}

impl fmt::Display for EntryRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntryRule::ALL
            .into_iter()
            .find(|rule| rule.as_str() == s)
            .ok_or_else(|| format!("unknown entry rule {:?}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Declarative regex patterns over token notation.
    Deterministic,
    /// Backtracking combinator grammar.
    General,
}

/// Outcome of one strategy on one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    Parsed(ParseNode),
    /// The input has more than one reading this strategy can't choose between.
    Ambiguous(String),
    Failed(String),
}

struct GeneralParsers {
    mana_cost: P<ParseNode>,
    type_line: P<ParseNode>,
    rules_text: P<ParseNode>,
}

impl GeneralParsers {
    fn new() -> Self {
        Self {
            mana_cost: combinators::mana_cost(),
            type_line: combinators::type_line(),
            rules_text: combinators::rules_text(),
        }
    }

    fn for_rule(&self, rule: EntryRule) -> &P<ParseNode> {
        match rule {
            EntryRule::ManaCost => &self.mana_cost,
            EntryRule::TypeLine => &self.type_line,
            EntryRule::RulesText => &self.rules_text,
        }
    }
}

thread_local! {
    static GENERAL: GeneralParsers = GeneralParsers::new();
}

/// Run one strategy over already tokenized input.
pub fn parse_tokens(strategy: Strategy, rule: EntryRule, tokens: &[TokenSpan]) -> Attempt {
    match strategy {
        Strategy::Deterministic => declarative::parse(rule, tokens),
        Strategy::General => {
            let result = GENERAL.with(|parsers| parsers.for_rule(rule).parse(tokens.to_vec()));
            match result {
                Ok(node) => Attempt::Parsed(node),
                Err(errors) => Attempt::Failed(describe(&errors)),
            }
        }
    }
}

/// Tokenize `text` and run one strategy over it.
pub fn parse_with(
    strategy: Strategy,
    rule: EntryRule,
    text: &str,
) -> Result<Attempt, ParseFailure> {
    let tokens = tokenize(rule, text)?;
    Ok(parse_tokens(strategy, rule, &tokens))
}

fn describe(errors: &[combinators::ParserError]) -> String {
    match errors.first().map(|e| e.found()) {
        Some(Some((token, range))) => {
            format!("unexpected {:?} at {}", token.to_string(), range.start)
        }
        Some(None) => "unexpected end of input".to_string(),
        None => "no parse".to_string(),
    }
}

/// The two-stage driver.
#[derive(Debug, Clone, Copy)]
pub struct Parser {
    deterministic_first: bool,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            deterministic_first: true,
        }
    }
}

impl Parser {
    pub fn new(deterministic_first: bool) -> Self {
        Self {
            deterministic_first,
        }
    }

    pub fn from_config(config: &demystify_config::ParsingConfig) -> Self {
        Self::new(config.deterministic_first)
    }

    pub fn parse(&self, rule: EntryRule, text: &str) -> Result<ParseNode, ParseFailure> {
        let tokens = tokenize(rule, text)?;
        if self.deterministic_first {
            match declarative::parse(rule, &tokens) {
                Attempt::Parsed(node) => return Ok(node),
                Attempt::Ambiguous(reason) | Attempt::Failed(reason) => {
                    debug!(%rule, %reason, "falling back to the general grammar");
                }
            }
        }
        match parse_tokens(Strategy::General, rule, &tokens) {
            Attempt::Parsed(node) => Ok(node),
            Attempt::Ambiguous(message) | Attempt::Failed(message) => {
                Err(ParseFailure::new(rule, text, message))
            }
        }
    }
}

/// Parse `text` from `rule` with the default driver.
pub fn parse(rule: EntryRule, text: &str) -> Result<ParseNode, ParseFailure> {
    Parser::default().parse(rule, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::ir::Rule;

    #[test]
    fn test_entry_rule_names() {
        for rule in EntryRule::ALL {
            assert_eq!(rule.to_string().parse::<EntryRule>(), Ok(rule));
        }
        assert!("ability".parse::<EntryRule>().is_err());
    }

    #[test]
    fn test_falls_back_on_ambiguity() {
        let text = "creatures you control get +1/+1.";
        assert!(matches!(
            parse_with(Strategy::Deterministic, EntryRule::RulesText, text),
            Ok(Attempt::Ambiguous(_))
        ));
        let node = parse(EntryRule::RulesText, text).unwrap();
        assert_eq!(node.rule, Rule::RulesText);
    }

    #[test]
    fn test_failure_carries_rule_and_text() {
        let err = parse(EntryRule::TypeLine, "legendary").unwrap_err();
        assert_eq!(err.rule, EntryRule::TypeLine);
        assert_eq!(err.text, "legendary");
        assert!(!err.message.is_empty());
    }
}
