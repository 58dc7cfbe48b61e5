//! # demystify
//!
//! A parser for Magic: The Gathering rules text.
//!
//! Raw card fields (oracle text, type line, mana cost) go through two stages:
//!
//!     1. Normalization: reminder text is stripped, typography is fixed, prose is
//!        lowercased and every card name is replaced by a placeholder token
//!        (`SELF`, `PARENT` or a `NAME_` token from the [names::NameTable]).
//!     2. Parsing: the normalized text is tokenized and parsed against one of three
//!        entry rules ([grammar::EntryRule]) into an untyped [grammar::ParseNode]
//!        tree, which [building::ModelBuilder] turns into the typed [model].
//!
//! Catalog-wide processing (registering every name before any text is resolved)
//! lives in [card::Catalog]; batch parseability reporting lives in [report].

pub mod building;
pub mod card;
pub mod error;
pub mod grammar;
pub mod model;
pub mod names;
pub mod normalize;
pub mod report;

pub use error::{CardError, Diagnostic, Error, MalformedManaSymbol, ParseFailure};

use building::ModelBuilder;
use grammar::EntryRule;
use model::{Mana, RulesText, Typeline};

/// Parse a mana-cost string such as `{2}{R/P}`.
pub fn parse_mana(text: &str) -> Result<Mana, Error> {
    let tree = grammar::parse(EntryRule::ManaCost, text)?;
    Ok(ModelBuilder::new().build_mana_cost(tree)?)
}

/// Parse an already normalized type line.
pub fn parse_typeline(text: &str) -> Result<Typeline, Error> {
    let tree = grammar::parse(EntryRule::TypeLine, text)?;
    Ok(ModelBuilder::new().build_typeline(tree))
}

/// Parse already normalized rules text.
pub fn parse_rules_text(text: &str) -> Result<RulesText, Error> {
    let tree = grammar::parse(EntryRule::RulesText, text)?;
    ModelBuilder::new().build_rules_text(tree)
}
