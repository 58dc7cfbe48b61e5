//! Typed data model
//!
//! The structural types produced by [crate::building::ModelBuilder]. They are
//! plain immutable values: created once per parse, owned by the caller, and
//! serializable so downstream tools can consume them as JSON.

pub mod ability;
pub mod mana;
pub mod typeline;

pub use ability::{
    Ability, AtomicEffect, Condition, ConditionKind, CostItem, Duration, KeywordAbility,
    KeywordArgument, Line, Object, RulesText, Sentence,
};
pub use mana::{Mana, ManaSymbol};
pub use typeline::{CardType, Supertype, Typeline};

use serde::{Deserialize, Serialize};

/// Every structure parsed from one card face.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCard {
    pub mana_cost: Mana,
    pub typeline: Typeline,
    pub rules_text: RulesText,
}
