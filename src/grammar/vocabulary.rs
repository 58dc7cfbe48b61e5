//! Closed word classes of the grammar
//!
//! Verbs, modals and prepositions decide where a sentence splits into subject
//! and objects; the keyword table decides which words open a keyword line and
//! what argument each keyword accepts.

use crate::model::{CardType, Supertype};
use once_cell::sync::Lazy;

/// Argument a keyword can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Bare,
    Int,
    Cost,
    From,
    Quality,
    QualityCost,
}

#[derive(Debug, Clone, Copy)]
pub struct Keyword {
    pub name: &'static str,
    pub takes: &'static [ArgKind],
}

impl Keyword {
    pub fn words(&self) -> impl Iterator<Item = &'static str> {
        self.name.split(' ')
    }

    pub fn word_count(&self) -> usize {
        self.name.split(' ').count()
    }
}

use ArgKind::*;

const fn kw(name: &'static str, takes: &'static [ArgKind]) -> Keyword {
    Keyword { name, takes }
}

pub const KEYWORDS: &[Keyword] = &[
    kw("deathtouch", &[Bare]),
    kw("defender", &[Bare]),
    kw("double strike", &[Bare]),
    kw("first strike", &[Bare]),
    kw("flash", &[Bare]),
    kw("flying", &[Bare]),
    kw("haste", &[Bare]),
    kw("hexproof", &[Bare, From]),
    kw("indestructible", &[Bare]),
    kw("intimidate", &[Bare]),
    kw("lifelink", &[Bare]),
    kw("menace", &[Bare]),
    kw("reach", &[Bare]),
    kw("shroud", &[Bare]),
    kw("trample", &[Bare]),
    kw("vigilance", &[Bare]),
    kw("fear", &[Bare]),
    kw("changeling", &[Bare]),
    kw("convoke", &[Bare]),
    kw("delve", &[Bare]),
    kw("devoid", &[Bare]),
    kw("wither", &[Bare]),
    kw("infect", &[Bare]),
    kw("persist", &[Bare]),
    kw("undying", &[Bare]),
    kw("prowess", &[Bare]),
    kw("exalted", &[Bare]),
    kw("flanking", &[Bare]),
    kw("horsemanship", &[Bare]),
    kw("shadow", &[Bare]),
    kw("skulk", &[Bare]),
    kw("cascade", &[Bare]),
    kw("storm", &[Bare]),
    kw("rebound", &[Bare]),
    kw("split second", &[Bare]),
    kw("sunburst", &[Bare]),
    kw("phasing", &[Bare]),
    kw("banding", &[Bare]),
    kw("epic", &[Bare]),
    kw("haunt", &[Bare]),
    kw("provoke", &[Bare]),
    kw("living weapon", &[Bare]),
    kw("soulbond", &[Bare]),
    kw("evolve", &[Bare]),
    kw("extort", &[Bare]),
    kw("fuse", &[Bare]),
    kw("unleash", &[Bare]),
    kw("cipher", &[Bare]),
    kw("dethrone", &[Bare]),
    kw("exploit", &[Bare]),
    kw("melee", &[Bare]),
    kw("improvise", &[Bare]),
    kw("ascend", &[Bare]),
    kw("mentor", &[Bare]),
    kw("riot", &[Bare]),
    kw("undaunted", &[Bare]),
    kw("decayed", &[Bare]),
    kw("daybound", &[Bare]),
    kw("nightbound", &[Bare]),
    kw("training", &[Bare]),
    kw("enlist", &[Bare]),
    kw("ravenous", &[Bare]),
    kw("read ahead", &[Bare]),
    kw("islandwalk", &[Bare]),
    kw("swampwalk", &[Bare]),
    kw("mountainwalk", &[Bare]),
    kw("forestwalk", &[Bare]),
    kw("plainswalk", &[Bare]),
    kw("partner", &[Bare]),
    kw("absorb", &[Int]),
    kw("afflict", &[Int]),
    kw("afterlife", &[Int]),
    kw("annihilator", &[Int]),
    kw("backup", &[Int]),
    kw("bloodthirst", &[Int]),
    kw("bushido", &[Int]),
    kw("crew", &[Int]),
    kw("dredge", &[Int]),
    kw("fabricate", &[Int]),
    kw("fading", &[Int]),
    kw("frenzy", &[Int]),
    kw("graft", &[Int]),
    kw("modular", &[Int]),
    kw("poisonous", &[Int]),
    kw("rampage", &[Int]),
    kw("renown", &[Int]),
    kw("ripple", &[Int]),
    kw("soulshift", &[Int]),
    kw("toxic", &[Int]),
    kw("tribute", &[Int]),
    kw("vanishing", &[Int]),
    kw("ward", &[Cost]),
    kw("equip", &[Cost, QualityCost]),
    kw("cycling", &[Cost]),
    kw("basic landcycling", &[Cost]),
    kw("plainscycling", &[Cost]),
    kw("islandcycling", &[Cost]),
    kw("swampcycling", &[Cost]),
    kw("mountaincycling", &[Cost]),
    kw("forestcycling", &[Cost]),
    kw("kicker", &[Cost]),
    kw("multikicker", &[Cost]),
    kw("flashback", &[Cost]),
    kw("echo", &[Cost]),
    kw("madness", &[Cost]),
    kw("morph", &[Cost]),
    kw("megamorph", &[Cost]),
    kw("ninjutsu", &[Cost]),
    kw("evoke", &[Cost]),
    kw("buyback", &[Cost]),
    kw("dash", &[Cost]),
    kw("embalm", &[Cost]),
    kw("eternalize", &[Cost]),
    kw("unearth", &[Cost]),
    kw("entwine", &[Cost]),
    kw("level up", &[Cost]),
    kw("reconfigure", &[Cost]),
    kw("blitz", &[Cost]),
    kw("disturb", &[Cost]),
    kw("foretell", &[Cost]),
    kw("encore", &[Cost]),
    kw("outlast", &[Cost]),
    kw("scavenge", &[Cost]),
    kw("bestow", &[Cost]),
    kw("miracle", &[Cost]),
    kw("overload", &[Cost]),
    kw("prowl", &[Cost]),
    kw("spectacle", &[Cost]),
    kw("surge", &[Cost]),
    kw("transmute", &[Cost]),
    kw("protection", &[From]),
    kw("enchant", &[Quality]),
    kw("affinity for", &[Quality]),
    kw("champion", &[Quality]),
    kw("partner with", &[Quality]),
    kw("splice onto", &[QualityCost]),
];

/// Keywords with multi-word names first, so the longest name wins.
pub static KEYWORDS_LONGEST_FIRST: Lazy<Vec<&'static Keyword>> = Lazy::new(|| {
    let mut keywords: Vec<&Keyword> = KEYWORDS.iter().collect();
    keywords.sort_by_key(|k| std::cmp::Reverse(k.word_count()));
    keywords
});

pub fn keyword(name: &str) -> Option<&'static Keyword> {
    KEYWORDS.iter().find(|k| k.name == name)
}

/// Whether the keyword `name` accepts an argument of kind `arg`.
pub fn keyword_takes(name: &str, arg: ArgKind) -> bool {
    keyword(name).is_some_and(|k| k.takes.contains(&arg))
}

const VERBS: &[&str] = &[
    "add", "adds", "attach", "attaches", "attack", "attacks", "be", "is", "are", "become",
    "becomes", "block", "blocks", "cast", "casts", "cause", "causes", "change", "changes",
    "choose", "chooses", "control", "controls", "copy", "copies", "cost", "costs", "counter",
    "counters", "create", "creates", "deal", "deals", "destroy", "destroys", "die", "dies",
    "discard", "discards", "do", "does", "double", "doubles", "draw", "draws", "enter", "enters", "exchange",
    "exile", "exiles", "explore", "explores", "fight", "fights", "flip", "flips", "gain",
    "gains", "get", "gets", "has", "have", "investigate", "leave", "leaves", "look", "looks",
    "lose", "loses", "mill", "mills", "pay", "pays", "play", "plays", "prevent", "prevents",
    "proliferate", "put", "puts", "regenerate", "remove", "removes", "return", "returns",
    "reveal", "reveals", "sacrifice", "sacrifices", "scry", "search", "searches", "shuffle",
    "shuffles", "skip", "skips", "surveil", "take", "takes", "tap", "taps", "transform",
    "transforms", "untap", "untaps", "win", "wins",
];

const MODALS: &[&str] = &[
    "may", "can", "can't", "cannot", "must", "don't", "doesn't", "would", "could",
];

const PREPOSITIONS: &[&str] = &["to", "on", "onto", "into", "from", "under"];

/// Words that only the general grammar knows how to place.
const STRUCTURAL: &[&str] = &["until", "unless", "if", "then", "for", "turn"];

/// Subjects of relative clauses that stay inside a noun phrase.
pub const RELATIVE_SUBJECTS: &[&str] = &[
    "you",
    "opponents",
    "an opponent",
    "a player",
    "that player",
    "another player",
    "its owner",
    "its controller",
    "your opponents",
];

pub const RELATIVE_VERBS: &[&str] = &["control", "controls", "own", "owns"];

pub fn is_verb(word: &str) -> bool {
    VERBS.contains(&word)
}

pub fn is_modal(word: &str) -> bool {
    MODALS.contains(&word)
}

pub fn is_preposition(word: &str) -> bool {
    PREPOSITIONS.contains(&word)
}

pub fn is_structural(word: &str) -> bool {
    STRUCTURAL.contains(&word)
}

pub fn is_trigger_word(word: &str) -> bool {
    word == "when" || word == "whenever"
}

pub fn is_supertype(word: &str) -> bool {
    Supertype::from_word(word).is_some()
}

pub fn is_card_type(word: &str) -> bool {
    CardType::from_word(word).is_some()
}
