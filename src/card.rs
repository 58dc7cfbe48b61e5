//! Cards and catalog-wide processing
//!
//! A catalog load is a strict two-phase protocol:
//!
//!     1. [Catalog::load] registers every card and face name in the
//!        [NameTable]; no text is touched.
//!     2. [Catalog::normalize_all] (or its parallel twin) runs the face
//!        pipeline over every card. Resolving one card's text may need to
//!        recognize any other card's name, which is why phase 1 comes first.
//!
//! Parsing a normalized face ([parse_face]) needs no names at all.

use crate::building::ModelBuilder;
use crate::error::{CardError, Diagnostic, Error};
use crate::grammar::{EntryRule, Parser};
use crate::model::ParsedCard;
use crate::names::{
    face_self_names, DeferredNames, Discoveries, NameResolver, NameScope, NameTable,
};
use crate::normalize::{fix_typography, lowercase_prose, normalize_type_line, strip_reminder_text};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// Layouts whose `card_faces` are printed faces with their own text.
const MULTI_FACE_LAYOUTS: &[&str] = &[
    "split",
    "flip",
    "transform",
    "modal_dfc",
    "adventure",
    "battle",
];

/// Layouts that are reprints of another card and are never loaded.
const SKIPPED_LAYOUTS: &[&str] = &["reversible_card"];

/// One face as delivered by the card catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceRecord {
    pub name: String,
    pub type_line: String,
    pub mana_cost: String,
    pub oracle_text: String,
}

/// A card as delivered by the card catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardRecord {
    pub name: String,
    pub type_line: String,
    pub mana_cost: String,
    pub oracle_text: String,
    pub layout: String,
    pub card_faces: Vec<FaceRecord>,
}

impl CardRecord {
    pub fn is_loadable(&self) -> bool {
        !SKIPPED_LAYOUTS.contains(&self.layout.as_str())
    }

    fn into_card(self) -> Card {
        let multi_face =
            MULTI_FACE_LAYOUTS.contains(&self.layout.as_str()) && !self.card_faces.is_empty();
        let mut faces = if multi_face {
            self.card_faces
        } else {
            vec![FaceRecord {
                name: self.name.clone(),
                type_line: self.type_line,
                mana_cost: self.mana_cost,
                oracle_text: self.oracle_text,
            }]
        };
        // Adventure lands carry the adventure's cost on the land face
        if self.layout == "adventure" && faces.len() == 2 && faces[0].type_line.contains("Land") {
            let cost = std::mem::take(&mut faces[0].mana_cost);
            if faces[1].mana_cost.is_empty() {
                faces[1].mana_cost = cost;
            } else {
                faces[0].mana_cost = cost;
            }
        }
        Card {
            name: self.name,
            layout: self.layout,
            faces,
        }
    }
}

/// A loaded card: its name and printed faces, text still raw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub name: String,
    pub layout: String,
    pub faces: Vec<FaceRecord>,
}

/// A face after normalization; `mana_cost` is passed through as printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedFace {
    pub name: String,
    pub type_line: String,
    pub mana_cost: String,
    pub rules_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedCard {
    pub name: String,
    pub faces: Vec<NormalizedFace>,
    #[serde(skip)]
    pub diagnostics: Vec<Diagnostic>,
}

/// Run the preprocessing pipeline over one face.
///
/// The type line is normalized first since it decides whether the face answers
/// to its short name. Each rules-text line then has its reminder text stripped,
/// its names resolved and its prose lowercased; typography is fixed last, over
/// the joined text. Lines left empty by reminder stripping are dropped.
pub fn normalize_face(
    face: &FaceRecord,
    scope: &mut dyn NameScope,
    short_names: &BTreeMap<String, String>,
) -> (NormalizedFace, Vec<Diagnostic>) {
    let (normalized, diagnostics, _) = resolve_face(face, scope, short_names);
    (normalized, diagnostics)
}

/// [normalize_face], also returning the names the resolver looked up.
fn resolve_face(
    face: &FaceRecord,
    scope: &mut dyn NameScope,
    short_names: &BTreeMap<String, String>,
) -> (NormalizedFace, Vec<Diagnostic>, HashSet<String>) {
    let type_line = normalize_type_line(&face.type_line);
    let self_names = face_self_names(&face.name, &type_line, short_names);
    let mut resolver = NameResolver::new(scope);
    let lines: Vec<String> = face
        .oracle_text
        .split('\n')
        .map(strip_reminder_text)
        .filter(|line| !line.is_empty())
        .map(|line| lowercase_prose(&resolver.resolve_names(&line, &self_names, &[])))
        .collect();
    let normalized = NormalizedFace {
        name: face.name.clone(),
        type_line,
        mana_cost: face.mana_cost.trim().to_string(),
        rules_text: fix_typography(&lines.join("\n")),
    };
    let (diagnostics, consulted) = resolver.into_parts();
    (normalized, diagnostics, consulted)
}

fn normalize_card(
    card: &Card,
    scope: &mut dyn NameScope,
    short_names: &BTreeMap<String, String>,
) -> (NormalizedCard, HashSet<String>) {
    let mut diagnostics = Vec::new();
    let mut consulted = HashSet::new();
    let faces = card
        .faces
        .iter()
        .map(|face| {
            let (face, found, looked_up) = resolve_face(face, &mut *scope, short_names);
            diagnostics.extend(found);
            consulted.extend(looked_up);
            face
        })
        .collect();
    let normalized = NormalizedCard {
        name: card.name.clone(),
        faces,
        diagnostics,
    };
    (normalized, consulted)
}

/// One card normalized against a read-only table.
struct Deferred {
    card: NormalizedCard,
    discoveries: Discoveries,
    consulted: HashSet<String>,
}

fn normalize_deferred(
    card: &Card,
    table: &NameTable,
    short_names: &BTreeMap<String, String>,
) -> Deferred {
    let mut overlay = DeferredNames::new(table);
    let (card, consulted) = normalize_card(card, &mut overlay, short_names);
    Deferred {
        card,
        discoveries: overlay.into_discoveries(),
        consulted,
    }
}

/// Parse the three fields of a normalized face.
pub fn parse_face(parser: &Parser, face: &NormalizedFace) -> Result<ParsedCard, Error> {
    let builder = ModelBuilder::new();
    let mana_cost = builder.build_mana_cost(parser.parse(EntryRule::ManaCost, &face.mana_cost)?)?;
    let typeline = builder.build_typeline(parser.parse(EntryRule::TypeLine, &face.type_line)?);
    let rules_text =
        builder.build_rules_text(parser.parse(EntryRule::RulesText, &face.rules_text)?)?;
    Ok(ParsedCard {
        mana_cost,
        typeline,
        rules_text,
    })
}

/// Parse every face of a card; the first failing face fails the card.
pub fn parse_card(parser: &Parser, card: &NormalizedCard) -> Result<Vec<ParsedCard>, CardError> {
    card.faces
        .iter()
        .map(|face| parse_face(parser, face).map_err(|e| CardError::new(&card.name, e)))
        .collect()
}

/// The cards of one load and the name table built from them.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    names: NameTable,
    cards: Vec<Card>,
    short_names: BTreeMap<String, String>,
}

impl Catalog {
    pub fn new(short_names: BTreeMap<String, String>) -> Self {
        Self {
            short_names,
            ..Self::default()
        }
    }

    pub fn from_config(config: &demystify_config::NamesConfig) -> Self {
        Self::new(config.short_name_map())
    }

    /// Phase 1: replace the catalog's cards and register all of their names.
    ///
    /// Unloadable layouts are skipped and later records with an already
    /// loaded name are dropped.
    pub fn load(&mut self, records: impl IntoIterator<Item = CardRecord>) {
        self.names.clear();
        self.cards.clear();
        let mut seen = HashSet::new();
        for record in records {
            if !record.is_loadable() || !seen.insert(record.name.clone()) {
                continue;
            }
            let card = record.into_card();
            self.names.add(&card.name);
            for face in &card.faces {
                self.names.add(&face.name);
            }
            self.cards.push(card);
        }
        info!(
            cards = self.cards.len(),
            names = self.names.len(),
            "registered card names"
        );
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn names(&self) -> &NameTable {
        &self.names
    }

    /// Phase 2, one card at a time; discovered names go straight into the table.
    pub fn normalize_all(&mut self) -> Vec<NormalizedCard> {
        info!(cards = self.cards.len(), "normalizing card texts");
        let names = &mut self.names;
        let short_names = &self.short_names;
        self.cards
            .iter()
            .map(|card| normalize_card(card, &mut *names, short_names).0)
            .collect()
    }

    /// Phase 2 across the rayon pool, with the same result as [Catalog::normalize_all].
    ///
    /// Workers only read the phase 1 table. Their results are then replayed in
    /// card order against the growing table. A worker's result stands when
    /// the card looked up none of the names discovered by earlier cards and
    /// its own discoveries keep their provisional tokens; otherwise the card
    /// is normalized again against the table as it stands at that point and
    /// the worker's discoveries are dropped.
    pub fn normalize_all_parallel(&mut self) -> Vec<NormalizedCard> {
        info!(cards = self.cards.len(), "normalizing card texts in parallel");
        let table = &self.names;
        let short_names = &self.short_names;
        let results: Vec<Deferred> = self
            .cards
            .par_iter()
            .map(|card| normalize_deferred(card, table, short_names))
            .collect();

        let mut normalized = Vec::with_capacity(results.len());
        let mut discovered: HashSet<String> = HashSet::new();
        for (card, mut result) in self.cards.iter().zip(results) {
            let stale = !result.consulted.is_disjoint(&discovered);
            if stale || !self.names.accepts(&result.discoveries) {
                debug!(card = %card.name, stale, "normalizing again after earlier discoveries");
                result = normalize_deferred(card, &self.names, &self.short_names);
            }
            discovered.extend(result.discoveries.names().map(str::to_string));
            self.names.merge(result.discoveries);
            normalized.push(result.card);
        }
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, type_line: &str, oracle_text: &str) -> CardRecord {
        CardRecord {
            name: name.to_string(),
            type_line: type_line.to_string(),
            oracle_text: oracle_text.to_string(),
            layout: "normal".to_string(),
            ..CardRecord::default()
        }
    }

    #[test]
    fn test_load_registers_and_dedupes() {
        let mut catalog = Catalog::default();
        catalog.load(vec![
            record("Grizzly Bears", "Creature — Bear", ""),
            record("Grizzly Bears", "Creature — Bear", "Flying"),
            CardRecord {
                layout: "reversible_card".to_string(),
                ..record("Reversed", "Creature — Bear", "")
            },
        ]);
        assert_eq!(catalog.cards().len(), 1);
        assert_eq!(catalog.cards()[0].faces[0].oracle_text, "");
        assert!(catalog.names().contains("Grizzly Bears"));
        assert!(!catalog.names().contains("Reversed"));
    }

    #[test]
    fn test_adventure_land_cost_moves_to_adventure() {
        let card = CardRecord {
            name: "Fields // Harvest".to_string(),
            layout: "adventure".to_string(),
            card_faces: vec![
                FaceRecord {
                    name: "Fields".to_string(),
                    type_line: "Land".to_string(),
                    mana_cost: "{G}".to_string(),
                    ..FaceRecord::default()
                },
                FaceRecord {
                    name: "Harvest".to_string(),
                    type_line: "Sorcery — Adventure".to_string(),
                    ..FaceRecord::default()
                },
            ],
            ..CardRecord::default()
        }
        .into_card();
        assert_eq!(card.faces[0].mana_cost, "");
        assert_eq!(card.faces[1].mana_cost, "{G}");
    }

    #[test]
    fn test_face_pipeline() {
        let mut table = NameTable::new();
        let face = FaceRecord {
            name: "Kiki-Jiki, Mirror Breaker".to_string(),
            type_line: "Legendary Creature — Goblin Shaman".to_string(),
            mana_cost: "{2}{R}{R}{R}".to_string(),
            oracle_text: "Haste\n{T}: Kiki-Jiki deals 1 damage to any target. (Reminder.)"
                .to_string(),
        };
        let (face, diagnostics) = normalize_face(&face, &mut table, &BTreeMap::new());
        assert!(diagnostics.is_empty());
        assert_eq!(face.type_line, "legendary creature — goblin shaman");
        assert_eq!(
            face.rules_text,
            "haste\n{t}: SELF deals 1 damage to any target."
        );
    }

    #[test]
    fn test_parse_face() {
        let face = NormalizedFace {
            name: "Shock".to_string(),
            type_line: "instant".to_string(),
            mana_cost: "{R}".to_string(),
            rules_text: "SELF deals 2 damage to any target.".to_string(),
        };
        let parsed = parse_face(&Parser::default(), &face).unwrap();
        assert_eq!(parsed.mana_cost.len(), 1);
        assert_eq!(parsed.rules_text.lines().len(), 1);
    }

    #[test]
    fn test_parse_card_names_the_card() {
        let card = NormalizedCard {
            name: "Broken".to_string(),
            faces: vec![NormalizedFace {
                name: "Broken".to_string(),
                type_line: "legendary".to_string(),
                mana_cost: String::new(),
                rules_text: String::new(),
            }],
            diagnostics: Vec::new(),
        };
        let err = parse_card(&Parser::default(), &card).unwrap_err();
        assert_eq!(err.card, "Broken");
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let records = vec![
            record("Grizzly Bears", "Creature — Bear", "Flying"),
            record(
                "Summoner",
                "Creature — Human",
                "When Summoner enters, create Grizzly Bears.",
            ),
            record(
                "Forger",
                "Creature — Human",
                "When Forger enters, create Brand New Thing.",
            ),
        ];
        let mut sequential = Catalog::default();
        sequential.load(records.clone());
        let expected = sequential.normalize_all();

        let mut parallel = Catalog::default();
        parallel.load(records);
        let actual = parallel.normalize_all_parallel();

        assert_eq!(actual, expected);
        assert!(parallel.names().contains("Brand New Thing"));
    }

    #[test]
    fn test_parallel_lists_of_names_found_by_other_cards() {
        let records = vec![
            record("Alpha Maker", "Sorcery", "Create Alpha."),
            record("Beta Maker", "Sorcery", "Create Beta."),
            record("Pair Maker", "Sorcery", "Create Alpha and Beta."),
        ];
        let mut sequential = Catalog::default();
        sequential.load(records.clone());
        let expected = sequential.normalize_all();

        let mut parallel = Catalog::default();
        parallel.load(records);
        let actual = parallel.normalize_all_parallel();

        assert_eq!(
            actual[2].faces[0].rules_text,
            "create NAME_Alpha and NAME_Beta."
        );
        assert_eq!(actual, expected);
        assert!(!parallel.names().contains("Alpha and Beta"));
        assert_eq!(parallel.names().len(), sequential.names().len());
    }

    #[test]
    fn test_parallel_collisions_take_the_sequential_token() {
        let records = vec![
            record("First", "Sorcery", "Create Foo-Bar."),
            record("Second", "Sorcery", "Create Foo Bar."),
        ];
        let mut sequential = Catalog::default();
        sequential.load(records.clone());
        let expected = sequential.normalize_all();

        let mut parallel = Catalog::default();
        parallel.load(records);
        let actual = parallel.normalize_all_parallel();

        assert_eq!(actual[1].faces[0].rules_text, "create NAME_Foo_Bar_.");
        assert_eq!(actual, expected);
    }
}
