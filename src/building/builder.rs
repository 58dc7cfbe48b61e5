//! Model builder from the ParseNode tree
//!
//! [ModelBuilder] walks the untyped tree produced by either grammar strategy
//! and constructs the typed [crate::model]. There is one method per grammar
//! rule and every `match` over [Rule] lists the shapes that rule can have.
//! Any other shape means the grammar and this builder disagree: that is a bug,
//! not bad card data, so it panics with the offending subtree.

use super::singular::singularize;
use crate::error::{Error, MalformedManaSymbol};
use crate::grammar::ir::{DurationKind, KeywordShape, ParseNode, Rule, TriggerKind};
use crate::grammar::Token;
use crate::model::{
    Ability, AtomicEffect, CardType, Condition, CostItem, Duration, KeywordAbility,
    KeywordArgument, Line, Mana, ManaSymbol, Object, RulesText, Sentence, Supertype, Typeline,
};

/// Subject of an imperative sentence.
const IMPERATIVE_SUBJECT: &str = "you";

/// Fail loudly on a tree shape the builder has no case for.
fn grammar_drift(expected: &str, node: &ParseNode) -> ! {
    panic!(
        "grammar drift: expected {}, found {:?}\n{}",
        expected,
        node.rule,
        node.outline()
    )
}

/// Builds the typed model from a root [ParseNode].
#[derive(Debug, Default, Clone, Copy)]
pub struct ModelBuilder;

impl ModelBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Builds a [Mana] cost from a `ManaCost` root.
    pub fn build_mana_cost(&self, root: ParseNode) -> Result<Mana, MalformedManaSymbol> {
        if root.rule != Rule::ManaCost {
            grammar_drift("a ManaCost root", &root);
        }
        self.build_mana(&root)
    }

    /// Builds a [Typeline] from a `Typeline` root.
    pub fn build_typeline(&self, root: ParseNode) -> Typeline {
        if root.rule != Rule::Typeline {
            grammar_drift("a Typeline root", &root);
        }
        let mut typeline = Typeline::default();
        for child in &root.children {
            let word = singularize(&child.text());
            match child.rule {
                Rule::Supertype => match Supertype::from_word(&word) {
                    Some(supertype) => typeline.supertypes.push(supertype),
                    None => grammar_drift("a known supertype", child),
                },
                Rule::CardType => match CardType::from_word(&word) {
                    Some(card_type) => typeline.card_types.push(card_type),
                    None => grammar_drift("a known card type", child),
                },
                Rule::Subtype => typeline.subtypes.push(word),
                _ => grammar_drift("Supertype, CardType or Subtype", child),
            }
        }
        typeline
    }

    /// Builds [RulesText] from a `RulesText` root, one [Line] per child.
    pub fn build_rules_text(&self, root: ParseNode) -> Result<RulesText, Error> {
        if root.rule != Rule::RulesText {
            grammar_drift("a RulesText root", &root);
        }
        let lines = root
            .children
            .iter()
            .map(|line| self.build_line(line))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RulesText(lines))
    }

    fn build_line(&self, node: &ParseNode) -> Result<Line, Error> {
        match node.rule {
            Rule::KeywordLine => {
                let keywords = node
                    .children
                    .iter()
                    .map(|k| self.build_keyword_ability(k))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Line::Keywords(keywords))
            }
            Rule::Ability => Ok(Line::Ability(self.build_ability(node)?)),
            _ => grammar_drift("KeywordLine or Ability", node),
        }
    }

    fn build_keyword_ability(&self, node: &ParseNode) -> Result<KeywordAbility, Error> {
        let Rule::KeywordAbility(shape) = node.rule else {
            grammar_drift("KeywordAbility", node);
        };
        let Some((name, arguments)) = node.children.split_first() else {
            grammar_drift("a KeywordName child", node);
        };
        if name.rule != Rule::KeywordName {
            grammar_drift("KeywordName", name);
        }
        let name = match name.tokens.as_slice() {
            [single] => singularize(&single.0.to_string()),
            _ => name.text(),
        };

        let argument = match (shape, arguments) {
            (KeywordShape::IntCost, []) => None,
            (KeywordShape::IntCost, [int]) if int.rule == Rule::KeywordInt => {
                Some(KeywordArgument::Int(self.build_int(int)))
            }
            (KeywordShape::IntCost, [cost]) if cost.rule == Rule::KeywordCost => {
                Some(KeywordArgument::Cost(self.build_mana(cost)?))
            }
            (KeywordShape::From, segments) if !segments.is_empty() => {
                let qualities = segments
                    .iter()
                    .map(|segment| match segment.rule {
                        Rule::KeywordFrom => segment.text(),
                        _ => grammar_drift("KeywordFrom", segment),
                    })
                    .collect();
                Some(KeywordArgument::From(qualities))
            }
            (KeywordShape::Quality, [quality]) if quality.rule == Rule::KeywordQuality => {
                Some(KeywordArgument::Quality(quality.text()))
            }
            (KeywordShape::QualityCost, [quality, cost])
                if quality.rule == Rule::KeywordQuality && cost.rule == Rule::KeywordCost =>
            {
                Some(KeywordArgument::QualifiedCost {
                    quality: quality.text(),
                    cost: self.build_mana(cost)?,
                })
            }
            _ => grammar_drift("keyword arguments matching the keyword shape", node),
        };
        Ok(KeywordAbility { name, argument })
    }

    fn build_int(&self, node: &ParseNode) -> u32 {
        match node.tokens.as_slice() {
            [(Token::Number(n), _)] => *n,
            _ => grammar_drift("a single number", node),
        }
    }

    /// The cost (or trigger) child decides the ability kind; neither means static.
    fn build_ability(&self, node: &ParseNode) -> Result<Ability, Error> {
        match node.children.as_slice() {
            [effects] => Ok(Ability::Static {
                effects: self.build_effects(effects)?,
            }),
            [head, effects] => match head.rule {
                Rule::Cost => Ok(Ability::Activated {
                    cost: self.build_cost(head)?,
                    effects: self.build_effects(effects)?,
                }),
                Rule::Trigger(kind) => Ok(Ability::Triggered {
                    trigger: self.build_trigger(kind, head)?,
                    effects: self.build_effects(effects)?,
                }),
                _ => grammar_drift("Cost or Trigger", head),
            },
            _ => grammar_drift("Ability with one or two children", node),
        }
    }

    fn build_cost(&self, node: &ParseNode) -> Result<Vec<CostItem>, Error> {
        node.children
            .iter()
            .map(|item| -> Result<CostItem, Error> {
                match item.rule {
                    Rule::Mana => Ok(CostItem::Mana(self.build_mana(item)?)),
                    Rule::Loyalty => Ok(CostItem::Loyalty(item.text())),
                    Rule::Sentence => Ok(CostItem::Action(self.build_sentence(item)?)),
                    _ => grammar_drift("Mana, Loyalty or Sentence", item),
                }
            })
            .collect()
    }

    fn build_trigger(&self, kind: TriggerKind, node: &ParseNode) -> Result<Sentence, Error> {
        match (kind, node.children.as_slice()) {
            (TriggerKind::Event, [sentence]) => self.build_sentence(sentence),
            (TriggerKind::Phase, [when, phase])
                if when.rule == Rule::Verb && phase.rule == Rule::Subject =>
            {
                let verb = match when.text().as_str() {
                    "beginning" => "begin".to_string(),
                    other => other.to_string(),
                };
                Ok(Sentence::new(phase.text(), verb))
            }
            _ => grammar_drift("an event or phase trigger", node),
        }
    }

    fn build_effects(&self, node: &ParseNode) -> Result<Vec<AtomicEffect>, Error> {
        if node.rule != Rule::Effects {
            grammar_drift("Effects", node);
        }
        node.children
            .iter()
            .map(|atomic| self.build_atomic_effect(atomic))
            .collect()
    }

    fn build_atomic_effect(&self, node: &ParseNode) -> Result<AtomicEffect, Error> {
        if node.rule != Rule::AtomicEffect {
            grammar_drift("AtomicEffect", node);
        }
        let mut effect = None;
        let mut duration = None;
        let mut condition = None;
        for child in &node.children {
            match child.rule {
                Rule::Sentence if effect.is_none() => effect = Some(self.build_sentence(child)?),
                Rule::Duration(kind) if duration.is_none() => {
                    duration = Some(self.build_duration(kind, child))
                }
                Rule::Condition(kind) if condition.is_none() => {
                    let [sentence] = child.children.as_slice() else {
                        grammar_drift("a Condition with one Sentence", child);
                    };
                    condition = Some(Condition {
                        kind,
                        sentence: self.build_sentence(sentence)?,
                    });
                }
                _ => grammar_drift("at most one Sentence, Duration and Condition", child),
            }
        }
        let Some(effect) = effect else {
            grammar_drift("an AtomicEffect with a Sentence", node);
        };
        Ok(AtomicEffect {
            effect,
            duration,
            condition,
        })
    }

    fn build_duration(&self, kind: DurationKind, node: &ParseNode) -> Duration {
        match kind {
            DurationKind::End => Duration::End(node.text()),
            DurationKind::Span => Duration::Span(node.text()),
        }
    }

    /// Builds a [Sentence]; a missing subject is the imperative `you`.
    fn build_sentence(&self, node: &ParseNode) -> Result<Sentence, Error> {
        if node.rule != Rule::Sentence {
            grammar_drift("Sentence", node);
        }
        let mut subject = None;
        let mut verb = None;
        let mut direct_object = None;
        let mut indirect_object = None;
        for child in &node.children {
            match child.rule {
                Rule::Subject => subject = Some(child.text()),
                Rule::Verb => verb = Some(child.text()),
                Rule::DirectObject => direct_object = Some(self.build_object(child)?),
                Rule::IndirectObject => indirect_object = Some(child.text()),
                _ => grammar_drift("a Sentence part", child),
            }
        }
        let Some(verb) = verb else {
            grammar_drift("a Sentence with a Verb", node);
        };
        Ok(Sentence {
            subject: subject.unwrap_or_else(|| IMPERATIVE_SUBJECT.to_string()),
            verb,
            direct_object,
            indirect_object,
        })
    }

    fn build_object(&self, node: &ParseNode) -> Result<Object, Error> {
        match node.children.as_slice() {
            [] => Ok(Object::Phrase(node.text())),
            [granted] if granted.rule == Rule::GrantedAbility => {
                let [line] = granted.children.as_slice() else {
                    grammar_drift("a GrantedAbility with one line", granted);
                };
                Ok(Object::Granted {
                    phrase: node.text(),
                    ability: Box::new(self.build_line(line)?),
                })
            }
            _ => grammar_drift("a phrase or a GrantedAbility", node),
        }
    }

    /// Symbols in source order; used for mana costs, cost items and keyword costs.
    fn build_mana(&self, node: &ParseNode) -> Result<Mana, MalformedManaSymbol> {
        node.children
            .iter()
            .map(|symbol| match (symbol.rule, symbol.tokens.as_slice()) {
                (Rule::ManaSymbol, [(Token::Symbol(inner), _)]) => inner.parse::<ManaSymbol>(),
                _ => grammar_drift("a ManaSymbol", symbol),
            })
            .collect()
    }
}
