//! Rules text: lines, abilities and the sentences they are made of

use super::mana::Mana;
use serde::{Deserialize, Serialize};

/// The atomic unit of an effect, trigger, cost action or condition.
///
/// Imperative sentences ("draw a card") carry the subject `"you"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub subject: String,
    pub verb: String,
    pub direct_object: Option<Object>,
    pub indirect_object: Option<String>,
}

impl Sentence {
    pub fn new(subject: impl Into<String>, verb: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            verb: verb.into(),
            direct_object: None,
            indirect_object: None,
        }
    }

    pub fn with_direct_object(mut self, object: Object) -> Self {
        self.direct_object = Some(object);
        self
    }

    pub fn with_indirect_object(mut self, object: impl Into<String>) -> Self {
        self.indirect_object = Some(object.into());
        self
    }
}

/// A direct object: plain noun phrase, or a quoted ability granted to the phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Object {
    Phrase(String),
    Granted { phrase: String, ability: Box<Line> },
}

impl Object {
    pub fn phrase(text: impl Into<String>) -> Self {
        Object::Phrase(text.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Duration {
    /// `until end of turn`
    End(String),
    /// `for as long as ...`, `this turn`
    Span(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    If,
    Unless,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub kind: ConditionKind,
    pub sentence: Sentence,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomicEffect {
    pub effect: Sentence,
    pub duration: Option<Duration>,
    pub condition: Option<Condition>,
}

impl From<Sentence> for AtomicEffect {
    fn from(effect: Sentence) -> Self {
        Self {
            effect,
            duration: None,
            condition: None,
        }
    }
}

/// One item of an activated ability's cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostItem {
    Mana(Mana),
    Loyalty(String),
    Action(Sentence),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Ability {
    Static {
        effects: Vec<AtomicEffect>,
    },
    Triggered {
        trigger: Sentence,
        effects: Vec<AtomicEffect>,
    },
    Activated {
        cost: Vec<CostItem>,
        effects: Vec<AtomicEffect>,
    },
}

impl Ability {
    pub fn effects(&self) -> &[AtomicEffect] {
        match self {
            Ability::Static { effects }
            | Ability::Triggered { effects, .. }
            | Ability::Activated { effects, .. } => effects,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Ability::Static { .. } => "static",
            Ability::Triggered { .. } => "triggered",
            Ability::Activated { .. } => "activated",
        }
    }
}

/// Keyword argument slot. Exactly one shape is populated per keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordArgument {
    Int(u32),
    Cost(Mana),
    Quality(String),
    QualifiedCost { quality: String, cost: Mana },
    From(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordAbility {
    pub name: String,
    pub argument: Option<KeywordArgument>,
}

impl KeywordAbility {
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            argument: None,
        }
    }

    pub fn with_argument(name: impl Into<String>, argument: KeywordArgument) -> Self {
        Self {
            name: name.into(),
            argument: Some(argument),
        }
    }
}

/// One textual line of rules text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Line {
    Keywords(Vec<KeywordAbility>),
    Ability(Ability),
}

/// The lines of one card face, in printed order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RulesText(pub Vec<Line>);

impl RulesText {
    pub fn lines(&self) -> &[Line] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
