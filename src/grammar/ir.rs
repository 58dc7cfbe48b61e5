//! Intermediate Representation for Parsers
//!
//! Both parsing strategies produce the same untyped tree of [ParseNode]s. A
//! node's `tokens` are the tokens it directly spans; punctuation that only
//! delimits structure (colons, quotes, separating commas) is not kept.
//! [crate::building::ModelBuilder] turns the tree into the typed model.

pub use super::tokens::TokenSpan;
use super::tokens::text_of;
pub use crate::model::ConditionKind;

/// The argument layout of a keyword ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordShape {
    /// `flying`, `bushido 2`, `ward {2}`
    IntCost,
    /// `protection from red and from blue`
    From,
    /// `enchant creature`
    Quality,
    /// `equip legendary creature {3}`
    QualityCost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    /// `when`/`whenever` followed by a sentence.
    Event,
    /// `at the beginning of ...`
    Phase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DurationKind {
    /// `until ...`
    End,
    /// `for as long as ...`, `this turn`
    Span,
}

/// The grammar rule a node was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    ManaCost,
    ManaSymbol,
    Typeline,
    Supertype,
    CardType,
    Subtype,
    RulesText,
    KeywordLine,
    KeywordAbility(KeywordShape),
    KeywordName,
    KeywordInt,
    KeywordCost,
    KeywordQuality,
    KeywordFrom,
    Ability,
    Cost,
    Mana,
    Loyalty,
    Trigger(TriggerKind),
    Effects,
    AtomicEffect,
    Sentence,
    Subject,
    Verb,
    DirectObject,
    IndirectObject,
    GrantedAbility,
    Duration(DurationKind),
    Condition(ConditionKind),
}

/// A node in the parse tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNode {
    pub rule: Rule,
    pub tokens: Vec<TokenSpan>,
    pub children: Vec<ParseNode>,
}

impl ParseNode {
    pub fn new(rule: Rule, tokens: Vec<TokenSpan>, children: Vec<ParseNode>) -> Self {
        Self {
            rule,
            tokens,
            children,
        }
    }

    pub fn leaf(rule: Rule, tokens: Vec<TokenSpan>) -> Self {
        Self::new(rule, tokens, Vec::new())
    }

    pub fn branch(rule: Rule, children: Vec<ParseNode>) -> Self {
        Self::new(rule, Vec::new(), children)
    }

    /// The node's own tokens rendered as text.
    pub fn text(&self) -> String {
        text_of(&self.tokens)
    }

    pub fn child(&self, rule: Rule) -> Option<&ParseNode> {
        self.children.iter().find(|c| c.rule == rule)
    }

    /// Indented outline of the tree, one node per line.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(0, &mut out);
        out
    }

    fn write_outline(&self, depth: usize, out: &mut String) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&format!("{:?}", self.rule));
        if !self.tokens.is_empty() {
            out.push_str(&format!(" {:?}", self.text()));
        }
        out.push('\n');
        for child in &self.children {
            child.write_outline(depth + 1, out);
        }
    }
}
