//! Error taxonomy
//!
//! Data errors ([MalformedManaSymbol], [ParseFailure]) are returned as values and
//! reported per card. Name-resolution findings are never fatal and surface as
//! [Diagnostic]s. A visitor meeting a tree shape it has no case for is a
//! programming error and panics instead of returning one of these.

use crate::grammar::EntryRule;
use thiserror::Error;

/// A hybrid mana symbol that splits into neither one nor two parts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed mana symbol {{{symbol}}}: expected one or two '/'-separated parts")]
pub struct MalformedManaSymbol {
    pub symbol: String,
}

/// Neither parsing strategy could derive a tree for the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse {rule} {text:?}: {message}")]
pub struct ParseFailure {
    pub rule: EntryRule,
    pub text: String,
    pub message: String,
}

impl ParseFailure {
    pub fn new(rule: EntryRule, text: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule,
            text: text.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseFailure),
    #[error(transparent)]
    Mana(#[from] MalformedManaSymbol),
}

/// An [Error] attributed to the card it was raised for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{card}: {source}")]
pub struct CardError {
    pub card: String,
    #[source]
    pub source: Error,
}

impl CardError {
    pub fn new(card: impl Into<String>, source: impl Into<Error>) -> Self {
        Self {
            card: card.into(),
            source: source.into(),
        }
    }
}

/// Non-fatal findings of the name resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Several candidate splits were made entirely of known names; the first one won.
    Ambiguity {
        position: usize,
        candidates: Vec<Vec<String>>,
    },
    /// An indicator phrase was followed by text with no usable candidate.
    UnknownReference { position: usize, word: String },
    /// No candidate was fully known; the first one was used and its new
    /// names were registered.
    Discovered { position: usize, names: Vec<String> },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::Ambiguity {
                position,
                candidates,
            } => {
                let splits: Vec<String> = candidates.iter().map(|c| c.join(" | ")).collect();
                write!(
                    f,
                    "multiple name splits possible at {}: {}",
                    position,
                    splits.join("; ")
                )
            }
            Diagnostic::UnknownReference { position, word } => {
                write!(f, "unable to interpret name(s) at {}: {}", position, word)
            }
            Diagnostic::Discovered { position, names } => {
                write!(f, "registered unknown name(s) at {}: {}", position, names.join("; "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_error_names_the_card() {
        let err = CardError::new(
            "Reaper King",
            MalformedManaSymbol {
                symbol: "R/P/W".to_string(),
            },
        );
        assert_eq!(
            err.to_string(),
            "Reaper King: malformed mana symbol {R/P/W}: expected one or two '/'-separated parts"
        );
    }

    #[test]
    fn parse_failure_carries_text() {
        let err = Error::from(ParseFailure {
            rule: EntryRule::TypeLine,
            text: "legendary".to_string(),
            message: "expected a card type".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "cannot parse type_line \"legendary\": expected a card type"
        );
    }

    #[test]
    fn diagnostics_render() {
        let diag = Diagnostic::UnknownReference {
            position: 6,
            word: "Bogus".to_string(),
        };
        assert_eq!(diag.to_string(), "unable to interpret name(s) at 6: Bogus");
    }
}
