//! Type lines

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! closed_vocabulary {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $word:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $word),+
                }
            }

            /// Look up a lowercase singular word.
            pub fn from_word(word: &str) -> Option<Self> {
                match word {
                    $($word => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

closed_vocabulary!(
    /// Supertypes printed before the card types.
    Supertype {
        Basic => "basic",
        Legendary => "legendary",
        Ongoing => "ongoing",
        Snow => "snow",
        World => "world",
    }
);

closed_vocabulary!(
    CardType {
        Artifact => "artifact",
        Battle => "battle",
        Conspiracy => "conspiracy",
        Creature => "creature",
        Dungeon => "dungeon",
        Enchantment => "enchantment",
        Instant => "instant",
        Kindred => "kindred",
        Land => "land",
        Phenomenon => "phenomenon",
        Plane => "plane",
        Planeswalker => "planeswalker",
        Scheme => "scheme",
        Sorcery => "sorcery",
        Tribal => "tribal",
        Vanguard => "vanguard",
    }
);

/// Supertypes, card types and subtypes, each in source order.
///
/// Subtypes are free-form: new creature types appear with every set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Typeline {
    pub supertypes: Vec<Supertype>,
    pub card_types: Vec<CardType>,
    pub subtypes: Vec<String>,
}

impl Typeline {
    pub fn has_type(&self, card_type: CardType) -> bool {
        self.card_types.contains(&card_type)
    }
}

impl fmt::Display for Typeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words: Vec<&str> = self
            .supertypes
            .iter()
            .map(Supertype::as_str)
            .chain(self.card_types.iter().map(CardType::as_str))
            .collect();
        write!(f, "{}", words.join(" "))?;
        if !self.subtypes.is_empty() {
            write!(f, " — {}", self.subtypes.join(" "))?;
        }
        Ok(())
    }
}
