//! Morphological singularization of type and keyword words
//!
//! The vocabularies are singular; card text isn't always. English plurals are
//! undone by `inflector`. Card-text words it gets wrong are listed in
//! [OVERRIDES], and words with anything but ASCII letters (`urza's`,
//! `assembly-worker`) are returned unchanged.

use inflector::string::singularize::to_singular;

/// Creature types and keywords whose singular `inflector` doesn't produce.
const OVERRIDES: &[(&str, &str)] = &[
    ("cyclops", "cyclops"),
    ("dwarves", "dwarf"),
    ("elves", "elf"),
    ("fungus", "fungus"),
    ("homunculus", "homunculus"),
    ("nautilus", "nautilus"),
    ("pegasus", "pegasus"),
    ("poisonous", "poisonous"),
    ("ravenous", "ravenous"),
    ("werewolves", "werewolf"),
    ("wolves", "wolf"),
    ("zombies", "zombie"),
];

/// The singular form of a lowercase word.
pub fn singularize(word: &str) -> String {
    if let Some((_, singular)) = OVERRIDES.iter().find(|(plural, _)| *plural == word) {
        return singular.to_string();
    }
    if word.is_empty() || !word.chars().all(|c| c.is_ascii_lowercase()) {
        return word.to_string();
    }
    to_singular(word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("creatures", "creature")]
    #[case("humans", "human")]
    #[case("mercenaries", "mercenary")]
    #[case("zombies", "zombie")]
    #[case("elves", "elf")]
    #[case("wolves", "wolf")]
    #[case("sphinxes", "sphinx")]
    #[case("witches", "witch")]
    #[case("artifacts", "artifact")]
    fn test_plural_forms(#[case] plural: &str, #[case] singular: &str) {
        assert_eq!(singularize(plural), singular);
    }

    #[rstest]
    #[case("creature")]
    #[case("prowess")]
    #[case("madness")]
    #[case("octopus")]
    #[case("ravenous")]
    #[case("urza's")]
    #[case("assembly-worker")]
    #[case("cyclops")]
    #[case("kithkin")]
    #[case("flying")]
    fn test_words_left_alone(#[case] word: &str) {
        assert_eq!(singularize(word), word);
    }
}
