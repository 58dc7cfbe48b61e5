//! Short names
//!
//! Legendary cards often refer to themselves by the part of their name before
//! the epithet: "Kiki-Jiki, Mirror Breaker" says "Kiki-Jiki", "Rakdos the
//! Defiler" says "Rakdos". Names that can't be split that way come from the
//! configured override table.

use std::collections::BTreeMap;

/// Derive the short name a card uses for itself, if any.
pub fn short_name(name: &str, overrides: &BTreeMap<String, String>) -> Option<String> {
    if let Some(idx) = name.find(", ") {
        return Some(name[..idx].trim().to_string());
    }
    if let Some(idx) = name.find(" the ") {
        let prefix = &name[..idx];
        // "Patron of the Orochi": a lowercase word before "the" is part of the name
        let ends_in_connector = prefix
            .split_whitespace()
            .last()
            .map_or(true, is_lowercase_word);
        if !ends_in_connector {
            return Some(prefix.trim().to_string());
        }
    }
    overrides.get(name).cloned()
}

/// Names that refer to the face itself: its full name, then its short name.
///
/// A planeswalker's short name in its own text is usually its subtype, so
/// planeswalkers only answer to their full name.
pub fn face_self_names(
    name: &str,
    normalized_types: &str,
    overrides: &BTreeMap<String, String>,
) -> Vec<String> {
    let mut names = vec![name.to_string()];
    if !normalized_types.contains("planeswalker") {
        if let Some(short) = short_name(name, overrides) {
            names.push(short);
        }
    }
    names
}

fn is_lowercase_word(word: &str) -> bool {
    let mut cased = false;
    for c in word.chars() {
        if c.is_uppercase() {
            return false;
        }
        cased |= c.is_lowercase();
    }
    cased
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn overrides() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("Drizzt Do'Urden".to_string(), "Drizzt".to_string()),
            ("Hivis of the Scale".to_string(), "Hivis".to_string()),
        ])
    }

    #[rstest]
    #[case("Kiki-Jiki, Mirror Breaker", Some("Kiki-Jiki"))]
    #[case("Rakdos the Defiler", Some("Rakdos"))]
    #[case("Patron of the Orochi", None)]
    #[case("Hivis of the Scale", Some("Hivis"))]
    #[case("Drizzt Do'Urden", Some("Drizzt"))]
    #[case("Grizzly Bears", None)]
    fn derives_short_names(#[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(short_name(name, &overrides()).as_deref(), expected);
    }

    #[test]
    fn planeswalkers_skip_short_names() {
        let none = BTreeMap::new();
        assert_eq!(
            face_self_names("Nissa, Who Shakes the World", "legendary planeswalker — nissa", &none),
            vec!["Nissa, Who Shakes the World".to_string()]
        );
        assert_eq!(
            face_self_names("Kiki-Jiki, Mirror Breaker", "legendary creature — goblin shaman", &none),
            vec!["Kiki-Jiki, Mirror Breaker".to_string(), "Kiki-Jiki".to_string()]
        );
    }
}
