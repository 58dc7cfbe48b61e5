//! Text Normalizer
//!
//! Pure string-to-string passes applied to raw card text before names are
//! resolved and the text is parsed:
//!
//!     - [strip_reminder_text]: drops parenthesized reminder text.
//!     - [lowercase_prose]: lowercases every word that is not a placeholder.
//!     - [fix_typography]: "non" hyphenation, loyalty minus signs, quote placement, apostrophes.
//!
//! [normalize] chains the three for text that needs no name resolution; the
//! card pipeline in [crate::card] interleaves name resolution between them.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Marker substituted for the card's own name.
pub const SELF_MARKER: &str = "SELF";
/// Marker substituted for the name of the card that created this object.
pub const PARENT_MARKER: &str = "PARENT";
/// Prefix of every canonical name token.
pub const NAME_MARKER: &str = "NAME_";

/// A parenthesized span, allowing braced symbols (which may hold parens) inside.
/// One character on each side is captured so the replacement can decide what
/// to keep.
static REMINDER_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(.?)\([^{()]*(\{[^}]*\}[^{()]*)*\)(.?)").unwrap());

/// "non" followed by at least two word characters; "none" stays intact.
static NON_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bnon(\w{2,})").unwrap());

/// Unicode minus at line start (planeswalker loyalty costs).
static LEADING_MINUS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^−").unwrap());

/// Sentence punctuation directly before a closing quote.
static PUNCTUATION_IN_QUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"([.,])""#).unwrap());

/// The same before a closing single quote, as in nested grants
/// (`creatures have '{T}: Add {G}.'`).
static PUNCTUATION_IN_SINGLE_QUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([.,])'").unwrap());

/// Remove reminder text and trim the result.
///
/// A span preceded by a brace belongs to a hybrid mana symbol and is kept as is.
/// A span preceded by a space keeps its trailing character unless that is a
/// closing parenthesis, so sentence-final punctuation survives.
pub fn strip_reminder_text(text: &str) -> String {
    REMINDER_TEXT
        .replace_all(text, |caps: &Captures| {
            let span = &caps[0];
            let before = caps.get(1).map_or("", |m| m.as_str());
            let after = caps.get(3).map_or("", |m| m.as_str());
            if before == "{" {
                span.to_string()
            } else if before == " " && !span.ends_with(')') {
                after.to_string()
            } else {
                String::new()
            }
        })
        .trim()
        .to_string()
}

/// Lowercase every space-separated word that holds no placeholder marker.
///
/// A single character (a bare mana pip) is left untouched.
pub fn lowercase_prose(text: &str) -> String {
    if text.chars().count() == 1 {
        return text.to_string();
    }
    text.split(' ')
        .map(|word| {
            if is_placeholder_word(word) {
                word.to_string()
            } else {
                word.to_lowercase()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_placeholder_word(word: &str) -> bool {
    word.contains(SELF_MARKER) || word.contains(PARENT_MARKER) || word.contains(NAME_MARKER)
}

/// Apply the typography fixes until the text stops changing.
pub fn fix_typography(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = fix_typography_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn fix_typography_once(text: &str) -> String {
    let text = text.replace('’', "'");
    let text = NON_PREFIX.replace_all(&text, "non-${1}");
    let text = LEADING_MINUS.replace_all(&text, "-");
    let text = PUNCTUATION_IN_SINGLE_QUOTE.replace_all(&text, "'${1}");
    PUNCTUATION_IN_QUOTE
        .replace_all(&text, "\"${1}")
        .into_owned()
}

/// Normalize a type line: case and apostrophes only.
pub fn normalize_type_line(type_line: &str) -> String {
    lowercase_prose(type_line).replace('’', "'")
}

/// Normalize rules text that needs no name resolution.
pub fn normalize(text: &str) -> String {
    let lines: Vec<String> = text
        .split('\n')
        .map(|line| lowercase_prose(&strip_reminder_text(line)))
        .collect();
    fix_typography(&lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_reminder_text() {
        assert_eq!(
            strip_reminder_text("Flying (This creature can't be blocked except by creatures with flying or reach.)"),
            "Flying"
        );
    }

    #[test]
    fn keeps_punctuation_after_reminder_text() {
        assert_eq!(
            strip_reminder_text("Draw a card (it goes to your hand), then discard."),
            "Draw a card, then discard."
        );
    }

    #[test]
    fn reminder_text_may_hold_hybrid_symbols() {
        assert_eq!(
            strip_reminder_text("{W/U} (This symbol can be paid with either {W} or {U}.)"),
            "{W/U}"
        );
    }

    #[test]
    fn parens_inside_braces_survive() {
        assert_eq!(strip_reminder_text("Pay {(2/W)} now"), "Pay {(2/W)} now");
    }

    #[test]
    fn lowercases_prose_but_not_placeholders() {
        assert_eq!(
            lowercase_prose("When SELF Enters, Target NAME_Abc_Def Dies"),
            "when SELF enters, target NAME_Abc_Def dies"
        );
    }

    #[test]
    fn single_character_is_untouched() {
        assert_eq!(lowercase_prose("W"), "W");
    }

    #[test]
    fn hyphenates_non() {
        assert_eq!(fix_typography("destroy target nonbasic land"), "destroy target non-basic land");
        assert_eq!(fix_typography("none of them"), "none of them");
        assert_eq!(fix_typography("Nonland"), "non-land");
    }

    #[test]
    fn normalizes_loyalty_minus() {
        assert_eq!(fix_typography("−3: destroy it.\n−x: go"), "-3: destroy it.\n-x: go");
    }

    #[test]
    fn moves_punctuation_out_of_quotes() {
        assert_eq!(
            fix_typography("it gains \"{t}: add {g}.\""),
            "it gains \"{t}: add {g}\"."
        );
        assert_eq!(fix_typography("SELF’s power"), "SELF's power");
        assert_eq!(
            fix_typography("it gains \"others have '{t}: add {g}.'\""),
            "it gains \"others have '{t}: add {g}'\"."
        );
        assert_eq!(fix_typography("players' hands, each"), "players' hands, each");
    }

    #[test]
    fn type_lines_keep_their_dash() {
        assert_eq!(
            normalize_type_line("Legendary Creature — Human Wizard"),
            "legendary creature — human wizard"
        );
        assert_eq!(normalize_type_line("Creature — Urza’s"), "creature — urza's");
    }

    #[test]
    fn normalize_is_idempotent_on_a_sample() {
        let once = normalize("Nonbasic lands are Mountains. (Reminder.)\n−2: Target player draws.");
        assert_eq!(once, "non-basic lands are mountains.\n-2: target player draws.");
        assert_eq!(normalize(&once), once);
    }
}
