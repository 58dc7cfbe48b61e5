//! Parsing through both grammar strategies and into the model

use demystify::grammar::{parse, parse_with, Attempt, EntryRule, Strategy};
use demystify::model::{
    Ability, CardType, KeywordAbility, Line, Mana, ManaSymbol, Object, Supertype,
};
use demystify::normalize::normalize_type_line;
use demystify::{parse_mana, parse_rules_text, parse_typeline, Error};
use proptest::prelude::*;
use proptest::strategy::Strategy as _;
use rstest::rstest;

fn parsed(strategy: Strategy, rule: EntryRule, text: &str) -> demystify::grammar::ParseNode {
    match parse_with(strategy, rule, text).unwrap() {
        Attempt::Parsed(node) => node,
        other => panic!("{:?} did not parse {:?}: {:?}", strategy, text, other),
    }
}

#[rstest]
#[case(EntryRule::ManaCost, "{2}{U}{U}")]
#[case(EntryRule::ManaCost, "")]
#[case(EntryRule::TypeLine, "legendary creature — human wizard")]
#[case(EntryRule::TypeLine, "artifact")]
#[case(EntryRule::RulesText, "flying, vigilance")]
#[case(EntryRule::RulesText, "protection from red and from blue")]
#[case(EntryRule::RulesText, "enchant creature")]
#[case(EntryRule::RulesText, "equip {2}")]
#[case(EntryRule::RulesText, "{t}: add {g}.")]
#[case(EntryRule::RulesText, "{1}, sacrifice SELF: draw a card.")]
#[case(EntryRule::RulesText, "+1: you gain 2 life.")]
#[case(EntryRule::RulesText, "SELF deals 3 damage to any target.")]
#[case(EntryRule::RulesText, "when SELF enters, draw a card.")]
#[case(EntryRule::RulesText, "at the beginning of your upkeep, you lose 1 life.")]
#[case(EntryRule::RulesText, "landfall — you gain 2 life.")]
#[case(EntryRule::RulesText, "flying\n{t}: add {g}.")]
fn test_strategies_build_the_same_tree(#[case] rule: EntryRule, #[case] text: &str) {
    let deterministic = parsed(Strategy::Deterministic, rule, text);
    let general = parsed(Strategy::General, rule, text);
    assert_eq!(deterministic, general);
}

#[rstest]
#[case("creatures you control get +1/+1.")]
#[case("target creature gets +3/+3 until end of turn.")]
#[case("counter target spell unless its controller pays {3}.")]
#[case("equipped creature has \"{t}: add {g}\".")]
#[case("if you do, draw a card.")]
fn test_general_stage_covers_the_rest(#[case] text: &str) {
    let deterministic = parse_with(Strategy::Deterministic, EntryRule::RulesText, text).unwrap();
    assert!(!matches!(deterministic, Attempt::Parsed(_)));
    assert!(parse(EntryRule::RulesText, text).is_ok());
}

#[test]
fn test_hybrid_mana_cost() {
    assert_eq!(
        parse_mana("{2}{R/P}").unwrap(),
        Mana(vec![ManaSymbol::new("2"), ManaSymbol::hybrid("R", "P")])
    );
}

#[test]
fn test_malformed_mana_symbol() {
    let err = parse_mana("{R/P/W}").unwrap_err();
    assert!(matches!(err, Error::Mana(ref malformed) if malformed.symbol == "R/P/W"));
}

#[test]
fn test_type_line() {
    let typeline =
        parse_typeline(&normalize_type_line("Legendary Creature — Human Wizard")).unwrap();
    assert_eq!(typeline.supertypes, vec![Supertype::Legendary]);
    assert_eq!(typeline.card_types, vec![CardType::Creature]);
    assert_eq!(typeline.subtypes, vec!["human", "wizard"]);
}

#[test]
fn test_unknown_characters_fail_to_parse() {
    let err = parse_rules_text("draw a card ♥.").unwrap_err();
    assert!(matches!(err, Error::Parse(ref failure) if failure.rule == EntryRule::RulesText));
}

#[test]
fn test_rules_text_lines_keep_their_order() {
    let rules = parse_rules_text("flying\nwhen SELF enters, draw a card.").unwrap();
    assert!(matches!(&rules.lines()[0], Line::Keywords(k) if k == &vec![KeywordAbility::bare("flying")]));
    assert!(matches!(
        &rules.lines()[1],
        Line::Ability(Ability::Triggered { .. })
    ));
}

#[test]
fn test_created_token_with_granted_ability() {
    let rules =
        parse_rules_text("create NAME_Marit_Lage with \"SELF can't be blocked by PARENT\".")
            .unwrap();
    let Line::Ability(ability) = &rules.lines()[0] else {
        panic!("expected an ability");
    };
    let effect = &ability.effects()[0].effect;
    assert_eq!(effect.verb, "create");
    let Some(Object::Granted { phrase, ability }) = &effect.direct_object else {
        panic!("expected a granted ability, got {:?}", effect.direct_object);
    };
    assert_eq!(phrase, "NAME_Marit_Lage with");
    let Line::Ability(granted) = ability.as_ref() else {
        panic!("expected a granted ability line");
    };
    let sentence = &granted.effects()[0].effect;
    assert_eq!(sentence.subject, "SELF");
    assert_eq!(sentence.verb, "can't be");
}

fn mana_symbol() -> impl proptest::strategy::Strategy<Value = ManaSymbol> {
    let symbol = prop_oneof![r"[WUBRGCXS]", r"[0-9]{1,2}"];
    (symbol, proptest::option::of(r"[WUBRGP]")).prop_map(|(symbol, hybrid)| match hybrid {
        Some(hybrid) => ManaSymbol::hybrid(symbol, hybrid),
        None => ManaSymbol::new(symbol),
    })
}

proptest! {
    #[test]
    fn mana_round_trips_through_text(symbols in prop::collection::vec(mana_symbol(), 0..8)) {
        let mana = Mana(symbols);
        prop_assert_eq!(parse_mana(&mana.to_string()).unwrap(), mana);
    }
}
