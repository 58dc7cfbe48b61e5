//! Declarative Grammar Engine - Regex-Based Parser for rules text
//!
//! The deterministic strategy, tried before the combinator grammar:
//!
//!     1. Converts token sequences to grammar notation strings (`<v:draw>`,
//!        `<sym>`, `<comma>`, ...)
//!     2. Matches against regex patterns in declaration order
//!     3. Maps match groups back to token ranges by counting `<` in the notation
//!
//! Regex matching is linear and leftmost-first, so the stage is fast but can't
//! backtrack over sentence structure. It only covers the common shapes:
//! keyword lines, activated abilities with simple costs, event and phase
//! triggers, and static effects made of plain sentences. Durations,
//! conditions, "then" chains and granted abilities are left to the general
//! stage. A clause whose verb position depends on how the subject is read
//! (lazy and greedy matches disagree) is reported as ambiguous.

use super::api::{Attempt, EntryRule};
use super::ir::{KeywordShape, ParseNode, Rule, TriggerKind};
use super::tokens::{Token, TokenSpan};
use super::vocabulary::{self, ArgKind, Keyword, KEYWORDS_LONGEST_FIRST};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::ops::Range;

/// A phrase token in clause notation. Structural words (`<x:…>`) are absent.
const PHRASE: &str = r"(?:<(?:w|v|m|p|when|at):[^>]+>|<ref>|<sym>|<num>|<signed>|<pt>|<poss>|<apos>|<comma>|<semi>|<dash>|<bullet>|<lparen>|<rparen>)";

static CLAUSE_LAZY: Lazy<Regex> = Lazy::new(|| Regex::new(&clause_pattern("*?")).unwrap());
static CLAUSE_GREEDY: Lazy<Regex> = Lazy::new(|| Regex::new(&clause_pattern("*")).unwrap());

fn clause_pattern(subject_repeat: &str) -> String {
    format!(
        r"^(?P<subject>{p}{s})(?P<verb>(?:<m:[^>]+>)?<v:[^>]+>)(?P<direct>{p}*?)(?P<indirect><p:[^>]+>{p}+?)?$",
        p = PHRASE,
        s = subject_repeat
    )
}

/// Entry-rule patterns as regex rules with names and patterns.
const GRAMMAR_PATTERNS: &[(&str, &str)] = &[
    ("mana_cost", r"^(?:<sym>)*$"),
    (
        "type_line",
        r"^(?P<supers>(?:<super>)*)(?P<types>(?:<type>)+)(?:<dash>(?P<subs>(?:<super>|<type>|<w>)+))?$",
    ),
    ("ability_word", r"^(?:<w:[^>]+>)+<dash>"),
    (
        "phase_trigger",
        r"^<at:at>(?:<w:the>)?(?P<when><w:beginning>|<w:end>)<w:of>(?P<phase>(?:<w:[^>]+>|<poss>|<ref>)+?)<comma>",
    ),
    ("mana_item", r"^(?:<sym>)+$"),
    ("loyalty_item", r"^(?:<signed>|<num>)$"),
];

/// Keyword argument patterns, tried in this order.
const KEYWORD_PATTERNS: &[(KeywordShape, &str)] = &[
    (
        KeywordShape::QualityCost,
        r"^(?P<quality>(?:<w:[^>]+>|<ref>)+?)(?P<cost>(?:<sym>)+)$",
    ),
    (KeywordShape::From, r"^(?:<w:from>(?:<w:[^>]+>)+)+$"),
    (KeywordShape::Quality, r"^(?P<quality>(?:<w:[^>]+>|<ref>)+)$"),
    (
        KeywordShape::IntCost,
        r"^(?:(?P<int><num>)|(?P<cost>(?:<sym>)+))?$",
    ),
];

static PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    GRAMMAR_PATTERNS
        .iter()
        .map(|(name, pattern)| (*name, Regex::new(pattern).unwrap()))
        .collect()
});

static KEYWORD_REGEXES: Lazy<Vec<(KeywordShape, Regex)>> = Lazy::new(|| {
    KEYWORD_PATTERNS
        .iter()
        .map(|(shape, pattern)| (*shape, Regex::new(pattern).unwrap()))
        .collect()
});

fn pattern(name: &str) -> &'static Regex {
    PATTERNS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, regex)| regex)
        .unwrap_or_else(|| panic!("no grammar pattern named {}", name))
}

/// Parse `tokens` as `rule` with the declarative patterns.
pub fn parse(rule: EntryRule, tokens: &[TokenSpan]) -> Attempt {
    match rule {
        EntryRule::ManaCost => mana_cost(tokens),
        EntryRule::TypeLine => type_line(tokens),
        EntryRule::RulesText => rules_text(tokens),
    }
}

/// Convert a token to its notation in ability clauses.
fn class_of(token: &Token) -> String {
    match token {
        Token::Word(w) if vocabulary::is_structural(w) => format!("<x:{}>", w),
        Token::Word(w) if vocabulary::is_verb(w) => format!("<v:{}>", w),
        Token::Word(w) if vocabulary::is_modal(w) => format!("<m:{}>", w),
        Token::Word(w) if vocabulary::is_preposition(w) => format!("<p:{}>", w),
        Token::Word(w) if vocabulary::is_trigger_word(w) => format!("<when:{}>", w),
        Token::Word(w) if w == "at" => "<at:at>".to_string(),
        Token::Word(w) => format!("<w:{}>", w),
        other => punctuation_class(other).to_string(),
    }
}

/// Convert a token to its notation in keyword lines, where words are plain.
fn keyword_class_of(token: &Token) -> String {
    match token {
        Token::Word(w) => format!("<w:{}>", w),
        other => punctuation_class(other).to_string(),
    }
}

fn type_class_of(token: &Token) -> &'static str {
    match token {
        Token::Word(w) if vocabulary::is_supertype(w) => "<super>",
        Token::Word(w) if vocabulary::is_card_type(w) => "<type>",
        Token::Word(_) => "<w>",
        other => punctuation_class(other),
    }
}

fn punctuation_class(token: &Token) -> &'static str {
    match token {
        Token::Symbol(_) => "<sym>",
        Token::SelfRef | Token::ParentRef | Token::Name(_) => "<ref>",
        Token::PowerToughness(_) => "<pt>",
        Token::Signed(_) => "<signed>",
        Token::Number(_) => "<num>",
        Token::Word(_) => "<w>",
        Token::Possessive => "<poss>",
        Token::Apostrophe => "<apos>",
        Token::Comma => "<comma>",
        Token::Period => "<period>",
        Token::Colon => "<colon>",
        Token::Semicolon => "<semi>",
        Token::Quote => "<quote>",
        Token::EmDash => "<dash>",
        Token::Bullet => "<bullet>",
        Token::OpenParen => "<lparen>",
        Token::CloseParen => "<rparen>",
        Token::Newline => "<nl>",
    }
}

fn notation<S: AsRef<str>>(tokens: &[TokenSpan], class: impl Fn(&Token) -> S) -> String {
    tokens.iter().map(|(t, _)| class(t).as_ref().to_string()).collect()
}

/// Count the number of tokens a notation fragment spans.
fn count_consumed_tokens(notation: &str) -> usize {
    notation.matches('<').count()
}

/// Token range covered by a capture group.
fn group_range(notation: &str, caps: &Captures, group: &str) -> Option<Range<usize>> {
    caps.name(group).map(|m| {
        let start = count_consumed_tokens(&notation[..m.start()]);
        start..start + count_consumed_tokens(m.as_str())
    })
}

fn mana_cost(tokens: &[TokenSpan]) -> Attempt {
    let notation = notation(tokens, punctuation_class);
    if !pattern("mana_cost").is_match(&notation) {
        return Attempt::Failed(format!("mana cost must be symbols only, got {}", notation));
    }
    Attempt::Parsed(mana_node(Rule::ManaCost, tokens))
}

fn mana_node(rule: Rule, tokens: &[TokenSpan]) -> ParseNode {
    let symbols = tokens
        .iter()
        .map(|t| ParseNode::leaf(Rule::ManaSymbol, vec![t.clone()]))
        .collect();
    ParseNode::branch(rule, symbols)
}

fn type_line(tokens: &[TokenSpan]) -> Attempt {
    let notation = notation(tokens, type_class_of);
    let Some(caps) = pattern("type_line").captures(&notation) else {
        return Attempt::Failed(format!("no type line pattern matches {}", notation));
    };
    let mut children = Vec::new();
    for (group, rule) in [
        ("supers", Rule::Supertype),
        ("types", Rule::CardType),
        ("subs", Rule::Subtype),
    ] {
        if let Some(range) = group_range(&notation, &caps, group) {
            children.extend(
                tokens[range]
                    .iter()
                    .map(|t| ParseNode::leaf(rule, vec![t.clone()])),
            );
        }
    }
    Attempt::Parsed(ParseNode::branch(Rule::Typeline, children))
}

fn rules_text(tokens: &[TokenSpan]) -> Attempt {
    if tokens.is_empty() {
        return Attempt::Parsed(ParseNode::branch(Rule::RulesText, Vec::new()));
    }
    let mut lines = Vec::new();
    for line in tokens.split(|(t, _)| *t == Token::Newline) {
        let line = match line.first() {
            Some((Token::Bullet, _)) => &line[1..],
            _ => line,
        };
        if let Some(node) = keyword_line(line) {
            lines.push(node);
            continue;
        }
        match ability(line) {
            Attempt::Parsed(node) => lines.push(node),
            other => return other,
        }
    }
    Attempt::Parsed(ParseNode::branch(Rule::RulesText, lines))
}

fn keyword_line(tokens: &[TokenSpan]) -> Option<ParseNode> {
    let tokens = match tokens.last() {
        Some((Token::Period, _)) => &tokens[..tokens.len() - 1],
        _ => tokens,
    };
    if tokens.is_empty() {
        return None;
    }
    let items = tokens
        .split(|(t, _)| *t == Token::Comma)
        .map(keyword_ability)
        .collect::<Option<Vec<_>>>()?;
    Some(ParseNode::branch(Rule::KeywordLine, items))
}

fn keyword_ability(tokens: &[TokenSpan]) -> Option<ParseNode> {
    let keyword = KEYWORDS_LONGEST_FIRST
        .iter()
        .find(|k| starts_with_words(tokens, k))?;
    let split = keyword.word_count();
    let (name, rest) = tokens.split_at(split);
    let notation = notation(rest, keyword_class_of);
    for (shape, regex) in KEYWORD_REGEXES.iter() {
        let Some(caps) = regex.captures(&notation) else {
            continue;
        };
        let Some(arguments) = keyword_arguments(*shape, keyword, rest, &notation, &caps) else {
            continue;
        };
        let mut children = vec![ParseNode::leaf(Rule::KeywordName, name.to_vec())];
        children.extend(arguments);
        return Some(ParseNode::branch(Rule::KeywordAbility(*shape), children));
    }
    None
}

fn starts_with_words(tokens: &[TokenSpan], keyword: &Keyword) -> bool {
    let mut count = 0;
    for word in keyword.words() {
        match tokens.get(count) {
            Some((token, _)) if token.is_word(word) => count += 1,
            _ => return false,
        }
    }
    true
}

/// Argument nodes for a matched shape, or `None` if the keyword doesn't take it.
fn keyword_arguments(
    shape: KeywordShape,
    keyword: &Keyword,
    rest: &[TokenSpan],
    notation: &str,
    caps: &Captures,
) -> Option<Vec<ParseNode>> {
    let takes = |kind| vocabulary::keyword_takes(keyword.name, kind);
    match shape {
        KeywordShape::QualityCost => {
            let quality = group_range(notation, caps, "quality")?;
            let cost = group_range(notation, caps, "cost")?;
            takes(ArgKind::QualityCost).then(|| {
                vec![
                    ParseNode::leaf(Rule::KeywordQuality, rest[quality].to_vec()),
                    mana_node(Rule::KeywordCost, &rest[cost]),
                ]
            })
        }
        KeywordShape::From => {
            if !takes(ArgKind::From) {
                return None;
            }
            from_segments(rest)
        }
        KeywordShape::Quality => {
            let quality = group_range(notation, caps, "quality")?;
            takes(ArgKind::Quality)
                .then(|| vec![ParseNode::leaf(Rule::KeywordQuality, rest[quality].to_vec())])
        }
        KeywordShape::IntCost => {
            if let Some(int) = group_range(notation, caps, "int") {
                takes(ArgKind::Int)
                    .then(|| vec![ParseNode::leaf(Rule::KeywordInt, rest[int].to_vec())])
            } else if let Some(cost) = group_range(notation, caps, "cost") {
                takes(ArgKind::Cost).then(|| vec![mana_node(Rule::KeywordCost, &rest[cost])])
            } else {
                takes(ArgKind::Bare).then(Vec::new)
            }
        }
    }
}

/// Split `from a and from b` into one node per quality, dropping conjunctions.
fn from_segments(tokens: &[TokenSpan]) -> Option<Vec<ParseNode>> {
    let mut segments = Vec::new();
    for segment in tokens.split(|(t, _)| t.is_word("from")).skip(1) {
        let segment = match segment.last() {
            Some((t, _)) if t.is_word("and") || t.is_word("or") => &segment[..segment.len() - 1],
            _ => segment,
        };
        if segment.is_empty() {
            return None;
        }
        segments.push(ParseNode::leaf(Rule::KeywordFrom, segment.to_vec()));
    }
    Some(segments)
}

fn ability(tokens: &[TokenSpan]) -> Attempt {
    let mut tokens = tokens;
    let line = notation(tokens, keyword_class_of);
    if let Some(found) = pattern("ability_word").find(&line) {
        tokens = &tokens[count_consumed_tokens(found.as_str())..];
    }
    let Some((first, _)) = tokens.first() else {
        return Attempt::Failed("empty line".to_string());
    };

    if let Some(colon) = tokens.iter().position(|(t, _)| *t == Token::Colon) {
        let cost = match cost(&tokens[..colon]) {
            Attempt::Parsed(node) => node,
            other => return other,
        };
        return with_effects(cost, &tokens[colon + 1..]);
    }

    if first.word().is_some_and(vocabulary::is_trigger_word) {
        let Some(comma) = tokens.iter().position(|(t, _)| *t == Token::Comma) else {
            return Attempt::Failed("trigger without a comma".to_string());
        };
        let trigger = match clause(&tokens[1..comma]) {
            Attempt::Parsed(sentence) => ParseNode::new(
                Rule::Trigger(TriggerKind::Event),
                vec![tokens[0].clone()],
                vec![sentence],
            ),
            other => return other,
        };
        return with_effects(trigger, &tokens[comma + 1..]);
    }

    if first.is_word("at") {
        let notation = notation(tokens, class_of);
        let Some(caps) = pattern("phase_trigger").captures(&notation) else {
            return Attempt::Failed(format!("no phase trigger pattern matches {}", notation));
        };
        let (Some(when), Some(phase)) = (
            group_range(&notation, &caps, "when"),
            group_range(&notation, &caps, "phase"),
        ) else {
            return Attempt::Failed("phase trigger without a phase".to_string());
        };
        let consumed = phase.end + 1;
        let trigger = ParseNode::branch(
            Rule::Trigger(TriggerKind::Phase),
            vec![
                ParseNode::leaf(Rule::Verb, tokens[when].to_vec()),
                ParseNode::leaf(Rule::Subject, tokens[phase].to_vec()),
            ],
        );
        return with_effects(trigger, &tokens[consumed..]);
    }

    match effects(tokens) {
        Attempt::Parsed(effects) => Attempt::Parsed(ParseNode::branch(Rule::Ability, vec![effects])),
        other => other,
    }
}

fn with_effects(head: ParseNode, tokens: &[TokenSpan]) -> Attempt {
    match effects(tokens) {
        Attempt::Parsed(effects) => {
            Attempt::Parsed(ParseNode::branch(Rule::Ability, vec![head, effects]))
        }
        other => other,
    }
}

fn cost(tokens: &[TokenSpan]) -> Attempt {
    let mut items = Vec::new();
    for item in tokens.split(|(t, _)| *t == Token::Comma) {
        let notation = notation(item, class_of);
        let node = if pattern("mana_item").is_match(&notation) {
            mana_node(Rule::Mana, item)
        } else if pattern("loyalty_item").is_match(&notation) {
            ParseNode::leaf(Rule::Loyalty, item.to_vec())
        } else {
            match clause(item) {
                Attempt::Parsed(sentence) => sentence,
                other => return other,
            }
        };
        items.push(node);
    }
    Attempt::Parsed(ParseNode::branch(Rule::Cost, items))
}

fn effects(tokens: &[TokenSpan]) -> Attempt {
    let tokens = match tokens.last() {
        Some((Token::Period, _)) => &tokens[..tokens.len() - 1],
        _ => tokens,
    };
    if tokens.is_empty() {
        return Attempt::Failed("ability without effects".to_string());
    }
    let mut atomics = Vec::new();
    for piece in tokens.split(|(t, _)| *t == Token::Period) {
        match clause(piece) {
            Attempt::Parsed(sentence) => {
                atomics.push(ParseNode::branch(Rule::AtomicEffect, vec![sentence]))
            }
            other => return other,
        }
    }
    Attempt::Parsed(ParseNode::branch(Rule::Effects, atomics))
}

/// Parse one plain sentence: `Subject? Verb DirectObject? IndirectObject?`.
fn clause(tokens: &[TokenSpan]) -> Attempt {
    let notation = notation(tokens, class_of);
    let (Some(lazy), Some(greedy)) = (
        CLAUSE_LAZY.captures(&notation),
        CLAUSE_GREEDY.captures(&notation),
    ) else {
        return Attempt::Failed(format!("no sentence pattern matches {}", notation));
    };
    let verb = group_range(&notation, &lazy, "verb");
    let greedy_verb = group_range(&notation, &greedy, "verb");
    let Some(verb) = verb else {
        return Attempt::Failed(format!("sentence without a verb: {}", notation));
    };
    if greedy_verb.map(|r| r.end) != Some(verb.end) {
        return Attempt::Ambiguous(format!("verb position is ambiguous in {}", notation));
    }

    let mut children = Vec::new();
    let groups = [
        ("subject", Rule::Subject),
        ("verb", Rule::Verb),
        ("direct", Rule::DirectObject),
        ("indirect", Rule::IndirectObject),
    ];
    for (group, rule) in groups {
        if let Some(range) = group_range(&notation, &lazy, group) {
            if !range.is_empty() {
                children.push(ParseNode::leaf(rule, tokens[range].to_vec()));
            }
        }
    }
    Attempt::Parsed(ParseNode::branch(Rule::Sentence, children))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::tokens::tokenize;

    fn attempt(rule: EntryRule, text: &str) -> Attempt {
        let tokens = tokenize(rule, text).unwrap();
        parse(rule, &tokens)
    }

    fn outline(rule: EntryRule, text: &str) -> String {
        match attempt(rule, text) {
            Attempt::Parsed(node) => node.outline(),
            other => panic!("expected a parse, got {:?}", other),
        }
    }

    #[test]
    fn test_notation_counts_tokens() {
        let tokens = tokenize(EntryRule::RulesText, "draw a card.").unwrap();
        let line = notation(&tokens, class_of);
        assert_eq!(line, "<v:draw><w:a><w:card><period>");
        assert_eq!(count_consumed_tokens(&line), 4);
    }

    #[test]
    fn test_type_line() {
        insta::assert_snapshot!(outline(EntryRule::TypeLine, "legendary creature — human wizard"), @r###"
        Typeline
          Supertype "legendary"
          CardType "creature"
          Subtype "human"
          Subtype "wizard"
        "###);
    }

    #[test]
    fn test_keyword_line() {
        insta::assert_snapshot!(outline(EntryRule::RulesText, "flying, protection from red and from blue"), @r###"
        RulesText
          KeywordLine
            KeywordAbility(IntCost)
              KeywordName "flying"
            KeywordAbility(From)
              KeywordName "protection"
              KeywordFrom "red"
              KeywordFrom "blue"
        "###);
    }

    #[test]
    fn test_activated_ability() {
        insta::assert_snapshot!(outline(EntryRule::RulesText, "{t}: add {g}."), @r###"
        RulesText
          Ability
            Cost
              Mana
                ManaSymbol "{t}"
            Effects
              AtomicEffect
                Sentence
                  Verb "add"
                  DirectObject "{g}"
        "###);
    }

    #[test]
    fn test_indirect_object() {
        insta::assert_snapshot!(outline(EntryRule::RulesText, "SELF deals 3 damage to any target."), @r###"
        RulesText
          Ability
            Effects
              AtomicEffect
                Sentence
                  Subject "SELF"
                  Verb "deals"
                  DirectObject "3 damage"
                  IndirectObject "to any target"
        "###);
    }

    #[test]
    fn test_two_verbs_are_ambiguous() {
        assert!(matches!(
            attempt(EntryRule::RulesText, "creatures you control get +1/+1."),
            Attempt::Ambiguous(_)
        ));
    }

    #[test]
    fn test_durations_are_left_to_the_general_stage() {
        assert!(matches!(
            attempt(EntryRule::RulesText, "SELF gets +2/+2 until end of turn."),
            Attempt::Failed(_)
        ));
    }
}
