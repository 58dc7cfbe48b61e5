//! Parser combinator functions for the general grammar stage.
//!
//! Every phrase-level parser takes a `follow` parser describing what must come
//! after it (a comma, the end of the line, a closing quote, ...). Phrases are
//! lazy: they stop at the first token boundary where `follow` would succeed,
//! checked with `rewind` so nothing is consumed. Together with [choice]
//! trying a verb at each position before extending the subject, this gives a
//! backtracking search over verb and phrase boundaries that prefers the
//! leftmost verb and the shortest objects.

use super::ir::{ConditionKind, DurationKind, KeywordShape, ParseNode, Rule, TriggerKind};
use super::tokens::{Token, TokenSpan};
use super::vocabulary::{self, ArgKind, Keyword, KEYWORDS_LONGEST_FIRST};
use chumsky::prelude::*;

/// Type alias for parser error
pub(crate) type ParserError = Simple<TokenSpan>;

/// Type-erased parser over the token stream
pub(crate) type P<O> = BoxedParser<'static, TokenSpan, O, ParserError>;

type Predicate = (ParseNode, Vec<ParseNode>);

/// Helper: match a specific token, keeping it
pub(crate) fn token(t: Token) -> P<TokenSpan> {
    filter(move |(tok, _): &TokenSpan| *tok == t).boxed()
}

/// Helper: match one specific word
fn word(w: &'static str) -> P<TokenSpan> {
    filter(move |(tok, _): &TokenSpan| tok.is_word(w)).boxed()
}

/// Helper: match a word of a closed class
fn word_where(class: fn(&str) -> bool) -> P<TokenSpan> {
    filter(move |(tok, _): &TokenSpan| tok.word().is_some_and(class)).boxed()
}

/// Helper: match a fixed sequence of words such as `for as long as`
fn words(text: &'static str) -> P<Vec<TokenSpan>> {
    text.split(' ').fold(empty().to(Vec::new()).boxed(), |parser, w| {
        parser
            .then(word(w))
            .map(|(mut seen, t)| {
                seen.push(t);
                seen
            })
            .boxed()
    })
}

/// Helper: the first alternative that succeeds
fn any_of<O: 'static>(alternatives: Vec<P<O>>) -> P<O> {
    alternatives
        .into_iter()
        .reduce(|a, b| a.or(b).boxed())
        .unwrap_or_else(|| {
            filter(|_: &TokenSpan| false)
                .try_map(|_, span| Err(Simple::custom(span, "no alternatives")))
                .boxed()
        })
}

fn phrase_token() -> P<TokenSpan> {
    filter(|(t, _): &TokenSpan| t.is_phrase()).boxed()
}

fn symbol() -> P<TokenSpan> {
    filter(|(t, _): &TokenSpan| matches!(t, Token::Symbol(_))).boxed()
}

/// One or more symbols as a node of `ManaSymbol` leaves.
fn mana(rule: Rule) -> P<ParseNode> {
    symbol()
        .repeated()
        .at_least(1)
        .map(move |symbols| mana_node(rule, symbols))
        .boxed()
}

fn mana_node(rule: Rule, symbols: Vec<TokenSpan>) -> ParseNode {
    ParseNode::branch(
        rule,
        symbols
            .into_iter()
            .map(|s| ParseNode::leaf(Rule::ManaSymbol, vec![s]))
            .collect(),
    )
}

/// One or more phrase tokens, stopping as soon as `follow` would match.
fn lazy_phrase(follow: P<()>) -> P<Vec<TokenSpan>> {
    recursive(move |rest: Recursive<'static, TokenSpan, Vec<TokenSpan>, ParserError>| {
        phrase_token()
            .then(choice((follow.clone().rewind().to(Vec::new()), rest.boxed())))
            .map(|(first, mut tail)| {
                tail.insert(0, first);
                tail
            })
    })
    .boxed()
}

/// Parse a mana cost: `ManaSymbol*`
pub(crate) fn mana_cost() -> P<ParseNode> {
    symbol()
        .repeated()
        .then_ignore(end())
        .map(|symbols| mana_node(Rule::ManaCost, symbols))
        .boxed()
}

/// Parse a type line: `Supertype* CardType+ (— Subtype+)?`
pub(crate) fn type_line() -> P<ParseNode> {
    let leaf = |rule| move |t: TokenSpan| ParseNode::leaf(rule, vec![t]);
    let supertypes = word_where(vocabulary::is_supertype)
        .map(leaf(Rule::Supertype))
        .repeated();
    let card_types = word_where(vocabulary::is_card_type)
        .map(leaf(Rule::CardType))
        .repeated()
        .at_least(1);
    let subtypes = token(Token::EmDash).ignore_then(
        filter(|(t, _): &TokenSpan| matches!(t, Token::Word(_)))
            .map(leaf(Rule::Subtype))
            .repeated()
            .at_least(1),
    );
    supertypes
        .then(card_types)
        .then(subtypes.or_not())
        .then_ignore(end())
        .map(|((supers, types), subs)| {
            let mut children = supers;
            children.extend(types);
            children.extend(subs.unwrap_or_default());
            ParseNode::branch(Rule::Typeline, children)
        })
        .boxed()
}

/// Parse rules text: `line (\n line)*`, each line optionally bulleted
pub(crate) fn rules_text() -> P<ParseNode> {
    let line_end = choice((token(Token::Newline).ignored(), end())).boxed();
    token(Token::Bullet)
        .or_not()
        .ignore_then(line(line_end, granted_ability()))
        .separated_by(token(Token::Newline))
        .then_ignore(end())
        .map(|lines| ParseNode::branch(Rule::RulesText, lines))
        .boxed()
}

/// A quoted ability granted to an object, parsed as a line of its own.
fn granted_ability() -> P<ParseNode> {
    recursive(|granted: Recursive<'static, TokenSpan, ParseNode, ParserError>| {
        let quote_follow = token(Token::Quote).ignored().boxed();
        token(Token::Quote)
            .ignore_then(line(quote_follow, granted.boxed()))
            .then_ignore(token(Token::Quote))
            .map(|line| ParseNode::branch(Rule::GrantedAbility, vec![line]))
    })
    .boxed()
}

fn line(follow: P<()>, granted: P<ParseNode>) -> P<ParseNode> {
    choice((keyword_line(follow.clone()), ability(follow, granted))).boxed()
}

/// Parse a keyword line: `KeywordAbility (, KeywordAbility)* .?`
fn keyword_line(follow: P<()>) -> P<ParseNode> {
    let item_end = choice((
        token(Token::Comma).ignored(),
        token(Token::Period).ignored(),
        follow.clone(),
    ))
    .boxed();
    let keyword = any_of(
        KEYWORDS_LONGEST_FIRST
            .iter()
            .map(|k| keyword_ability(*k, item_end.clone()))
            .collect(),
    );
    keyword
        .separated_by(token(Token::Comma))
        .at_least(1)
        .then_ignore(token(Token::Period).or_not())
        .then_ignore(follow.rewind())
        .map(|items| ParseNode::branch(Rule::KeywordLine, items))
        .boxed()
}

/// One keyword with each argument shape it accepts, in shape order.
fn keyword_ability(keyword: &'static Keyword, item_end: P<()>) -> P<ParseNode> {
    let takes = |kind| vocabulary::keyword_takes(keyword.name, kind);
    let quality_token =
        filter(|(t, _): &TokenSpan| matches!(t, Token::Word(_)) || t.is_reference());
    let done = item_end.rewind().boxed();

    let mut shapes: Vec<P<(KeywordShape, Vec<ParseNode>)>> = Vec::new();
    if takes(ArgKind::QualityCost) {
        shapes.push(
            quality_token
                .clone()
                .repeated()
                .at_least(1)
                .then(mana(Rule::KeywordCost))
                .then_ignore(done.clone())
                .map(|(quality, cost)| {
                    (
                        KeywordShape::QualityCost,
                        vec![ParseNode::leaf(Rule::KeywordQuality, quality), cost],
                    )
                })
                .boxed(),
        );
    }
    if takes(ArgKind::From) {
        let quality = filter(|(t, _): &TokenSpan| matches!(t, Token::Word(w) if w != "from"))
            .repeated()
            .at_least(1)
            .try_map(|mut segment: Vec<TokenSpan>, span| {
                if segment
                    .last()
                    .is_some_and(|(t, _)| t.is_word("and") || t.is_word("or"))
                {
                    segment.pop();
                }
                if segment.is_empty() {
                    return Err(Simple::custom(span, "empty protection quality"));
                }
                Ok(ParseNode::leaf(Rule::KeywordFrom, segment))
            });
        shapes.push(
            word("from")
                .ignore_then(quality)
                .repeated()
                .at_least(1)
                .then_ignore(done.clone())
                .map(|segments| (KeywordShape::From, segments))
                .boxed(),
        );
    }
    if takes(ArgKind::Quality) {
        shapes.push(
            quality_token
                .repeated()
                .at_least(1)
                .then_ignore(done.clone())
                .map(|quality| {
                    (
                        KeywordShape::Quality,
                        vec![ParseNode::leaf(Rule::KeywordQuality, quality)],
                    )
                })
                .boxed(),
        );
    }
    if takes(ArgKind::Int) {
        shapes.push(
            filter(|(t, _): &TokenSpan| matches!(t, Token::Number(_)))
                .then_ignore(done.clone())
                .map(|n| {
                    (
                        KeywordShape::IntCost,
                        vec![ParseNode::leaf(Rule::KeywordInt, vec![n])],
                    )
                })
                .boxed(),
        );
    }
    if takes(ArgKind::Cost) {
        shapes.push(
            mana(Rule::KeywordCost)
                .then_ignore(done.clone())
                .map(|cost| (KeywordShape::IntCost, vec![cost]))
                .boxed(),
        );
    }
    if takes(ArgKind::Bare) {
        shapes.push(done.to((KeywordShape::IntCost, Vec::new())).boxed());
    }

    words(keyword.name)
        .then(any_of(shapes))
        .map(|(name, (shape, arguments))| {
            let mut children = vec![ParseNode::leaf(Rule::KeywordName, name)];
            children.extend(arguments);
            ParseNode::branch(Rule::KeywordAbility(shape), children)
        })
        .boxed()
}

/// Parse an ability: `(Cost : | Trigger ,)? Effects`, after an optional
/// ability word (`landfall —`).
fn ability(follow: P<()>, granted: P<ParseNode>) -> P<ParseNode> {
    let comma = token(Token::Comma).ignored().boxed();
    let ability_word = filter(|(t, _): &TokenSpan| matches!(t, Token::Word(_)))
        .repeated()
        .at_least(1)
        .then(token(Token::EmDash));
    let effects = effects(follow, granted.clone());

    let activated = cost(granted.clone())
        .then_ignore(token(Token::Colon))
        .then(effects.clone())
        .map(|(cost, effects)| vec![cost, effects]);

    let event_trigger = word_where(vocabulary::is_trigger_word)
        .then(sentence(comma.clone(), granted))
        .then_ignore(comma.clone())
        .map(|(when, sentence)| {
            ParseNode::new(
                Rule::Trigger(TriggerKind::Event),
                vec![when],
                vec![sentence],
            )
        });

    let phase_trigger = word("at")
        .ignore_then(word("the").or_not())
        .ignore_then(choice((word("beginning"), word("end"))))
        .then_ignore(word("of"))
        .then(lazy_phrase(comma.clone()))
        .then_ignore(comma)
        .map(|(when, phase)| {
            ParseNode::branch(
                Rule::Trigger(TriggerKind::Phase),
                vec![
                    ParseNode::leaf(Rule::Verb, vec![when]),
                    ParseNode::leaf(Rule::Subject, phase),
                ],
            )
        });

    let triggered = choice((event_trigger, phase_trigger))
        .then(effects.clone())
        .map(|(trigger, effects)| vec![trigger, effects]);

    let static_ability = effects.map(|effects| vec![effects]);

    ability_word
        .or_not()
        .ignore_then(choice((activated, triggered, static_ability)))
        .map(|children| ParseNode::branch(Rule::Ability, children))
        .boxed()
}

/// Parse an activated ability's cost items, separated by commas.
fn cost(granted: P<ParseNode>) -> P<ParseNode> {
    let item_end = choice((
        token(Token::Comma).ignored(),
        token(Token::Colon).ignored(),
    ))
    .boxed();
    let loyalty = filter(|(t, _): &TokenSpan| matches!(t, Token::Signed(_) | Token::Number(_)))
        .then_ignore(item_end.clone().rewind())
        .map(|t| ParseNode::leaf(Rule::Loyalty, vec![t]));
    let item = choice((
        mana(Rule::Mana).then_ignore(item_end.clone().rewind()).boxed(),
        loyalty.boxed(),
        sentence(item_end, granted),
    ));
    item.separated_by(token(Token::Comma))
        .at_least(1)
        .map(|items| ParseNode::branch(Rule::Cost, items))
        .boxed()
}

/// Parse `AtomicEffect (. AtomicEffect)* .?`
fn effects(follow: P<()>, granted: P<ParseNode>) -> P<ParseNode> {
    let period = token(Token::Period);
    let atomic_follow = choice((period.clone().ignored(), follow.clone())).boxed();
    let atomic = atomic_effect(atomic_follow, granted);
    atomic
        .clone()
        .then(period.clone().ignore_then(atomic).repeated())
        .then_ignore(period.or_not())
        .then_ignore(follow.rewind())
        .map(|(first, rest)| {
            let mut atomics = vec![first];
            atomics.extend(rest);
            ParseNode::branch(Rule::Effects, atomics)
        })
        .boxed()
}

/// Parse `[if Sentence ,] [then] Sentence Duration? Condition?`, with at most
/// one of the two conditions.
fn atomic_effect(follow: P<()>, granted: P<ParseNode>) -> P<ParseNode> {
    let comma = token(Token::Comma).ignored().boxed();
    let leading = word("if")
        .ignore_then(sentence(comma.clone(), granted.clone()))
        .then_ignore(comma)
        .map(|s| ParseNode::branch(Rule::Condition(ConditionKind::If), vec![s]));

    let trailing = condition(follow.clone(), granted.clone());
    let after_duration = trailing
        .clone()
        .or_not()
        .ignored()
        .then(follow.clone())
        .ignored()
        .boxed();
    let duration = duration(after_duration.clone());
    let after_sentence = duration
        .clone()
        .or_not()
        .ignored()
        .then(after_duration)
        .ignored()
        .boxed();

    leading
        .or_not()
        .then_ignore(word("then").or_not())
        .then(sentence(after_sentence, granted))
        .then(duration.or_not())
        .then(trailing.or_not())
        .then_ignore(follow.rewind())
        .try_map(|(((leading, sentence), duration), trailing), span| {
            if leading.is_some() && trailing.is_some() {
                return Err(Simple::custom(span, "an effect takes at most one condition"));
            }
            let mut children: Vec<ParseNode> = leading.into_iter().collect();
            children.push(sentence);
            children.extend(duration);
            children.extend(trailing);
            Ok(ParseNode::branch(Rule::AtomicEffect, children))
        })
        .boxed()
}

/// Parse `(if|unless) Sentence`
fn condition(follow: P<()>, granted: P<ParseNode>) -> P<ParseNode> {
    choice((
        word("if").to(ConditionKind::If),
        word("unless").to(ConditionKind::Unless),
    ))
    .then(sentence(follow, granted))
    .map(|(kind, sentence)| ParseNode::branch(Rule::Condition(kind), vec![sentence]))
    .boxed()
}

/// Parse `until phrase | for as long as phrase | this turn`
fn duration(follow: P<()>) -> P<ParseNode> {
    let until = word("until")
        .ignore_then(lazy_phrase(follow.clone()))
        .map(|phrase| ParseNode::leaf(Rule::Duration(DurationKind::End), phrase));
    let as_long_as = words("for as long as")
        .ignore_then(lazy_phrase(follow.clone()))
        .map(|phrase| ParseNode::leaf(Rule::Duration(DurationKind::Span), phrase));
    let this_turn = words("this turn")
        .then_ignore(follow.rewind())
        .map(|phrase| ParseNode::leaf(Rule::Duration(DurationKind::Span), phrase));
    choice((until, as_long_as, this_turn)).boxed()
}

/// Parse `Subject? Verb DirectObject? IndirectObject?`
///
/// The subject grows one token at a time; at each position a verb is tried
/// first. Relative clauses (`you control`) are skipped as a unit so their verb
/// is not mistaken for the sentence's.
fn sentence(follow: P<()>, granted: P<ParseNode>) -> P<ParseNode> {
    let predicate: P<Predicate> = verb().then(objects(follow, granted)).boxed();
    let relative = relative_clause();
    recursive(
        move |me: Recursive<'static, TokenSpan, (Vec<TokenSpan>, Predicate), ParserError>| {
            choice((
                predicate.map(|p| (Vec::new(), p)).boxed(),
                relative
                    .then(me.clone())
                    .map(|(mut subject, (rest, p))| {
                        subject.extend(rest);
                        (subject, p)
                    })
                    .boxed(),
                phrase_token()
                    .then(me)
                    .map(|(first, (mut rest, p))| {
                        rest.insert(0, first);
                        (rest, p)
                    })
                    .boxed(),
            ))
        },
    )
    .map(|(subject, (verb, objects))| {
        let mut children = Vec::new();
        if !subject.is_empty() {
            children.push(ParseNode::leaf(Rule::Subject, subject));
        }
        children.push(verb);
        children.extend(objects);
        ParseNode::branch(Rule::Sentence, children)
    })
    .boxed()
}

/// A verb with an optional preceding modal: `draws`, `can't block`.
fn verb() -> P<ParseNode> {
    word_where(vocabulary::is_modal)
        .or_not()
        .then(word_where(vocabulary::is_verb))
        .map(|(modal, verb)| {
            let mut tokens: Vec<TokenSpan> = modal.into_iter().collect();
            tokens.push(verb);
            ParseNode::leaf(Rule::Verb, tokens)
        })
        .boxed()
}

/// `you control`, `an opponent doesn't own`, ...
fn relative_clause() -> P<Vec<TokenSpan>> {
    let subject = any_of(
        vocabulary::RELATIVE_SUBJECTS
            .iter()
            .map(|s| words(*s))
            .collect(),
    );
    let negation = choice((word("don't"), word("doesn't"))).or_not();
    let verb = word_where(|w| vocabulary::RELATIVE_VERBS.contains(&w));
    subject
        .then(negation)
        .then(verb)
        .map(|((mut tokens, negation), verb)| {
            tokens.extend(negation);
            tokens.push(verb);
            tokens
        })
        .boxed()
}

/// The objects after a verb, ending where `follow` matches.
fn objects(follow: P<()>, granted: P<ParseNode>) -> P<Vec<ParseNode>> {
    let at_end = follow.clone().rewind().boxed();
    let indirect = indirect_object(follow.clone());
    let after_direct = indirect
        .clone()
        .or_not()
        .ignored()
        .then(follow)
        .ignored()
        .boxed();

    let granted_object = phrase_token()
        .repeated()
        .then(granted)
        .map(|(phrase, ability)| ParseNode::new(Rule::DirectObject, phrase, vec![ability]));
    let phrase_object =
        lazy_phrase(after_direct).map(|phrase| ParseNode::leaf(Rule::DirectObject, phrase));
    let direct = choice((granted_object.boxed(), phrase_object.boxed()));

    choice((
        at_end.clone().to(Vec::new()).boxed(),
        indirect
            .clone()
            .then_ignore(at_end.clone())
            .map(|i| vec![i])
            .boxed(),
        direct
            .then(indirect.or_not())
            .then_ignore(at_end)
            .map(|(direct, indirect)| {
                let mut objects = vec![direct];
                objects.extend(indirect);
                objects
            })
            .boxed(),
    ))
    .boxed()
}

fn indirect_object(follow: P<()>) -> P<ParseNode> {
    word_where(vocabulary::is_preposition)
        .then(lazy_phrase(follow))
        .map(|(preposition, mut phrase)| {
            phrase.insert(0, preposition);
            ParseNode::leaf(Rule::IndirectObject, phrase)
        })
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::tokens::tokenize;
    use crate::grammar::EntryRule;

    fn outline(parser: P<ParseNode>, rule: EntryRule, text: &str) -> String {
        let tokens = tokenize(rule, text).unwrap();
        parser.parse(tokens).unwrap().outline()
    }

    #[test]
    fn test_relative_clause_stays_in_subject() {
        insta::assert_snapshot!(outline(rules_text(), EntryRule::RulesText, "creatures you control get +1/+1."), @r###"
        RulesText
          Ability
            Effects
              AtomicEffect
                Sentence
                  Subject "creatures you control"
                  Verb "get"
                  DirectObject "+1/+1"
        "###);
    }

    #[test]
    fn test_duration_and_condition() {
        insta::assert_snapshot!(outline(rules_text(), EntryRule::RulesText, "SELF gets +2/+2 until end of turn unless you pay {1}."), @r###"
        RulesText
          Ability
            Effects
              AtomicEffect
                Sentence
                  Subject "SELF"
                  Verb "gets"
                  DirectObject "+2/+2"
                Duration(End) "end of turn"
                Condition(Unless)
                  Sentence
                    Subject "you"
                    Verb "pay"
                    DirectObject "{1}"
        "###);
    }

    #[test]
    fn test_granted_ability() {
        insta::assert_snapshot!(outline(rules_text(), EntryRule::RulesText, "equipped creature has \"{t}: add {g}\"."), @r###"
        RulesText
          Ability
            Effects
              AtomicEffect
                Sentence
                  Subject "equipped creature"
                  Verb "has"
                  DirectObject
                    GrantedAbility
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
    fn test_phase_trigger() {
        insta::assert_snapshot!(outline(rules_text(), EntryRule::RulesText, "at the beginning of your upkeep, you lose 1 life."), @r###"
        RulesText
          Ability
            Trigger(Phase)
              Verb "beginning"
              Subject "your upkeep"
            Effects
              AtomicEffect
                Sentence
                  Subject "you"
                  Verb "lose"
                  DirectObject "1 life"
        "###);
    }

    #[test]
    fn test_type_line_requires_card_type() {
        let tokens = tokenize(EntryRule::TypeLine, "legendary — elf").unwrap();
        assert!(type_line().parse(tokens).is_err());
    }

    #[test]
    fn test_empty_mana_cost() {
        let node = mana_cost().parse(Vec::<TokenSpan>::new()).unwrap();
        assert_eq!(node.rule, Rule::ManaCost);
        assert!(node.children.is_empty());
    }
}
