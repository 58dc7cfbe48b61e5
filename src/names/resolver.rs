//! Name Resolver
//!
//! Replaces card names in one line of rules text with placeholders. Works in
//! three passes over the line:
//!
//!     1. Indicator phrases ("named", "create", "transforms into", ...) are
//!        located; the capitalized words after each are split into candidate
//!        names ([potential_names]) and the chosen split is replaced by
//!        canonical tokens. A quoted ability granted to a single named object is
//!        resolved recursively with that object as its own self.
//!     2. Quoted abilities granted to something else are told apart from
//!        abilities the card grants itself by the words preceding the quote.
//!     3. The card's own names become `SELF`, its creator's names `PARENT`.
//!
//! Nothing here fails: a phrase that cannot be interpreted is logged, recorded
//! as a [Diagnostic] and left as it was.

use super::candidates::{potential_names, Candidate};
use super::table::NameScope;
use crate::error::Diagnostic;
use crate::normalize::{PARENT_MARKER, SELF_MARKER};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Phrases that are followed by a card name.
static INDICATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?P<named>named )",
        r"|(?P<still>name is still )",
        r"|(?P<among>card name (?:that hasn't been chosen )?from among )",
        r"|(?P<transforms>transforms into )",
        r"|(?P<meld>meld them into )",
        r"|(?P<partner>Partner with )",
        r"|(?P<create>[Cc]reate )",
    ))
    .unwrap()
});

/// A quoted granted ability.
static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""[^"]+""#).unwrap());

/// Words marking a quoted ability as granted to another object.
const PARENT_WORDS: &[&str] = &["equipped", "enchanted", "fortified", "create", "each"];

/// The phrase category that introduced a name reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Named,
    NameIsStill,
    CardNameFromAmong,
    TransformsInto,
    MeldInto,
    PartnerWith,
    Create,
}

impl Indicator {
    fn from_captures(caps: &Captures) -> Option<Self> {
        const GROUPS: &[(&str, Indicator)] = &[
            ("named", Indicator::Named),
            ("still", Indicator::NameIsStill),
            ("among", Indicator::CardNameFromAmong),
            ("transforms", Indicator::TransformsInto),
            ("meld", Indicator::MeldInto),
            ("partner", Indicator::PartnerWith),
            ("create", Indicator::Create),
        ];
        GROUPS
            .iter()
            .find(|(group, _)| caps.name(group).is_some())
            .map(|(_, indicator)| *indicator)
    }

    /// Whether the phrase can introduce several names at once.
    pub fn allows_lists(self) -> bool {
        matches!(
            self,
            Indicator::Named | Indicator::CardNameFromAmong | Indicator::Create
        )
    }
}

/// Outcome of interpreting the text after one indicator phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one candidate is made of known names.
    Resolved(Candidate),
    /// Several candidates are made of known names; the first one is used.
    Ambiguous(Vec<Candidate>),
    /// No candidate is fully known. The fallback introduces new names.
    Unknown { fallback: Option<Candidate> },
}

impl Resolution {
    pub fn chosen(&self) -> Option<&Candidate> {
        match self {
            Resolution::Resolved(candidate) => Some(candidate),
            Resolution::Ambiguous(candidates) => candidates.first(),
            Resolution::Unknown { fallback } => fallback.as_ref(),
        }
    }
}

/// Interpret the text following one indicator phrase.
pub fn classify(
    indicator: Indicator,
    text: &str,
    self_names: &[String],
    scope: &dyn NameScope,
) -> Resolution {
    choose(indicator, potential_names(text, self_names), scope)
}

fn choose(indicator: Indicator, candidates: Vec<Candidate>, scope: &dyn NameScope) -> Resolution {
    let (good, bad): (Vec<Candidate>, Vec<Candidate>) = candidates
        .into_iter()
        .filter(|candidate| indicator.allows_lists() || candidate.len() == 1)
        .partition(|candidate| candidate.iter().all(|name| scope.contains(name)));
    match good.len() {
        0 => Resolution::Unknown {
            fallback: bad.into_iter().next(),
        },
        1 => Resolution::Resolved(good.into_iter().next().unwrap_or_default()),
        _ => Resolution::Ambiguous(good),
    }
}

/// Resolves names against a [NameScope], collecting diagnostics as it goes.
pub struct NameResolver<'s> {
    scope: &'s mut dyn NameScope,
    diagnostics: Vec<Diagnostic>,
    consulted: HashSet<String>,
}

impl<'s> NameResolver<'s> {
    pub fn new(scope: &'s mut dyn NameScope) -> Self {
        Self {
            scope,
            diagnostics: Vec::new(),
            consulted: HashSet::new(),
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Every name looked up in the scope so far. Resolving the same text
    /// against a scope that agrees on these names gives the same result.
    pub fn consulted(&self) -> &HashSet<String> {
        &self.consulted
    }

    pub fn into_parts(self) -> (Vec<Diagnostic>, HashSet<String>) {
        (self.diagnostics, self.consulted)
    }

    /// Replace every card name in `line` with its placeholder.
    pub fn resolve_names(
        &mut self,
        line: &str,
        self_names: &[String],
        parent_names: &[String],
    ) -> String {
        let mut line = self.resolve_indicated(line, self_names, parent_names);
        if parent_names.is_empty() {
            line = attribute_granted_abilities(&line, self_names);
        }
        let line = replace_names(&line, self_names, SELF_MARKER);
        let line = replace_names(&line, parent_names, PARENT_MARKER);
        if let Some(name) = self_names.first() {
            debug!(card = %name, %line, "resolved names");
        }
        line
    }

    fn resolve_indicated(
        &mut self,
        line: &str,
        self_names: &[String],
        parent_names: &[String],
    ) -> String {
        let mut line = line.to_string();
        let mut search_from = 0;
        while let Some(caps) = INDICATOR.captures_at(&line, search_from) {
            let Some(found) = caps.get(0) else { break };
            let (start, mut end) = (found.start(), found.end());
            let indicator = Indicator::from_captures(&caps);
            drop(caps);

            let rest = &line[end..];
            let names_follow = rest.chars().next().is_some_and(char::is_uppercase)
                && !rest.starts_with("X ");
            if let (Some(indicator), true) = (indicator, names_follow) {
                let candidates = potential_names(rest, self_names);
                self.consulted.extend(candidates.iter().flatten().cloned());
                let resolution = choose(indicator, candidates, &*self.scope);
                if let Resolution::Ambiguous(candidates) = &resolution {
                    warn!(position = end, ?candidates, "multiple name splits possible");
                    self.diagnostics.push(Diagnostic::Ambiguity {
                        position: end,
                        candidates: candidates.clone(),
                    });
                }
                let unknown: Vec<String> = match &resolution {
                    Resolution::Unknown {
                        fallback: Some(fallback),
                    } => fallback
                        .iter()
                        .filter(|name| !self.scope.contains(name))
                        .cloned()
                        .collect(),
                    _ => Vec::new(),
                };
                let substituted = resolution
                    .chosen()
                    .and_then(|names| self.substitute(rest, names).map(|text| (names, text)));
                match substituted {
                    Some((names, text)) => {
                        debug!(position = end, names = %names.join("; "), "selected name(s)");
                        if !unknown.is_empty() {
                            warn!(
                                position = end,
                                names = %unknown.join("; "),
                                "registered unknown name(s)"
                            );
                            self.diagnostics.push(Diagnostic::Discovered {
                                position: end,
                                names: unknown,
                            });
                        }
                        let granted_to = (names.len() == 1
                            && !line[..start].contains('"')
                            && parent_names.is_empty())
                        .then(|| names[0].clone());
                        line = format!("{}{}", &line[..end], text);
                        if let Some(name) = granted_to {
                            end = self.resolve_granted(&mut line, end, name, self_names);
                        }
                    }
                    None => {
                        let word = rest.split_whitespace().next().unwrap_or_default().to_string();
                        warn!(position = end, %word, "unable to interpret name(s)");
                        self.diagnostics.push(Diagnostic::UnknownReference {
                            position: end,
                            word,
                        });
                    }
                }
            }
            search_from = end;
        }
        line
    }

    /// Resolve the first quoted ability after `from` as granted to `name`.
    ///
    /// Returns the offset just past the rewritten quote.
    fn resolve_granted(
        &mut self,
        line: &mut String,
        from: usize,
        name: String,
        creator_names: &[String],
    ) -> usize {
        let Some(quote) = QUOTED.find(&line[from..]) else {
            return from;
        };
        let (quote_start, quote_end) = (from + quote.start(), from + quote.end());
        let inner = self.resolve_names(quote.as_str(), &[name], creator_names);
        line.replace_range(quote_start..quote_end, &inner);
        quote_start + inner.len()
    }

    /// Replace the leading `names` of `text` by their tokens.
    ///
    /// Keeps up to two trailing punctuation characters of the last replaced
    /// word and everything after it verbatim. Returns `None` when the names
    /// don't line up with the words of `text`.
    fn substitute(&mut self, text: &str, names: &[String]) -> Option<String> {
        let spans = word_spans(text);
        let (word_count, replacement) = match names {
            [] => return None,
            [name] => (name.split_whitespace().count(), self.token(name)),
            [leading @ .., last] => {
                let before_last: usize = leading
                    .iter()
                    .map(|name| name.split_whitespace().count())
                    .sum();
                let connector = spans.get(before_last).map(|&(s, e)| &text[s..e])?;
                let tokens: Vec<String> = leading.iter().map(|name| self.token(name)).collect();
                let last_token = self.token(last);
                let replacement = if tokens.len() == 1 {
                    format!("{} {} {}", tokens[0], connector, last_token)
                } else {
                    format!("{}, {} {}", tokens.join(", "), connector, last_token)
                };
                (before_last + last.split_whitespace().count() + 1, replacement)
            }
        };
        if word_count == 0 || word_count > spans.len() {
            return None;
        }
        let (last_start, last_end) = spans[word_count - 1];
        let mut out = replacement;
        out.push_str(trailing_punctuation(&text[last_start..last_end]));
        out.push_str(&text[last_end..]);
        Some(out)
    }

    fn token(&mut self, name: &str) -> String {
        self.scope.discover(name)
    }
}

/// Byte spans of the whitespace-separated words of `text`.
fn word_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;
    for (idx, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                spans.push((s, idx));
                start = None;
            }
            (false, None) => start = Some(idx),
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push((s, text.len()));
    }
    spans
}

/// The one or two punctuation characters ending `word` that a name doesn't own.
fn trailing_punctuation(word: &str) -> &str {
    let mut chars = word.char_indices().rev();
    let Some((last_idx, last)) = chars.next() else {
        return "";
    };
    if !",.:\"".contains(last) {
        return "";
    }
    match chars.next() {
        Some((idx, prev)) if ",.:".contains(prev) => &word[idx..],
        _ => &word[last_idx..],
    }
}

/// Decide who the quoted abilities of `line` are granted to and rewrite the
/// card's names inside them accordingly.
///
/// Scans the segments before the first quote from the nearest backwards: a
/// parent word ("equipped creature has ...") means the ability belongs to
/// another object, so the card's names inside it become `PARENT`; seeing
/// `SELF` first, or neither, means the card grants the ability to itself.
fn attribute_granted_abilities(line: &str, self_names: &[String]) -> String {
    let Some(first) = QUOTED.find(line) else {
        return line.to_string();
    };
    let preceding = replace_names(&line[..first.start()], self_names, SELF_MARKER);
    let granted_to_other = grants_to_other(&preceding);
    let marker = if granted_to_other {
        PARENT_MARKER
    } else {
        SELF_MARKER
    };
    QUOTED
        .replace_all(line, |caps: &Captures| replace_names(&caps[0], self_names, marker))
        .into_owned()
}

fn grants_to_other(preceding: &str) -> bool {
    let mut segments: Vec<&str> = preceding.split(", ").collect();
    if let Some(last) = segments.pop() {
        segments.extend(last.split(" and "));
    }
    for segment in segments.iter().rev() {
        for word in segment.split_whitespace() {
            if PARENT_WORDS.contains(&word.to_lowercase().as_str()) {
                return true;
            }
            if word.starts_with(SELF_MARKER) {
                return false;
            }
        }
    }
    false
}

/// Replace whole-word occurrences of each name, left to right, by `marker`.
fn replace_names(text: &str, names: &[String], marker: &str) -> String {
    let mut text = text.to_string();
    for name in names.iter().filter(|name| !name.is_empty()) {
        let mut out = String::with_capacity(text.len());
        let mut pos = 0;
        while let Some(offset) = text[pos..].find(name.as_str()) {
            let start = pos + offset;
            let end = start + name.len();
            if is_word_boundary(&text, start, end, name) {
                out.push_str(&text[pos..start]);
                out.push_str(marker);
            } else {
                out.push_str(&text[pos..end]);
            }
            pos = end;
        }
        out.push_str(&text[pos..]);
        text = out;
    }
    text
}

fn is_word_boundary(text: &str, start: usize, end: usize, name: &str) -> bool {
    let starts_with_word = name.chars().next().is_some_and(is_word_char);
    let before_ok =
        !starts_with_word || !text[..start].chars().next_back().is_some_and(is_word_char);
    let after_ok = !text[end..].chars().next().is_some_and(is_word_char);
    before_ok && after_ok
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
