//! Name Table
//!
//! A bijection between card names and canonical tokens. The table is owned by
//! whoever drives a catalog load and is passed explicitly to every resolver;
//! [NameTable::clear] resets it between independent loads.

use crate::normalize::NAME_MARKER;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W").unwrap());
static NAME_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"NAME_\w+").unwrap());

/// `NAME_` followed by the name with every non-word character replaced by `_`.
pub fn canonical_token(name: &str) -> String {
    format!("{}{}", NAME_MARKER, NON_WORD.replace_all(name, "_"))
}

/// Look up and discover names during resolution.
pub trait NameScope {
    fn contains(&self, name: &str) -> bool;

    fn token_for(&self, name: &str) -> Option<&str>;

    /// Return the token for `name`, registering the name first if it is new.
    fn discover(&mut self, name: &str) -> String;
}

#[derive(Debug, Clone, Default)]
pub struct NameTable {
    tokens: BTreeMap<String, String>,
    names: HashMap<String, String>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` and return its token. Adding a known name is a no-op.
    ///
    /// Two names deriving the same token ("Foo-Bar", "Foo Bar") would break the
    /// bijection, so the later one gets `_` appended until its token is free.
    pub fn add(&mut self, name: &str) -> String {
        if let Some(token) = self.tokens.get(name) {
            return token.clone();
        }
        let token = free_token(name, |candidate| self.names.get(candidate));
        self.tokens.insert(name.to_string(), token.clone());
        self.names.insert(token.clone(), name.to_string());
        token
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tokens.contains_key(name)
    }

    pub fn token_for(&self, name: &str) -> Option<&str> {
        self.tokens.get(name).map(String::as_str)
    }

    pub fn name_for(&self, token: &str) -> Option<&str> {
        self.names.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
        self.names.clear();
    }

    /// `(name, token)` pairs ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tokens
            .iter()
            .map(|(name, token)| (name.as_str(), token.as_str()))
    }

    /// Replace every known token in `text` with the name it stands for.
    pub fn restore(&self, text: &str) -> String {
        NAME_TOKEN
            .replace_all(text, |caps: &Captures| {
                let token = &caps[0];
                self.name_for(token).unwrap_or(token).to_string()
            })
            .into_owned()
    }

    /// Fold names discovered under a [DeferredNames] overlay into the table.
    ///
    /// Returns the names whose final token differs from the one the overlay
    /// handed out; text resolved with those tokens must be resolved again.
    pub fn merge(&mut self, discoveries: Discoveries) -> Vec<String> {
        let mut changed = Vec::new();
        for (name, provisional) in discoveries.0 {
            if self.add(&name) != provisional {
                changed.push(name);
            }
        }
        changed
    }

    /// Whether [NameTable::merge] would keep every provisional token of
    /// `discoveries`.
    pub fn accepts(&self, discoveries: &Discoveries) -> bool {
        let mut added: HashMap<String, String> = HashMap::new();
        discoveries.0.iter().all(|(name, provisional)| {
            let token = match self.token_for(name) {
                Some(token) => token.to_string(),
                None => {
                    let token = free_token(name, |candidate| {
                        self.names.get(candidate).or_else(|| added.get(candidate))
                    });
                    added.insert(token.clone(), name.clone());
                    token
                }
            };
            token == *provisional
        })
    }
}

impl NameScope for NameTable {
    fn contains(&self, name: &str) -> bool {
        NameTable::contains(self, name)
    }

    fn token_for(&self, name: &str) -> Option<&str> {
        NameTable::token_for(self, name)
    }

    fn discover(&mut self, name: &str) -> String {
        self.add(name)
    }
}

/// Names first seen under a [DeferredNames] overlay, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discoveries(Vec<(String, String)>);

impl Discoveries {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }
}

/// A read-only view of a [NameTable] plus a private overlay for new names.
///
/// Used while cards are resolved in parallel: the shared table is never
/// written, and each worker's discoveries are merged back afterwards.
#[derive(Debug)]
pub struct DeferredNames<'a> {
    base: &'a NameTable,
    tokens: HashMap<String, String>,
    names: HashMap<String, String>,
    order: Vec<String>,
}

impl<'a> DeferredNames<'a> {
    pub fn new(base: &'a NameTable) -> Self {
        Self {
            base,
            tokens: HashMap::new(),
            names: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn into_discoveries(self) -> Discoveries {
        let DeferredNames {
            mut tokens, order, ..
        } = self;
        Discoveries(
            order
                .into_iter()
                .filter_map(|name| tokens.remove(&name).map(|token| (name, token)))
                .collect(),
        )
    }
}

impl NameScope for DeferredNames<'_> {
    fn contains(&self, name: &str) -> bool {
        self.base.contains(name) || self.tokens.contains_key(name)
    }

    fn token_for(&self, name: &str) -> Option<&str> {
        self.base
            .token_for(name)
            .or_else(|| self.tokens.get(name).map(String::as_str))
    }

    fn discover(&mut self, name: &str) -> String {
        if let Some(token) = self.token_for(name) {
            return token.to_string();
        }
        let base = self.base;
        let local = &self.names;
        let token = free_token(name, |candidate| {
            base.names.get(candidate).or_else(|| local.get(candidate))
        });
        self.tokens.insert(name.to_string(), token.clone());
        self.names.insert(token.clone(), name.to_string());
        self.order.push(name.to_string());
        token
    }
}

/// Derive the canonical token for `name`, suffixed until `owner_of` finds no owner.
fn free_token<'m>(name: &str, owner_of: impl Fn(&str) -> Option<&'m String>) -> String {
    let mut token = canonical_token(name);
    if let Some(owner) = owner_of(&token) {
        let owner = owner.clone();
        while owner_of(&token).is_some() {
            token.push('_');
        }
        warn!(name, other = %owner, token = %token, "name token collision");
    }
    token
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_tokens_from_names() {
        assert_eq!(canonical_token("Abc Equipment"), "NAME_Abc_Equipment");
        assert_eq!(canonical_token("Drizzt Do'Urden"), "NAME_Drizzt_Do_Urden");
        assert_eq!(canonical_token("Lim-Dûl's Vault"), "NAME_Lim_Dûl_s_Vault");
    }

    #[test]
    fn add_is_idempotent() {
        let mut table = NameTable::new();
        let first = table.add("Grizzly Bears");
        let second = table.add("Grizzly Bears");
        assert_eq!(first, second);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn colliding_names_get_distinct_tokens() {
        let mut table = NameTable::new();
        let dashed = table.add("Foo-Bar");
        let spaced = table.add("Foo Bar");
        assert_eq!(dashed, "NAME_Foo_Bar");
        assert_eq!(spaced, "NAME_Foo_Bar_");
        assert_eq!(table.name_for(&spaced), Some("Foo Bar"));
        assert_eq!(table.name_for(&dashed), Some("Foo-Bar"));
    }

    #[test]
    fn restore_inverts_substitution() {
        let mut table = NameTable::new();
        table.add("Grizzly Bears");
        table.add("Llanowar Elves");
        let text = "search for NAME_Grizzly_Bears and NAME_Llanowar_Elves, then SELF.";
        assert_eq!(
            table.restore(text),
            "search for Grizzly Bears and Llanowar Elves, then SELF."
        );
        assert_eq!(table.restore("NAME_Unknown stays"), "NAME_Unknown stays");
    }

    #[test]
    fn clear_resets_between_loads() {
        let mut table = NameTable::new();
        table.add("Shock");
        table.clear();
        assert!(table.is_empty());
        assert!(!table.contains("Shock"));
    }

    #[test]
    fn deferred_names_never_write_the_base() {
        let mut table = NameTable::new();
        table.add("Shock");
        let discoveries = {
            let mut deferred = DeferredNames::new(&table);
            assert_eq!(deferred.discover("Shock"), "NAME_Shock");
            assert_eq!(deferred.discover("Goblin Token"), "NAME_Goblin_Token");
            assert!(deferred.contains("Goblin Token"));
            deferred.into_discoveries()
        };
        assert!(!table.contains("Goblin Token"));
        assert_eq!(discoveries.names().collect::<Vec<_>>(), vec!["Goblin Token"]);
        assert!(table.merge(discoveries).is_empty());
        assert_eq!(table.token_for("Goblin Token"), Some("NAME_Goblin_Token"));
    }

    #[test]
    fn accepts_only_unchanged_tokens() {
        let mut table = NameTable::new();
        let first = {
            let mut deferred = DeferredNames::new(&table);
            deferred.discover("Foo Bar");
            deferred.into_discoveries()
        };
        assert!(table.accepts(&first));
        table.add("Foo-Bar");
        assert!(!table.accepts(&first));
    }

    #[test]
    fn merge_reports_tokens_that_moved() {
        let mut table = NameTable::new();
        let first = {
            let mut deferred = DeferredNames::new(&table);
            deferred.discover("Foo Bar");
            deferred.into_discoveries()
        };
        let second = {
            let mut deferred = DeferredNames::new(&table);
            deferred.discover("Foo-Bar");
            deferred.into_discoveries()
        };
        assert!(table.merge(first).is_empty());
        assert_eq!(table.merge(second), vec!["Foo-Bar".to_string()]);
        assert_eq!(table.token_for("Foo-Bar"), Some("NAME_Foo_Bar_"));
    }
}
