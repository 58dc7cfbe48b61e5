//! Mana symbols and costs

use crate::error::MalformedManaSymbol;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One mana-cost pip, optionally paired with a hybrid partner (`{R/P}`, `{2/W}`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManaSymbol {
    pub symbol: String,
    pub hybrid_symbol: Option<String>,
}

impl ManaSymbol {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            hybrid_symbol: None,
        }
    }

    pub fn hybrid(symbol: impl Into<String>, hybrid_symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            hybrid_symbol: Some(hybrid_symbol.into()),
        }
    }

    pub fn is_hybrid(&self) -> bool {
        self.hybrid_symbol.is_some()
    }
}

impl FromStr for ManaSymbol {
    type Err = MalformedManaSymbol;

    /// Accepts the symbol with or without its surrounding braces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .unwrap_or(s);
        let parts: Vec<&str> = inner.split('/').collect();
        match parts.as_slice() {
            [symbol] => Ok(ManaSymbol::new(*symbol)),
            [symbol, hybrid] => Ok(ManaSymbol::hybrid(*symbol, *hybrid)),
            _ => Err(MalformedManaSymbol {
                symbol: inner.to_string(),
            }),
        }
    }
}

impl fmt::Display for ManaSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.hybrid_symbol {
            Some(hybrid) => write!(f, "{{{}/{}}}", self.symbol, hybrid),
            None => write!(f, "{{{}}}", self.symbol),
        }
    }
}

/// An ordered mana cost. Order is the printed left-to-right order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mana(pub Vec<ManaSymbol>);

impl Mana {
    pub fn symbols(&self) -> &[ManaSymbol] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<ManaSymbol>> for Mana {
    fn from(symbols: Vec<ManaSymbol>) -> Self {
        Mana(symbols)
    }
}

impl FromIterator<ManaSymbol> for Mana {
    fn from_iter<T: IntoIterator<Item = ManaSymbol>>(iter: T) -> Self {
        Mana(iter.into_iter().collect())
    }
}

impl fmt::Display for Mana {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.0 {
            write!(f, "{}", symbol)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_hybrid_symbols() {
        assert_eq!("2".parse::<ManaSymbol>(), Ok(ManaSymbol::new("2")));
        assert_eq!("{R/P}".parse::<ManaSymbol>(), Ok(ManaSymbol::hybrid("R", "P")));
    }

    #[test]
    fn rejects_three_part_symbols() {
        let err = "{R/P/W}".parse::<ManaSymbol>().unwrap_err();
        assert_eq!(err.symbol, "R/P/W");
    }

    #[test]
    fn displays_in_cost_order() {
        let mana = Mana(vec![ManaSymbol::new("2"), ManaSymbol::hybrid("R", "P")]);
        assert_eq!(mana.to_string(), "{2}{R/P}");
    }
}
