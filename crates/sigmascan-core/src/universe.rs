use serde::{Deserialize, Serialize};

use crate::Symbol;

/// Per-session list of known tickers.
///
/// Append-only and duplicate-free, in insertion order. Each request carries
/// its own universe value; there is no process-wide shared list, so adding a
/// symbol in one session never leaks into another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolUniverse {
    symbols: Vec<Symbol>,
}

impl SymbolUniverse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a symbol; returns false when it was already known.
    pub fn add(&mut self, symbol: Symbol) -> bool {
        if self.contains(&symbol) {
            return false;
        }
        self.symbols.push(symbol);
        true
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn as_slice(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn to_vec(&self) -> Vec<Symbol> {
        self.symbols.clone()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl FromIterator<Symbol> for SymbolUniverse {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        let mut universe = Self::new();
        for symbol in iter {
            universe.add(symbol);
        }
        universe
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_append_only_and_duplicate_free() {
        let mut universe = SymbolUniverse::new();
        assert!(universe.add(Symbol::parse("GOOGL").expect("valid")));
        assert!(universe.add(Symbol::parse("MSFT").expect("valid")));
        assert!(!universe.add(Symbol::parse("googl").expect("valid")));

        let names: Vec<&str> = universe.as_slice().iter().map(Symbol::as_str).collect();
        assert_eq!(names, vec!["GOOGL", "MSFT"]);
    }

    #[test]
    fn collects_from_iterator_with_dedup() {
        let universe: SymbolUniverse = ["TSLA", "TSM", "TSLA"]
            .iter()
            .map(|s| Symbol::parse(s).expect("valid"))
            .collect();
        assert_eq!(universe.len(), 2);
    }
}
