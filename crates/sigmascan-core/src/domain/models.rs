use serde::{Deserialize, Serialize};

use crate::{QuantityKind, Symbol, TradingDate, ValidationError};

/// Single daily observation for one ticker.
///
/// Volume is carried as a float because every downstream computation
/// (z-scores, risk magnitudes) is float arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: TradingDate,
    pub adj_close: f64,
    pub volume: f64,
}

impl Observation {
    pub fn new(date: TradingDate, adj_close: f64, volume: f64) -> Result<Self, ValidationError> {
        validate_non_negative("adj_close", adj_close)?;
        validate_non_negative("volume", volume)?;
        Ok(Self {
            date,
            adj_close,
            volume,
        })
    }

    pub fn quantity(&self, kind: QuantityKind) -> f64 {
        match kind {
            QuantityKind::AdjClose => self.adj_close,
            QuantityKind::Volume => self.volume,
        }
    }
}

/// Date-ordered observation series for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerHistory {
    pub symbol: Symbol,
    pub observations: Vec<Observation>,
}

impl TickerHistory {
    /// Observations must be strictly increasing by date; gaps are fine.
    pub fn new(symbol: Symbol, observations: Vec<Observation>) -> Result<Self, ValidationError> {
        for pair in observations.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(ValidationError::UnorderedObservations {
                    date: pair[1].date.format_iso(),
                });
            }
        }
        Ok(Self {
            symbol,
            observations,
        })
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Raw multi-ticker response from a market data source.
///
/// Tickers appear in response order; that order is what downstream tables
/// preserve, not the order the caller requested. Tickers the provider does
/// not know are simply never added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketHistory {
    histories: Vec<TickerHistory>,
}

impl MarketHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a ticker's history. A symbol already present keeps its first
    /// entry; providers are expected to return each ticker once.
    pub fn push(&mut self, history: TickerHistory) {
        if self.get(&history.symbol).is_none() {
            self.histories.push(history);
        }
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&TickerHistory> {
        self.histories.iter().find(|h| &h.symbol == symbol)
    }

    pub fn histories(&self) -> &[TickerHistory] {
        &self.histories
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        self.histories.iter().map(|h| h.symbol.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.histories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
