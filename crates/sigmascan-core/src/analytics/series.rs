use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{MarketHistory, QuantityKind, Symbol, TradingDate};

/// One ticker's date-indexed values for a single quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSeries {
    pub symbol: Symbol,
    pub points: BTreeMap<TradingDate, f64>,
}

/// Aligned per-ticker series for one measured quantity.
///
/// Columns keep the raw response's first-appearance order. Tickers absent
/// from the response never appear; dates a ticker has no observation for are
/// absent keys, never zeros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityTable {
    kind: QuantityKind,
    columns: Vec<TickerSeries>,
}

impl QuantityTable {
    /// Projects one quantity out of the raw multi-ticker response.
    pub fn from_history(market: &MarketHistory, kind: QuantityKind) -> Self {
        let columns = market
            .histories()
            .iter()
            .map(|history| TickerSeries {
                symbol: history.symbol.clone(),
                points: history
                    .observations
                    .iter()
                    .map(|observation| (observation.date, observation.quantity(kind)))
                    .collect(),
            })
            .collect();
        Self { kind, columns }
    }

    pub fn kind(&self) -> QuantityKind {
        self.kind
    }

    pub fn columns(&self) -> &[TickerSeries] {
        &self.columns
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        self.columns.iter().map(|c| c.symbol.clone()).collect()
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&TickerSeries> {
        self.columns.iter().find(|c| &c.symbol == symbol)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
