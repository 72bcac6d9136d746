use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::analytics::series::QuantityTable;
use crate::analytics::zscore::{whole_sample_zscores, ZScoreRecord};
use crate::pipeline::Sensitivity;
use crate::{QuantityKind, Symbol, TradingDate};

/// Flagged dates for one ticker, mapped to the observed value on that date
/// (the value, not the z-score, so overlays can sit on the raw series).
/// Dates that are not anomalous are genuinely absent keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalySeries {
    pub symbol: Symbol,
    pub flagged: BTreeMap<TradingDate, f64>,
}

/// Detector output for one quantity kind.
///
/// `anomalies` holds only tickers with at least one flagged date, in table
/// column order. `records` holds the z-scores of exactly the flagged cells;
/// the risk aggregator averages over these and nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub kind: QuantityKind,
    pub anomalies: Vec<AnomalySeries>,
    pub records: Vec<ZScoreRecord>,
}

impl Detection {
    pub fn series(&self, symbol: &Symbol) -> Option<&AnomalySeries> {
        self.anomalies.iter().find(|series| &series.symbol == symbol)
    }

    /// Union of flagged dates across all tickers.
    pub fn anomaly_dates(&self) -> BTreeSet<TradingDate> {
        self.anomalies
            .iter()
            .flat_map(|series| series.flagged.keys().copied())
            .collect()
    }

    pub fn flagged_symbols(&self) -> Vec<Symbol> {
        self.anomalies.iter().map(|s| s.symbol.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.anomalies.is_empty()
    }
}

/// Flags every (ticker, date) whose whole-sample z-score magnitude exceeds
/// the sensitivity threshold, each ticker independently.
///
/// A ticker with constant values has no defined z-scores; it contributes no
/// records and no anomalies rather than an error.
pub fn detect(table: &QuantityTable, sensitivity: Sensitivity) -> Detection {
    let kind = table.kind();
    let threshold = sensitivity.value();

    let mut anomalies = Vec::new();
    let mut records = Vec::new();
    for column in table.columns() {
        let mut flagged = BTreeMap::new();
        for (date, value, z_score) in whole_sample_zscores(&column.points) {
            if z_score.abs() > threshold {
                flagged.insert(date, value);
                records.push(ZScoreRecord {
                    symbol: column.symbol.clone(),
                    date,
                    kind,
                    z_score,
                });
            }
        }
        if !flagged.is_empty() {
            anomalies.push(AnomalySeries {
                symbol: column.symbol.clone(),
                flagged,
            });
        }
    }

    tracing::debug!(
        kind = %kind,
        tickers = table.len(),
        flagged = records.len(),
        threshold,
        "anomaly detection pass complete"
    );

    Detection {
        kind,
        anomalies,
        records,
    }
}
