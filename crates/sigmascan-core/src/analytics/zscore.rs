use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{QuantityKind, Symbol, TradingDate};

/// Derived z-score for one (ticker, date, quantity) cell. Never mutated
/// after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZScoreRecord {
    pub symbol: Symbol,
    pub date: TradingDate,
    pub kind: QuantityKind,
    pub z_score: f64,
}

/// Whole-sample z-scores over a date-indexed series, population standard
/// deviation (ddof = 0). Statistics are taken over the entire selected
/// window, not a rolling one.
///
/// A constant or empty series has no defined z-scores and yields an empty
/// result, which downstream stages read as "no anomalies".
pub(crate) fn whole_sample_zscores(
    points: &BTreeMap<TradingDate, f64>,
) -> Vec<(TradingDate, f64, f64)> {
    let Some(mean) = mean(points.values()) else {
        return Vec::new();
    };
    let std_dev = population_std_dev(points.values(), mean);
    if std_dev == 0.0 {
        return Vec::new();
    }

    points
        .iter()
        .map(|(&date, &value)| (date, value, (value - mean) / std_dev))
        .collect()
}

fn mean<'a>(values: impl ExactSizeIterator<Item = &'a f64>) -> Option<f64> {
    let n = values.len();
    if n == 0 {
        return None;
    }
    Some(values.sum::<f64>() / n as f64)
}

fn population_std_dev<'a>(values: impl ExactSizeIterator<Item = &'a f64>, mean: f64) -> f64 {
    let n = values.len() as f64;
    let sq_diff: f64 = values.map(|value| (value - mean).powi(2)).sum();
    (sq_diff / n).sqrt()
}
