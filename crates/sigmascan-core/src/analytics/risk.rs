use serde::{Deserialize, Serialize};

use crate::analytics::detector::Detection;
use crate::Symbol;

/// Per-ticker anomaly-magnitude summary, relative to the current selection.
///
/// All numeric fields are `Option`: `None` means undefined (no anomalies to
/// average, or a degenerate normalization), never zero. Filling with zero is
/// the presentation layer's documented choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    pub symbol: Symbol,
    pub adj_close_risk: Option<f64>,
    pub volume_risk: Option<f64>,
    pub total_risk: Option<f64>,
    /// Min-max normalized `total_risk` within the selection, in [0, 1].
    pub rating: Option<f64>,
}

/// Reduces flagged z-scores to one risk score per ticker.
///
/// Per ticker and kind the contribution is the mean of |z| over that
/// ticker's flagged records only. A ticker with no anomalies in one kind has
/// an undefined total (both contributions are required); the per-kind
/// components stay available for partial display.
///
/// The rating normalizes totals across tickers that have one. When every
/// defined total is identical (single ticker included) the rating is 0.0 for
/// those tickers rather than a divide-by-zero artifact.
pub fn aggregate(symbols: &[Symbol], adj_close: &Detection, volume: &Detection) -> Vec<RiskScore> {
    let mut scores: Vec<RiskScore> = symbols
        .iter()
        .map(|symbol| {
            let adj_close_risk = mean_abs_z(adj_close, symbol);
            let volume_risk = mean_abs_z(volume, symbol);
            let total_risk = match (adj_close_risk, volume_risk) {
                (Some(price), Some(vol)) => Some(price + vol),
                _ => None,
            };
            RiskScore {
                symbol: symbol.clone(),
                adj_close_risk,
                volume_risk,
                total_risk,
                rating: None,
            }
        })
        .collect();

    let defined: Vec<f64> = scores.iter().filter_map(|score| score.total_risk).collect();
    if let (Some(min), Some(max)) = (
        defined.iter().copied().reduce(f64::min),
        defined.iter().copied().reduce(f64::max),
    ) {
        let span = max - min;
        for score in &mut scores {
            score.rating = score.total_risk.map(|total| {
                if span == 0.0 {
                    0.0
                } else {
                    (total - min) / span
                }
            });
        }
    }

    scores
}

fn mean_abs_z(detection: &Detection, symbol: &Symbol) -> Option<f64> {
    let magnitudes: Vec<f64> = detection
        .records
        .iter()
        .filter(|record| &record.symbol == symbol)
        .map(|record| record.z_score.abs())
        .collect();
    if magnitudes.is_empty() {
        return None;
    }
    Some(magnitudes.iter().sum::<f64>() / magnitudes.len() as f64)
}
