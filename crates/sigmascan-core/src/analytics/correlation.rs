use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::analytics::detector::Detection;
use crate::{QuantityKind, Symbol, TradingDate};

/// Composite axis key: one binary anomaly-indicator column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnKey {
    pub kind: QuantityKind,
    pub symbol: Symbol,
}

impl ColumnKey {
    /// Presentation label, e.g. `"Volume Anomaly NVDA"`.
    pub fn label(&self) -> String {
        format!("{} {}", self.kind.axis_label(), self.symbol)
    }
}

/// Pairwise Pearson correlation of binary anomaly indicators across all
/// (quantity kind, ticker) columns.
///
/// A ticker with zero anomalies of a given kind has no column of that kind:
/// it is absent from the matrix, not zero-filled. Cells whose correlation is
/// undefined (a zero-variance column) are `None`; the display layer owns the
/// fill-with-zero choice, and no `None` ever reaches a numeric aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    keys: Vec<ColumnKey>,
    cells: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn keys(&self) -> &[ColumnKey] {
        &self.keys
    }

    pub fn labels(&self) -> Vec<String> {
        self.keys.iter().map(ColumnKey::label).collect()
    }

    pub fn size(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<f64> {
        self.cells
            .get(row)
            .and_then(|cells| cells.get(column))
            .copied()
            .flatten()
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.cells
    }

    /// Positions of the columns carrying the given quantity kind.
    pub fn indices_of_kind(&self, kind: QuantityKind) -> Vec<usize> {
        self.keys
            .iter()
            .enumerate()
            .filter(|(_, key)| key.kind == kind)
            .map(|(index, _)| index)
            .collect()
    }
}

/// Builds the anomaly co-occurrence matrix from both detections.
///
/// The indicator table has one row per date in the union of all anomaly
/// dates (either kind, any ticker) and an explicit 0/1 in every cell: a
/// ticker that was anomalous somewhere else that day holds a genuine zero.
pub fn correlate(adj_close: &Detection, volume: &Detection) -> CorrelationMatrix {
    let mut dates: BTreeSet<TradingDate> = adj_close.anomaly_dates();
    dates.extend(volume.anomaly_dates());

    let mut keys = Vec::new();
    let mut indicators: Vec<Vec<f64>> = Vec::new();
    for detection in [adj_close, volume] {
        for series in &detection.anomalies {
            keys.push(ColumnKey {
                kind: detection.kind,
                symbol: series.symbol.clone(),
            });
            indicators.push(
                dates
                    .iter()
                    .map(|date| if series.flagged.contains_key(date) { 1.0 } else { 0.0 })
                    .collect(),
            );
        }
    }

    let n = keys.len();
    let mut cells = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let value = pearson(&indicators[i], &indicators[j]);
            cells[i][j] = value;
            cells[j][i] = value;
        }
    }

    tracing::debug!(columns = n, dates = dates.len(), "correlation matrix built");

    CorrelationMatrix { keys, cells }
}

/// Pearson correlation of two equal-length columns; `None` when either has
/// zero variance.
fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    let n = a.len() as f64;
    if a.is_empty() {
        return None;
    }

    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance_a = 0.0;
    let mut variance_b = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        covariance += dx * dy;
        variance_a += dx * dx;
        variance_b += dy * dy;
    }

    if variance_a == 0.0 || variance_b == 0.0 {
        return None;
    }
    Some(covariance / (variance_a.sqrt() * variance_b.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::detector::AnomalySeries;
    use std::collections::BTreeMap;

    fn date(input: &str) -> TradingDate {
        TradingDate::parse(input).expect("valid date")
    }

    fn series(symbol: &str, dates: &[&str]) -> AnomalySeries {
        let flagged: BTreeMap<TradingDate, f64> =
            dates.iter().map(|d| (date(d), 1.0)).collect();
        AnomalySeries {
            symbol: Symbol::parse(symbol).expect("valid"),
            flagged,
        }
    }

    fn detection(kind: QuantityKind, anomalies: Vec<AnomalySeries>) -> Detection {
        Detection {
            kind,
            anomalies,
            records: Vec::new(),
        }
    }

    #[test]
    fn perfectly_cooccurring_tickers_correlate_at_one() {
        let adj = detection(
            QuantityKind::AdjClose,
            vec![
                series("AAA", &["2024-01-02", "2024-01-09"]),
                series("BBB", &["2024-01-02", "2024-01-09"]),
            ],
        );
        let vol = detection(QuantityKind::Volume, vec![series("AAA", &["2024-01-03"])]);

        let matrix = correlate(&adj, &vol);
        assert_eq!(matrix.size(), 3);
        let aaa_bbb = matrix.cell(0, 1).expect("defined");
        assert!((aaa_bbb - 1.0).abs() < 1e-12);
    }

    #[test]
    fn disjoint_anomaly_days_correlate_negatively() {
        let adj = detection(
            QuantityKind::AdjClose,
            vec![
                series("AAA", &["2024-01-02"]),
                series("BBB", &["2024-01-09"]),
            ],
        );
        let vol = detection(QuantityKind::Volume, Vec::new());

        let matrix = correlate(&adj, &vol);
        let value = matrix.cell(0, 1).expect("defined");
        assert!(value < 0.0);
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let adj = detection(
            QuantityKind::AdjClose,
            vec![
                series("AAA", &["2024-01-02", "2024-01-04"]),
                series("BBB", &["2024-01-02"]),
            ],
        );
        let vol = detection(
            QuantityKind::Volume,
            vec![series("BBB", &["2024-01-04", "2024-01-05"])],
        );

        let matrix = correlate(&adj, &vol);
        for i in 0..matrix.size() {
            let diagonal = matrix.cell(i, i).expect("defined");
            assert!((diagonal - 1.0).abs() < 1e-12);
            for j in 0..matrix.size() {
                assert_eq!(matrix.cell(i, j), matrix.cell(j, i));
            }
        }
    }

    #[test]
    fn zero_variance_column_yields_undefined_cells() {
        // AAA anomalous on every union date: indicator column is constant.
        let adj = detection(
            QuantityKind::AdjClose,
            vec![
                series("AAA", &["2024-01-02", "2024-01-03"]),
                series("BBB", &["2024-01-02"]),
            ],
        );
        let vol = detection(QuantityKind::Volume, Vec::new());

        let matrix = correlate(&adj, &vol);
        assert_eq!(matrix.cell(0, 0), None, "constant column, even on the diagonal");
        assert_eq!(matrix.cell(0, 1), None);
        assert!(matrix.cell(1, 1).is_some());
    }

    #[test]
    fn ticker_without_anomalies_has_no_column() {
        let adj = detection(QuantityKind::AdjClose, vec![series("AAA", &["2024-01-02"])]);
        let vol = detection(QuantityKind::Volume, Vec::new());

        let matrix = correlate(&adj, &vol);
        assert_eq!(matrix.size(), 1);
        assert_eq!(matrix.labels(), vec!["Adj Close Anomaly AAA"]);
    }

    #[test]
    fn labels_join_kind_and_symbol_with_single_space() {
        let adj = detection(QuantityKind::AdjClose, vec![series("NVDA", &["2024-01-02"])]);
        let vol = detection(
            QuantityKind::Volume,
            vec![series("NVDA", &["2024-01-03"])],
        );

        let matrix = correlate(&adj, &vol);
        assert_eq!(
            matrix.labels(),
            vec!["Adj Close Anomaly NVDA", "Volume Anomaly NVDA"]
        );
    }

    #[test]
    fn empty_detections_build_an_empty_matrix() {
        let adj = detection(QuantityKind::AdjClose, Vec::new());
        let vol = detection(QuantityKind::Volume, Vec::new());
        assert!(correlate(&adj, &vol).is_empty());
    }
}
