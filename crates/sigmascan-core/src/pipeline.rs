use std::fmt::{Display, Formatter};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analytics::{
    aggregate, correlate, detect, CorrelationMatrix, Detection, QuantityTable, RiskScore,
};
use crate::data_source::{HistoryRequest, MarketDataSource, SourceError};
use crate::{DateRange, ProviderId, QuantityKind, Symbol, SymbolUniverse, ValidationError};

/// Z-score magnitude threshold above which a data point is an anomaly.
///
/// Matches the dashboard slider: 1.0 to 2.5 in quarter steps, default 2.0.
/// Only the bounds are enforced here; snapping to the step grid is a control
/// affordance, not a pipeline rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Sensitivity(f64);

impl Sensitivity {
    pub const MIN: f64 = 1.0;
    pub const MAX: f64 = 2.5;
    pub const STEP: f64 = 0.25;

    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ValidationError::SensitivityOutOfRange {
                value,
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        Ok(Self(value))
    }

    pub const fn value(self) -> f64 {
        self.0
    }
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self(2.0)
    }
}

impl Display for Sensitivity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f64> for Sensitivity {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Sensitivity> for f64 {
    fn from(value: Sensitivity) -> Self {
        value.value()
    }
}

/// Parameters for one full recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub selection: SymbolUniverse,
    pub range: DateRange,
    pub sensitivity: Sensitivity,
}

impl AnalysisRequest {
    pub fn new(
        selection: SymbolUniverse,
        range: DateRange,
        sensitivity: Sensitivity,
    ) -> Result<Self, ValidationError> {
        if selection.is_empty() {
            return Err(ValidationError::EmptySelection);
        }
        Ok(Self {
            selection,
            range,
            sensitivity,
        })
    }
}

/// Normalized series plus detector output for one quantity kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityReport {
    pub series: QuantityTable,
    pub detection: Detection,
}

/// Everything one recomputation produces for the presentation layer.
///
/// Request-scoped value object: built fresh per call, discarded after the
/// caller consumes it. Undefined numeric cells are `None` throughout; the
/// display fill policy lives in [`crate::present`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub range: DateRange,
    pub sensitivity: Sensitivity,
    pub adj_close: QuantityReport,
    pub volume: QuantityReport,
    pub correlation: CorrelationMatrix,
    pub risk: Vec<RiskScore>,
}

impl AnalysisReport {
    /// Tickers that made it into the response, in response order.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.adj_close.series.symbols()
    }
}

/// Pipeline-level failure.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The market data source could not serve the request; the recomputation
    /// is abandoned rather than rendered from a partial table.
    #[error("market data source unavailable: {0}")]
    DataSourceUnavailable(#[from] SourceError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// The full recomputation: fetch, normalize, detect, correlate, aggregate.
///
/// Single-threaded and synchronous apart from the fetch await; every call
/// recomputes from scratch, so identical inputs against identical upstream
/// data give identical reports.
pub struct Pipeline {
    source: Arc<dyn MarketDataSource>,
}

impl Pipeline {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }

    pub fn source_id(&self) -> ProviderId {
        self.source.id()
    }

    pub async fn run(&self, request: &AnalysisRequest) -> Result<AnalysisReport, PipelineError> {
        tracing::info!(
            source = %self.source.id(),
            symbols = request.selection.len(),
            start = %request.range.start(),
            end = %request.range.end(),
            sensitivity = %request.sensitivity,
            "running anomaly pipeline"
        );

        let history_request = HistoryRequest::new(request.selection.to_vec(), request.range)?;
        let market = self.source.daily_history(&history_request).await?;
        if market.len() < request.selection.len() {
            tracing::debug!(
                requested = request.selection.len(),
                served = market.len(),
                "provider omitted symbols; rendering fewer series"
            );
        }

        let adj_close_series = QuantityTable::from_history(&market, QuantityKind::AdjClose);
        let volume_series = QuantityTable::from_history(&market, QuantityKind::Volume);

        let adj_close_detection = detect(&adj_close_series, request.sensitivity);
        let volume_detection = detect(&volume_series, request.sensitivity);

        let correlation = correlate(&adj_close_detection, &volume_detection);
        let risk = aggregate(
            &market.symbols(),
            &adj_close_detection,
            &volume_detection,
        );

        Ok(AnalysisReport {
            range: request.range,
            sensitivity: request.sensitivity,
            adj_close: QuantityReport {
                series: adj_close_series,
                detection: adj_close_detection,
            },
            volume: QuantityReport {
                series: volume_series,
                detection: volume_detection,
            },
            correlation,
            risk,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensitivity_enforces_slider_bounds() {
        assert!(Sensitivity::new(1.0).is_ok());
        assert!(Sensitivity::new(2.5).is_ok());
        assert!(matches!(
            Sensitivity::new(0.5),
            Err(ValidationError::SensitivityOutOfRange { .. })
        ));
        assert!(matches!(
            Sensitivity::new(f64::NAN),
            Err(ValidationError::SensitivityOutOfRange { .. })
        ));
    }

    #[test]
    fn default_sensitivity_matches_slider_default() {
        assert_eq!(Sensitivity::default().value(), 2.0);
    }

    #[test]
    fn request_requires_a_selection() {
        let range = DateRange::new(
            crate::TradingDate::parse("2024-01-01").expect("valid"),
            crate::TradingDate::parse("2024-06-30").expect("valid"),
        )
        .expect("valid");
        let err = AnalysisRequest::new(SymbolUniverse::new(), range, Sensitivity::default())
            .expect_err("must fail");
        assert!(matches!(err, ValidationError::EmptySelection));
    }
}
