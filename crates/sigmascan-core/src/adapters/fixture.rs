use std::future::Future;
use std::pin::Pin;

use crate::data_source::{HealthStatus, HistoryRequest, MarketDataSource, SourceError};
use crate::{MarketHistory, Observation, ProviderId, TickerHistory};

/// In-memory source serving pre-built histories.
///
/// Mirrors the provider tolerance contract exactly: requested symbols the
/// fixture does not hold are omitted, and observations outside the request
/// range are filtered out. Tests use it to script both happy paths and
/// fatal-source scenarios without any transport.
#[derive(Default)]
pub struct FixtureSource {
    market: MarketHistory,
    failure: Option<SourceError>,
}

impl FixtureSource {
    pub fn new(market: MarketHistory) -> Self {
        Self {
            market,
            failure: None,
        }
    }

    /// A source whose every fetch fails with the given error.
    pub fn failing(failure: SourceError) -> Self {
        Self {
            market: MarketHistory::new(),
            failure: Some(failure),
        }
    }
}

impl MarketDataSource for FixtureSource {
    fn id(&self) -> ProviderId {
        ProviderId::Offline
    }

    fn daily_history<'a>(
        &'a self,
        req: &'a HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<MarketHistory, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            if let Some(failure) = &self.failure {
                return Err(failure.clone());
            }

            let mut market = MarketHistory::new();
            for history in self.market.histories() {
                if !req.symbols.contains(&history.symbol) {
                    continue;
                }
                let observations: Vec<Observation> = history
                    .observations
                    .iter()
                    .filter(|observation| req.range.contains(observation.date))
                    .copied()
                    .collect();
                let trimmed = TickerHistory::new(history.symbol.clone(), observations)
                    .map_err(|error| SourceError::internal(error.to_string()))?;
                market.push(trimmed);
            }
            Ok(market)
        })
    }

    fn health(&self) -> HealthStatus {
        HealthStatus::healthy()
    }
}
