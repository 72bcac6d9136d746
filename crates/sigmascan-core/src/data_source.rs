use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{DateRange, MarketHistory, ProviderId, Symbol};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    InvalidRequest,
    Internal,
}

/// Structured source error surfaced when a recomputation cannot proceed.
///
/// An unknown symbol is NOT an error at this level: providers omit such
/// symbols from the response and the pipeline renders fewer series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Request payload for the daily-history endpoint.
///
/// Symbols are deduplicated while preserving the caller's order; the
/// response order is still provider-defined (first appearance wins).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub symbols: Vec<Symbol>,
    pub range: DateRange,
}

impl HistoryRequest {
    pub fn new(symbols: Vec<Symbol>, range: DateRange) -> Result<Self, SourceError> {
        let mut seen = HashSet::new();
        let symbols: Vec<Symbol> = symbols
            .into_iter()
            .filter(|symbol| seen.insert(symbol.clone()))
            .collect();
        if symbols.is_empty() {
            return Err(SourceError::invalid_request(
                "history request must include at least one symbol",
            ));
        }
        Ok(Self { symbols, range })
    }
}

/// Health state reported by a source adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Runtime source health snapshot, used by the `sources` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub state: HealthState,
    pub rate_available: bool,
}

impl HealthStatus {
    pub const fn new(state: HealthState, rate_available: bool) -> Self {
        Self {
            state,
            rate_available,
        }
    }

    pub const fn healthy() -> Self {
        Self::new(HealthState::Healthy, true)
    }

    pub fn status_label(self) -> &'static str {
        if !self.rate_available {
            return "rate_limited";
        }
        match self.state {
            HealthState::Healthy => "healthy",
            HealthState::Degraded => "degraded",
            HealthState::Unhealthy => "unhealthy",
        }
    }
}

/// Market data source contract. The provider is a black box with one
/// endpoint: daily adjusted-close and volume history per symbol over an
/// inclusive date range.
pub trait MarketDataSource: Send + Sync {
    /// Unique provider identifier.
    fn id(&self) -> ProviderId;

    /// Fetches daily adjusted-close and volume observations for every
    /// requested symbol the provider knows. Unknown symbols are omitted
    /// from the returned [`MarketHistory`] without error.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the provider is unreachable, rate
    /// limited past the retry budget, or the request is malformed. Any such
    /// error is fatal to the triggering recomputation.
    fn daily_history<'a>(
        &'a self,
        req: &'a HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<MarketHistory, SourceError>> + Send + 'a>>;

    /// Current health snapshot.
    fn health(&self) -> HealthStatus;
}
