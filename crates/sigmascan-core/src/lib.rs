//! Core pipeline for sigmascan.
//!
//! This crate contains:
//! - Canonical domain models and validation
//! - The market data source contract and its adapters
//! - The anomaly detection, correlation, and risk-aggregation stages
//! - Presentation-boundary views and the response envelope

pub mod adapters;
pub mod analytics;
pub mod circuit_breaker;
pub mod data_source;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod pipeline;
pub mod present;
pub mod retry;
pub mod source;
pub mod throttling;
pub mod universe;

pub use adapters::{FixtureSource, YahooAdapter};
pub use analytics::{
    aggregate, correlate, detect, AnomalySeries, ColumnKey, CorrelationMatrix, Detection,
    QuantityTable, RiskScore, TickerSeries, ZScoreRecord,
};
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use data_source::{
    HealthState, HealthStatus, HistoryRequest, MarketDataSource, SourceError, SourceErrorKind,
};
pub use domain::{
    DateRange, MarketHistory, Observation, QuantityKind, Symbol, TickerHistory, TradingDate,
};
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta};
pub use error::{CoreError, ValidationError};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestClient};
pub use pipeline::{
    AnalysisReport, AnalysisRequest, Pipeline, PipelineError, QuantityReport, Sensitivity,
};
pub use present::{
    rating_chart, risk_chart, HeatmapPane, HeatmapView, RatingSlice, RiskBar, RiskBarView,
};
pub use retry::BackoffPolicy;
pub use source::ProviderId;
pub use throttling::FetchThrottle;
pub use universe::SymbolUniverse;
