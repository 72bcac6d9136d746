use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use time::Weekday;

use crate::circuit_breaker::CircuitBreaker;
use crate::data_source::{
    HealthState, HealthStatus, HistoryRequest, MarketDataSource, SourceError,
};
use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::retry::BackoffPolicy;
use crate::throttling::FetchThrottle;
use crate::{
    CircuitState, DateRange, MarketHistory, Observation, ProviderId, Symbol, TickerHistory,
    TradingDate,
};

const CHART_BASE: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const SECONDS_PER_DAY: i64 = 86_400;

/// Yahoo Finance daily-history adapter.
///
/// One chart-endpoint request per requested symbol. Symbols unknown to the
/// provider are omitted from the result; that tolerance is part of the
/// source contract, not an error path. Transport failures, after the retry
/// budget, are fatal to the whole fetch.
///
/// Constructed without an HTTP client the adapter runs in offline mode and
/// serves a deterministic synthetic history seeded by symbol, which keeps
/// every downstream stage exercisable without connectivity.
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    circuit_breaker: Arc<CircuitBreaker>,
    throttle: FetchThrottle,
    retry: BackoffPolicy,
    timeout_ms: u64,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            circuit_breaker: Arc::new(CircuitBreaker::default()),
            throttle: FetchThrottle::yahoo_default(),
            retry: BackoffPolicy::default(),
            timeout_ms: 10_000,
        }
    }
}

impl YahooAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            ..Self::default()
        }
    }

    pub fn with_circuit_breaker(mut self, circuit_breaker: Arc<CircuitBreaker>) -> Self {
        self.circuit_breaker = circuit_breaker;
        self
    }

    pub fn with_retry(mut self, retry: BackoffPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn is_offline(&self) -> bool {
        self.http_client.is_offline()
    }

    async fn fetch_symbol(
        &self,
        symbol: &Symbol,
        range: &DateRange,
    ) -> Result<Option<TickerHistory>, SourceError> {
        if self.is_offline() {
            return Ok(Some(synthetic_history(symbol, range)?));
        }

        if !self.circuit_breaker.allow_request() {
            return Err(SourceError::unavailable("yahoo circuit breaker is open"));
        }

        while let Err(pause) = self.throttle.acquire() {
            tokio::time::sleep(pause).await;
        }

        let mut attempt = 0;
        loop {
            match self.request_chart(symbol, range).await {
                Ok(outcome) => {
                    self.circuit_breaker.record_success();
                    return Ok(outcome);
                }
                Err(error) if error.retryable() => {
                    self.circuit_breaker.record_failure();
                    match self.retry.delay(attempt) {
                        Some(delay) => {
                            tracing::debug!(
                                %symbol,
                                attempt,
                                delay_ms = delay.as_millis() as u64,
                                "retrying yahoo chart request"
                            );
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                        }
                        None => return Err(error),
                    }
                }
                Err(error) => {
                    self.circuit_breaker.record_failure();
                    return Err(error);
                }
            }
        }
    }

    async fn request_chart(
        &self,
        symbol: &Symbol,
        range: &DateRange,
    ) -> Result<Option<TickerHistory>, SourceError> {
        // period2 is exclusive; push it one day past the end to keep the
        // range inclusive of its last calendar day.
        let period1 = range.start().unix_midnight();
        let period2 = range.end().unix_midnight() + SECONDS_PER_DAY;
        let url = format!(
            "{CHART_BASE}/{}?interval=1d&includeAdjustedClose=true&period1={period1}&period2={period2}",
            urlencoding::encode(symbol.as_str())
        );

        let request = HttpRequest::get(url)
            .with_header("accept", "application/json")
            .with_timeout_ms(self.timeout_ms);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| match error.is_retryable() {
                true => SourceError::unavailable(format!("yahoo transport: {}", error.message())),
                false => SourceError::internal(format!("yahoo transport: {}", error.message())),
            })?;

        if response.status == 429 {
            return Err(SourceError::rate_limited("yahoo returned status 429"));
        }

        match serde_json::from_str::<ChartEnvelope>(&response.body) {
            Ok(envelope) => normalize_chart(symbol, range, envelope, response.status),
            Err(_) if !response.is_success() => Err(SourceError::unavailable(format!(
                "yahoo returned status {}",
                response.status
            ))),
            Err(error) => Err(SourceError::internal(format!(
                "yahoo chart payload did not parse: {error}"
            ))),
        }
    }
}

impl MarketDataSource for YahooAdapter {
    fn id(&self) -> ProviderId {
        if self.is_offline() {
            ProviderId::Offline
        } else {
            ProviderId::Yahoo
        }
    }

    fn daily_history<'a>(
        &'a self,
        req: &'a HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<MarketHistory, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let mut market = MarketHistory::new();
            for symbol in &req.symbols {
                match self.fetch_symbol(symbol, &req.range).await? {
                    Some(history) => market.push(history),
                    None => {
                        tracing::debug!(%symbol, "symbol unknown to provider, dropped");
                    }
                }
            }
            Ok(market)
        })
    }

    fn health(&self) -> HealthStatus {
        let state = match self.circuit_breaker.state() {
            CircuitState::Closed => HealthState::Healthy,
            CircuitState::HalfOpen => HealthState::Degraded,
            CircuitState::Open => HealthState::Unhealthy,
        };
        HealthStatus::new(state, true)
    }
}

// Wire shape of the v8 chart endpoint, reduced to the fields consumed here.

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartPayload,
}

#[derive(Debug, Deserialize)]
struct ChartPayload {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
    #[serde(default)]
    adjclose: Vec<AdjCloseBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct AdjCloseBlock {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

fn normalize_chart(
    symbol: &Symbol,
    range: &DateRange,
    envelope: ChartEnvelope,
    status: u16,
) -> Result<Option<TickerHistory>, SourceError> {
    if let Some(error) = envelope.chart.error {
        // The provider answers unknown/delisted symbols with an error body;
        // per the source contract those are omissions, not failures.
        if status == 404 || error.code.eq_ignore_ascii_case("not found") {
            return Ok(None);
        }
        return Err(SourceError::unavailable(format!(
            "yahoo chart error {}: {}",
            error.code,
            error.description.unwrap_or_default()
        )));
    }

    let Some(result) = envelope
        .chart
        .result
        .and_then(|mut results| (!results.is_empty()).then(|| results.remove(0)))
    else {
        return Ok(None);
    };

    let volumes = result.indicators.quote.first();
    let adjcloses = result.indicators.adjclose.first();

    let mut observations = Vec::with_capacity(result.timestamp.len());
    for (index, &timestamp) in result.timestamp.iter().enumerate() {
        let adj_close = adjcloses.and_then(|block| block.adjclose.get(index).copied().flatten());
        let volume = volumes.and_then(|block| block.volume.get(index).copied().flatten());
        let (Some(adj_close), Some(volume)) = (adj_close, volume) else {
            continue;
        };

        let Ok(date) = TradingDate::from_unix_timestamp(timestamp) else {
            continue;
        };
        if !range.contains(date) {
            continue;
        }

        match Observation::new(date, adj_close, volume) {
            Ok(observation) => observations.push(observation),
            Err(error) => {
                tracing::warn!(%symbol, %date, %error, "discarding malformed provider row");
            }
        }
    }

    observations.sort_by_key(|observation| observation.date);
    observations.dedup_by_key(|observation| observation.date);

    let history = TickerHistory::new(symbol.clone(), observations)
        .map_err(|error| SourceError::internal(error.to_string()))?;
    Ok(Some(history))
}

fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol
        .as_str()
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325_u64, |acc, byte| {
            (acc ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
        })
}

/// Deterministic weekday series for offline mode: a per-symbol price level
/// with a smooth wobble, plus sparse spike days so the detector has
/// something to flag.
fn synthetic_history(symbol: &Symbol, range: &DateRange) -> Result<TickerHistory, SourceError> {
    let seed = symbol_seed(symbol);
    let base_price = 25.0 + (seed % 1_200) as f64 / 10.0;
    let base_volume = 800_000.0 + (seed % 900_000) as f64;

    let mut observations = Vec::new();
    let mut date = range.start().into_inner();
    let mut index = 0_u64;
    while TradingDate::from_date(date) <= range.end() {
        let day = TradingDate::from_date(date);
        if !matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday) {
            let phase = seed.rotate_left((index % 31) as u32);
            let wobble = ((phase % 200) as f64 - 100.0) / 1_000.0;
            let spike = (seed.wrapping_add(index * 7) % 89) == 0;

            let mut adj_close = base_price * (1.0 + wobble);
            let mut volume = base_volume * (1.0 + wobble / 2.0);
            if spike {
                adj_close *= 1.4;
                volume *= 3.0;
            }

            let observation = Observation::new(day, adj_close, volume.round())
                .map_err(|error| SourceError::internal(error.to_string()))?;
            observations.push(observation);
            index += 1;
        }
        match date.next_day() {
            Some(next) => date = next,
            None => break,
        }
    }

    TickerHistory::new(symbol.clone(), observations)
        .map_err(|error| SourceError::internal(error.to_string()))
}
