mod analyze;
mod heatmap;
mod history;
mod sources;

use std::sync::Arc;

use serde_json::Value;
use sigmascan_core::{
    DateRange, Envelope, EnvelopeError, EnvelopeMeta, MarketDataSource, ProviderId, ReqwestClient,
    Symbol, SymbolUniverse, TradingDate, YahooAdapter,
};
use uuid::Uuid;

use crate::cli::{Cli, Command, SourceSelector, WindowArgs};
use crate::error::CliError;

const SCHEMA_VERSION: &str = "v1.0.0";

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub latency_ms: u64,
    pub source_chain: Vec<ProviderId>,
}

impl CommandResult {
    pub fn ok(data: Value, source_chain: Vec<ProviderId>) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
            latency_ms: 0,
            source_chain,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_error(mut self, error: EnvelopeError) -> Self {
        self.errors.push(error);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let source = build_source(cli)?;
    tracing::debug!(source = %source.id(), "dispatching command");

    let command_result = match &cli.command {
        Command::Analyze(args) => analyze::run(args, source).await?,
        Command::History(args) => history::run(args, source).await?,
        Command::Heatmap(args) => heatmap::run(args, source).await?,
        Command::Sources => sources::run(source.as_ref())?,
    };

    let CommandResult {
        data,
        warnings,
        errors,
        latency_ms,
        source_chain,
    } = command_result;

    let mut meta = EnvelopeMeta::new(
        Uuid::new_v4().to_string(),
        SCHEMA_VERSION,
        source_chain,
        latency_ms,
    )?;
    for warning in warnings {
        meta.push_warning(warning);
    }

    Envelope::with_errors(meta, data, errors).map_err(CliError::from)
}

fn build_source(cli: &Cli) -> Result<Arc<dyn MarketDataSource>, CliError> {
    match cli.source {
        SourceSelector::Yahoo => {
            let client =
                ReqwestClient::new().map_err(|error| CliError::Command(error.to_string()))?;
            Ok(Arc::new(
                YahooAdapter::with_http_client(Arc::new(client)).with_timeout_ms(cli.timeout_ms),
            ))
        }
        SourceSelector::Offline => Ok(Arc::new(YahooAdapter::default())),
    }
}

/// Resolves the selection window: end defaults to today (UTC), start to one
/// year before the end, matching the dashboard's initial view.
pub(crate) fn parse_window(args: &WindowArgs) -> Result<DateRange, CliError> {
    let end = match &args.end {
        Some(value) => TradingDate::parse(value)?,
        None => TradingDate::today_utc(),
    };
    let start = match &args.start {
        Some(value) => TradingDate::parse(value)?,
        None => TradingDate::from_date(end.into_inner() - time::Duration::days(365)),
    };
    Ok(DateRange::new(start, end)?)
}

pub(crate) fn parse_selection(symbols: &[String]) -> Result<SymbolUniverse, CliError> {
    let parsed: Vec<Symbol> = symbols
        .iter()
        .map(|symbol| Symbol::parse(symbol))
        .collect::<Result<_, _>>()?;
    Ok(parsed.into_iter().collect())
}

/// Requested symbols the provider did not serve, in request order.
pub(crate) fn dropped_symbols(requested: &SymbolUniverse, served: &[Symbol]) -> Vec<Symbol> {
    requested
        .as_slice()
        .iter()
        .filter(|symbol| !served.contains(symbol))
        .cloned()
        .collect()
}
