use std::sync::Arc;
use std::time::Instant;

use serde_json::{json, Value};
use sigmascan_core::{
    EnvelopeError, HistoryRequest, MarketDataSource, QuantityKind, QuantityTable,
};

use crate::cli::WindowArgs;
use crate::error::CliError;

use super::{dropped_symbols, parse_selection, parse_window, CommandResult};

pub async fn run(
    args: &WindowArgs,
    source: Arc<dyn MarketDataSource>,
) -> Result<CommandResult, CliError> {
    let selection = parse_selection(&args.symbols)?;
    let range = parse_window(args)?;
    let request = HistoryRequest::new(selection.to_vec(), range)
        .map_err(|error| CliError::Command(error.to_string()))?;

    let source_chain = vec![source.id()];
    let started = Instant::now();

    match source.daily_history(&request).await {
        Ok(market) => {
            let latency_ms = started.elapsed().as_millis() as u64;
            let adj_close = QuantityTable::from_history(&market, QuantityKind::AdjClose);
            let volume = QuantityTable::from_history(&market, QuantityKind::Volume);
            let served = market.symbols();

            let data = json!({
                "range": range,
                "adj_close": adj_close,
                "volume": volume,
            });
            let mut result = CommandResult::ok(data, source_chain).with_latency(latency_ms);
            for symbol in dropped_symbols(&selection, &served) {
                result = result.with_warning(format!(
                    "symbol {symbol} absent from provider response; dropped"
                ));
            }
            Ok(result)
        }
        Err(error) => {
            let latency_ms = started.elapsed().as_millis() as u64;
            let envelope_error = EnvelopeError::new(error.code(), error.to_string())?
                .with_retryable(error.retryable())
                .with_source(source_chain[0]);
            Ok(CommandResult::ok(Value::Null, source_chain)
                .with_error(envelope_error)
                .with_latency(latency_ms))
        }
    }
}
