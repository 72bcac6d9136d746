use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use sigmascan_core::{
    AnalysisRequest, EnvelopeError, MarketDataSource, Pipeline, PipelineError, Sensitivity,
};

use crate::cli::AnalyzeArgs;
use crate::error::CliError;

use super::{dropped_symbols, parse_selection, parse_window, CommandResult};

pub async fn run(
    args: &AnalyzeArgs,
    source: Arc<dyn MarketDataSource>,
) -> Result<CommandResult, CliError> {
    let selection = parse_selection(&args.window.symbols)?;
    let range = parse_window(&args.window)?;
    let sensitivity = Sensitivity::new(args.sensitivity)?;
    let request = AnalysisRequest::new(selection, range, sensitivity)?;

    let pipeline = Pipeline::new(source);
    let source_chain = vec![pipeline.source_id()];
    let started = Instant::now();

    match pipeline.run(&request).await {
        Ok(report) => {
            let latency_ms = started.elapsed().as_millis() as u64;
            let served = report.symbols();
            let data = serde_json::to_value(&report)?;
            let mut result = CommandResult::ok(data, source_chain).with_latency(latency_ms);
            for symbol in dropped_symbols(&request.selection, &served) {
                result = result.with_warning(format!(
                    "symbol {symbol} absent from provider response; dropped"
                ));
            }
            Ok(result)
        }
        Err(PipelineError::DataSourceUnavailable(error)) => {
            let latency_ms = started.elapsed().as_millis() as u64;
            let envelope_error = EnvelopeError::new(error.code(), error.to_string())?
                .with_retryable(error.retryable())
                .with_source(source_chain[0]);
            Ok(CommandResult::ok(Value::Null, source_chain)
                .with_error(envelope_error)
                .with_latency(latency_ms))
        }
        Err(PipelineError::Validation(error)) => Err(error.into()),
    }
}
