use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use sigmascan_core::{
    AnalysisRequest, EnvelopeError, HeatmapPane, HeatmapView, MarketDataSource, Pipeline,
    PipelineError, Sensitivity,
};

use crate::cli::HeatmapArgs;
use crate::error::CliError;

use super::{parse_selection, parse_window, CommandResult};

pub async fn run(
    args: &HeatmapArgs,
    source: Arc<dyn MarketDataSource>,
) -> Result<CommandResult, CliError> {
    let pane = HeatmapPane::from_str(&args.pane)?;
    let selection = parse_selection(&args.analyze.window.symbols)?;
    let range = parse_window(&args.analyze.window)?;
    let sensitivity = Sensitivity::new(args.analyze.sensitivity)?;
    let request = AnalysisRequest::new(selection, range, sensitivity)?;

    let pipeline = Pipeline::new(source);
    let source_chain = vec![pipeline.source_id()];
    let started = Instant::now();

    match pipeline.run(&request).await {
        Ok(report) => {
            let latency_ms = started.elapsed().as_millis() as u64;
            let view = HeatmapView::from_matrix(&report.correlation, pane);
            let mut result = CommandResult::ok(serde_json::to_value(&view)?, source_chain)
                .with_latency(latency_ms);
            if view.cells.is_empty() {
                result = result.with_warning(
                    "no ticker had anomalies of the selected kinds in this window",
                );
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
