use serde_json::json;
use sigmascan_core::MarketDataSource;

use crate::error::CliError;

use super::CommandResult;

pub fn run(source: &dyn MarketDataSource) -> Result<CommandResult, CliError> {
    let health = source.health();
    let data = json!([{
        "id": source.id().as_str(),
        "state": health.state,
        "rate_available": health.rate_available,
        "status": health.status_label(),
    }]);
    Ok(CommandResult::ok(data, vec![source.id()]))
}
