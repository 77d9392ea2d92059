//! Deciding which service to fork.

use serde_json::Value;
use tracing::{info, warn};

use crate::config::DemoConfig;
use crate::error::DemoError;
use crate::models::ServiceId;
use crate::process::TigerCli;

/// Resolve the source service.
///
/// Priority order:
/// 1. `MAIN_DB`, then `TIGER_SERVICE_ID`, then `TIGER_SERVICE`
/// 2. The default stored in the CLI's own config
pub async fn resolve_source_service<C: TigerCli>(
    config: &DemoConfig,
    cli: &C,
) -> Result<ServiceId, DemoError> {
    if let Some(service) = config.source_override() {
        info!(service = %service, "Using configured source service");
        return Ok(service);
    }

    let not_configured = || DemoError::Config {
        cli: cli.command().to_string(),
    };

    let output = match cli.run(&["config", "show", "--output", "json"]).await {
        Ok(output) => output,
        Err(err) => {
            warn!(error = %err, "Could not read CLI config");
            return Err(not_configured());
        }
    };

    let service = parse_config_service_id(&output.stdout).ok_or_else(not_configured)?;
    info!(service = %service, "Using source service from CLI config");
    Ok(service)
}

/// Pull `service_id` (top level or under `config`) out of the CLI's JSON config.
fn parse_config_service_id(json: &str) -> Option<ServiceId> {
    let parsed: Value = match serde_json::from_str(json.trim()) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(error = %err, "CLI config is not valid JSON");
            return None;
        }
    };

    ServiceId::from_setting(parsed["service_id"].as_str())
        .or_else(|| ServiceId::from_setting(parsed["config"]["service_id"].as_str()))
}
