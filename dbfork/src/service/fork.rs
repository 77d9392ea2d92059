//! Creating and deleting forks.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use crate::error::DemoError;
use crate::models::{ForkRecord, ServiceId};
use crate::process::TigerCli;

/// `│ Service ID │ abc123 │`, with box-drawing or ASCII borders.
static TABLE_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[│|]\s*Service ID\s*[│|]\s*([^\s│|]+)\s*[│|]").expect("table pattern is valid")
});

/// `New Service ID: abc123`
static NEW_SERVICE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"New Service ID:\s*(\S+)").expect("service line pattern is valid")
});

/// Fork `source` at its current state under `fork_name`.
///
/// If the new id cannot be found in the CLI output, the fork name is used.
pub async fn create_fork<C: TigerCli>(
    cli: &C,
    source: &ServiceId,
    fork_name: &str,
) -> Result<ForkRecord, DemoError> {
    info!(source = %source, fork_name, "Creating fork");
    let output = cli
        .run(&["service", "fork", source.as_str(), "--name", fork_name, "--now"])
        .await?;

    let service_id = match parse_fork_service_id(&output.combined()) {
        Some(id) => id,
        None => {
            warn!(fork_name, "No service id in fork output, using the fork name");
            ServiceId::new(fork_name)?
        }
    };

    info!(fork = %service_id, "Fork created");
    Ok(ForkRecord::new(service_id, fork_name.to_string()))
}

/// Delete a service without an interactive confirmation.
pub async fn delete_service<C: TigerCli>(cli: &C, service: &ServiceId) -> Result<(), DemoError> {
    info!(service = %service, "Deleting service");
    cli.run(&["service", "delete", service.as_str(), "--confirm"])
        .await?;
    info!(service = %service, "Service deleted");
    Ok(())
}

fn parse_fork_service_id(output: &str) -> Option<ServiceId> {
    [&*TABLE_ROW, &*NEW_SERVICE_LINE]
        .into_iter()
        .find_map(|pattern| pattern.captures(output))
        .and_then(|captures| ServiceId::new(&captures[1]).ok())
}
