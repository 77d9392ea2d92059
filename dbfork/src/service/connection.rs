//! Finding a connection string for a service.

use tracing::{info, warn};

use crate::config::DemoConfig;
use crate::error::DemoError;
use crate::models::ServiceId;
use crate::process::TigerCli;

/// Where a connection string came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionSource {
    /// Reported by the CLI.
    Cli,
    /// Built from the `TD_DB_*` fallback settings.
    Fallback,
    /// Taken from `MAIN_DB_URL`.
    Override,
}

/// A connection string plus its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConnection {
    pub url: String,
    pub source: ConnectionSource,
}

/// Ask the CLI for `service`'s connection string, password included.
///
/// Only a failed CLI call triggers the fallback; a call that succeeds with
/// empty output is an error of its own.
pub async fn resolve_connection_string<C: TigerCli>(
    cli: &C,
    config: &DemoConfig,
    service: &ServiceId,
) -> Result<ResolvedConnection, DemoError> {
    let args = [
        "db",
        "connection-string",
        "--service-id",
        service.as_str(),
        "--with-password",
    ];

    match cli.run(&args).await {
        Ok(output) => {
            let url = output.stdout.trim();
            if url.is_empty() {
                return Err(DemoError::UnusableOutput {
                    command: format!("{} {}", cli.command(), args.join(" ")),
                });
            }
            Ok(ResolvedConnection {
                url: url.to_string(),
                source: ConnectionSource::Cli,
            })
        }
        Err(err) => {
            warn!(
                service = %service,
                error = %err,
                "Connection string lookup failed, using fallback settings"
            );
            Ok(ResolvedConnection {
                url: config.fallback.connection_string(service),
                source: ConnectionSource::Fallback,
            })
        }
    }
}

/// Connection string for the source service: `MAIN_DB_URL` when set, else
/// the same lookup as any other service.
pub async fn resolve_source_connection<C: TigerCli>(
    cli: &C,
    config: &DemoConfig,
    source: &ServiceId,
) -> Result<ResolvedConnection, DemoError> {
    if let Some(url) = config.main_db_url() {
        info!(service = %source, "Using MAIN_DB_URL for the source connection");
        return Ok(ResolvedConnection {
            url: url.to_string(),
            source: ConnectionSource::Override,
        });
    }
    resolve_connection_string(cli, config, source).await
}
