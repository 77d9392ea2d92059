//! The fork demo: fork a service, write to the fork, compare, clean up.

use tracing::{info, warn};

use crate::config::DemoConfig;
use crate::db::{insert_test_row, query_test_rows, redact_passwords, Connector, QueryExecutor};
use crate::error::DemoError;
use crate::models::{ForkRecord, Row, ServiceId};
use crate::names;
use crate::process::TigerCli;
use crate::service::{
    create_fork, delete_service, resolve_connection_string, resolve_source_connection,
    resolve_source_service,
};

/// Outcome of a successful demo run.
#[derive(Debug, Clone)]
pub struct DemoReport {
    pub source: ServiceId,
    pub fork: ForkRecord,
    /// Row written to the fork.
    pub inserted: Option<Row>,
    /// `test_data` rows seen on the source after the fork was written to.
    pub source_rows: usize,
    /// `test_data` rows seen on the fork.
    pub fork_rows: usize,
}

impl DemoReport {
    /// The fork holds exactly the one extra row written to it.
    pub const fn is_isolated(&self) -> bool {
        self.fork_rows == self.source_rows + 1
    }
}

struct Observed {
    inserted: Option<Row>,
    source_rows: usize,
    fork_rows: usize,
}

/// Run the whole demo once.
///
/// `on_counts` sees the report while the fork still exists, right before it
/// is deleted. Any failure stops the run. A fork that already exists is
/// deleted on failure only when `cleanup_on_error` is set.
pub async fn run_demo<C: TigerCli, D: Connector>(
    config: &DemoConfig,
    cli: &C,
    executor: &QueryExecutor<D>,
    on_counts: impl FnOnce(&DemoReport),
) -> Result<DemoReport, DemoError> {
    let source = resolve_source_service(config, cli).await?;
    let fork_name = names::fork_name(config, &source);
    let fork = create_fork(cli, &source, &fork_name).await?;

    let observed = match exercise_fork(config, cli, executor, &source, &fork).await {
        Ok(observed) => observed,
        Err(err) => {
            abandon_fork(config, cli, &fork).await;
            return Err(err);
        }
    };

    let report = DemoReport {
        source,
        fork,
        inserted: observed.inserted,
        source_rows: observed.source_rows,
        fork_rows: observed.fork_rows,
    };
    info!(
        source_rows = report.source_rows,
        fork_rows = report.fork_rows,
        isolated = report.is_isolated(),
        "Row counts"
    );
    on_counts(&report);

    delete_service(cli, &report.fork.service_id).await?;
    Ok(report)
}

async fn exercise_fork<C: TigerCli, D: Connector>(
    config: &DemoConfig,
    cli: &C,
    executor: &QueryExecutor<D>,
    source: &ServiceId,
    fork: &ForkRecord,
) -> Result<Observed, DemoError> {
    let source_conn = resolve_source_connection(cli, config, source).await?;
    let fork_conn = resolve_connection_string(cli, config, &fork.service_id).await?;
    info!(
        source = %redact_passwords(&source_conn.url),
        source_origin = ?source_conn.source,
        fork = %redact_passwords(&fork_conn.url),
        fork_origin = ?fork_conn.source,
        "Resolved connections"
    );

    let inserted = insert_test_row(executor, &fork_conn.url, &fork.service_id).await?;

    let source_label = format!("source {source}");
    let fork_label = format!("fork {}", fork.service_id);
    let source_rows = query_test_rows(executor, &source_conn.url, &source_label).await?;
    let fork_rows = query_test_rows(executor, &fork_conn.url, &fork_label).await?;

    Ok(Observed {
        inserted,
        source_rows: source_rows.len(),
        fork_rows: fork_rows.len(),
    })
}

async fn abandon_fork<C: TigerCli>(config: &DemoConfig, cli: &C, fork: &ForkRecord) {
    if !config.cleanup_on_error {
        warn!(
            fork = %fork.service_id,
            "Fork left behind; remove it with `dbfork delete {}`",
            fork.service_id
        );
        return;
    }

    if let Err(err) = delete_service(cli, &fork.service_id).await {
        warn!(fork = %fork.service_id, error = %err, "Cleanup of fork failed");
    }
}
