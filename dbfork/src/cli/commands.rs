//! CLI command execution.

use anyhow::{Context, Result};
use serde_json::Value;

use crate::config::DemoConfig;
use crate::db::{redact_passwords, PgConnector, QueryExecutor};
use crate::demo::{run_demo, DemoReport};
use crate::models::ServiceId;
use crate::process::{SystemCli, TigerCli};
use crate::service::{delete_service, resolve_connection_string, resolve_source_service};

use super::args::{Cli, Commands};

pub async fn execute(cli: Cli) -> Result<()> {
    let config = DemoConfig::from(&cli);
    let tiger = SystemCli::new(&config.cli);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(&config, &tiger).await,
        Commands::Resolve => {
            let service = resolve_source_service(&config, &tiger).await?;
            println!("{service}");
            Ok(())
        }
        Commands::ConnectionString {
            service_id,
            show_password,
        } => connection_string(&config, &tiger, &service_id, show_password).await,
        Commands::Delete { service_id } => {
            let service = ServiceId::new(&service_id)?;
            delete_service(&tiger, &service)
                .await
                .with_context(|| format!("Failed to delete {service}"))?;
            println!("Deleted {service}");
            Ok(())
        }
    }
}

async fn run(config: &DemoConfig, tiger: &SystemCli) -> Result<()> {
    let executor = QueryExecutor::new(PgConnector::new(config.tls_verify));
    let report = run_demo(config, tiger, &executor, print_report)
        .await
        .context("Fork demo failed")?;
    println!("Fork {} deleted.", report.fork.service_id);
    Ok(())
}

async fn connection_string<C: TigerCli>(
    config: &DemoConfig,
    tiger: &C,
    service_id: &str,
    show_password: bool,
) -> Result<()> {
    let service = ServiceId::new(service_id)?;
    let resolved = resolve_connection_string(tiger, config, &service)
        .await
        .with_context(|| format!("Failed to resolve a connection string for {service}"))?;

    if show_password {
        println!("{}", resolved.url);
    } else {
        println!("{}", redact_passwords(&resolved.url));
    }
    Ok(())
}

fn print_report(report: &DemoReport) {
    println!();
    println!("Source:  {}", report.source);
    if report.fork.has_distinct_id() {
        println!("Fork:    {} (name: {})", report.fork.service_id, report.fork.name);
    } else {
        println!("Fork:    {}", report.fork.service_id);
    }
    if let Some(line) = inserted_line(report) {
        println!("{line}");
    }
    println!("{}", "-".repeat(40));
    println!("{:<10} {:>8}", "DATABASE", "ROWS");
    println!("{:<10} {:>8}", "source", report.source_rows);
    println!("{:<10} {:>8}", "fork", report.fork_rows);
    println!();

    if report.is_isolated() {
        println!("✓ Fork is isolated: it holds one more row than its source.");
    } else {
        println!(
            "✗ Unexpected row counts: fork has {} row(s), source has {}.",
            report.fork_rows, report.source_rows
        );
    }
}

fn inserted_line(report: &DemoReport) -> Option<String> {
    report
        .inserted
        .as_ref()
        .map(|row| format!("Inserted into fork: {}", Value::Object(row.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ForkRecord, Row};

    fn report(inserted: Option<Row>) -> DemoReport {
        DemoReport {
            source: ServiceId::new("svc1").unwrap(),
            fork: ForkRecord::new(ServiceId::new("abc123").unwrap(), "svc1-fork".to_string()),
            inserted,
            source_rows: 1,
            fork_rows: 2,
        }
    }

    #[test]
    fn test_inserted_row_is_shown_in_column_order() {
        let mut row = Row::new();
        row.insert("id".to_string(), Value::from(7));
        row.insert("db_name".to_string(), Value::from("abc123"));

        assert_eq!(
            inserted_line(&report(Some(row))).as_deref(),
            Some(r#"Inserted into fork: {"id":7,"db_name":"abc123"}"#)
        );
        assert!(inserted_line(&report(None)).is_none());
    }
}
