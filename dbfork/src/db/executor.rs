//! One-statement-per-connection query execution.

use std::future::Future;

use tracing::{info, warn};

use super::descriptor::ConnectionDescriptor;
use crate::error::DemoError;
use crate::models::{QueryOutcome, Row};

/// An open database connection.
pub trait DbSession: Send {
    /// Execute a single SQL statement.
    fn execute(
        &mut self,
        sql: &str,
    ) -> impl Future<Output = Result<QueryOutcome, sqlx::Error>> + Send;

    /// Close the connection.
    fn close(self) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
}

/// Opens [`DbSession`]s.
pub trait Connector: Sync {
    type Session: DbSession;

    fn connect(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> impl Future<Output = Result<Self::Session, sqlx::Error>> + Send;
}

/// Runs statements, each on its own short-lived connection.
#[derive(Debug, Clone)]
pub struct QueryExecutor<C> {
    connector: C,
}

impl<C: Connector> QueryExecutor<C> {
    pub const fn new(connector: C) -> Self {
        Self { connector }
    }

    #[cfg(test)]
    pub const fn connector(&self) -> &C {
        &self.connector
    }

    /// Open a connection, execute `sql`, print what came back and close.
    ///
    /// The connection is closed before returning whether or not the
    /// statement succeeded.
    pub async fn run(
        &self,
        connection_string: &str,
        sql: &str,
        description: &str,
    ) -> Result<Vec<Row>, DemoError> {
        let descriptor = ConnectionDescriptor::parse(connection_string)?;
        info!(database = %descriptor, "{description}");
        info!("SQL: {}", sql.trim());

        let mut session = self
            .connector
            .connect(&descriptor)
            .await
            .map_err(|source| DemoError::Connect {
                description: description.to_string(),
                source,
            })?;

        let result = session.execute(sql).await;
        if let Err(err) = session.close().await {
            warn!(error = %err, "Failed to close connection cleanly");
        }

        let outcome = result.map_err(|source| DemoError::Query {
            description: description.to_string(),
            source,
        })?;

        print_outcome(description, &outcome);
        Ok(outcome.rows)
    }
}

fn print_outcome(description: &str, outcome: &QueryOutcome) {
    if !outcome.rows.is_empty() {
        println!("{description}: {} row(s)", outcome.rows.len());
        for row in &outcome.rows {
            println!("  {}", serde_json::to_string(row).unwrap_or_default());
        }
    } else if let Some(affected) = outcome.rows_affected {
        println!("{description}: {affected} row(s) affected");
    }
}
