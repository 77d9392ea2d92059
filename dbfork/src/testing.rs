//! Test doubles for the CLI and database seams.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex};

use regex::Regex;
use serde_json::Value;

use crate::db::{ConnectionDescriptor, Connector, DbSession};
use crate::error::CliError;
use crate::models::{QueryOutcome, Row};
use crate::process::{CommandOutput, TigerCli};

type Handler = Box<dyn Fn(&[&str]) -> Result<CommandOutput, CliError> + Send + Sync>;

/// Scripted CLI: answers every call through `handler` and records the arguments.
pub struct FakeCli {
    handler: Handler,
    calls: Mutex<Vec<String>>,
}

impl FakeCli {
    pub fn new(
        handler: impl Fn(&[&str]) -> Result<CommandOutput, CliError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call so far, arguments joined with spaces.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

impl TigerCli for FakeCli {
    async fn run(&self, args: &[&str]) -> Result<CommandOutput, CliError> {
        self.calls.lock().unwrap().push(args.join(" "));
        (self.handler)(args)
    }

    fn command(&self) -> &str {
        "tiger"
    }
}

pub fn stdout(text: &str) -> Result<CommandOutput, CliError> {
    Ok(CommandOutput {
        stdout: text.to_string(),
        stderr: String::new(),
    })
}

pub fn failure(args: &[&str]) -> Result<CommandOutput, CliError> {
    Err(CliError::Failed {
        command: format!("tiger {}", args.join(" ")),
        code: Some(1),
        stderr: "simulated failure".to_string(),
        stdout: String::new(),
    })
}

static INSERT_VALUES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"VALUES \('((?:[^']|'')*)', '((?:[^']|'')*)'\)").unwrap());

#[derive(Default)]
struct FakeState {
    /// `test_data` rows per database name, oldest first.
    tables: HashMap<String, Vec<Row>>,
    next_id: i64,
    opened: usize,
    closed: usize,
    fail_on: Option<String>,
    refuse_connections: bool,
}

/// In-memory stand-in for Postgres that understands the `test_data` statements.
///
/// Databases are keyed by the database name in the connection string.
#[derive(Clone, Default)]
pub struct FakeConnector {
    state: Arc<Mutex<FakeState>>,
}

impl FakeConnector {
    /// Statements containing `pattern` fail with a driver error.
    pub fn failing_on(pattern: &str) -> Self {
        let connector = Self::default();
        connector.state.lock().unwrap().fail_on = Some(pattern.to_string());
        connector
    }

    pub fn refusing_connections() -> Self {
        let connector = Self::default();
        connector.state.lock().unwrap().refuse_connections = true;
        connector
    }

    pub fn opened(&self) -> usize {
        self.state.lock().unwrap().opened
    }

    pub fn closed(&self) -> usize {
        self.state.lock().unwrap().closed
    }

    pub fn row_count(&self, database: &str) -> Option<usize> {
        self.state.lock().unwrap().tables.get(database).map(Vec::len)
    }

    /// Create `test_data` in `database` with `rows` existing rows.
    pub fn seed(&self, database: &str, rows: usize) {
        let mut state = self.state.lock().unwrap();
        for _ in 0..rows {
            let row = state.new_row("seeded", database);
            state.tables.entry(database.to_string()).or_default().push(row);
        }
        state.tables.entry(database.to_string()).or_default();
    }

    /// Copy `from` into `to`, the way the platform's fork would.
    pub fn fork_database(&self, from: &str, to: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(rows) = state.tables.get(from).cloned() {
            state.tables.insert(to.to_string(), rows);
        }
    }
}

impl FakeState {
    fn new_row(&mut self, message: &str, db_name: &str) -> Row {
        self.next_id += 1;
        let mut row = Row::new();
        row.insert("id".to_string(), Value::from(self.next_id));
        row.insert("message".to_string(), Value::from(message));
        row.insert(
            "created_at".to_string(),
            Value::from(format!("2026-01-01T00:00:{:02}+00:00", self.next_id)),
        );
        row.insert("db_name".to_string(), Value::from(db_name));
        row
    }
}

impl Connector for FakeConnector {
    type Session = FakeSession;

    async fn connect(&self, descriptor: &ConnectionDescriptor) -> Result<FakeSession, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        if state.refuse_connections {
            return Err(sqlx::Error::Protocol("connection refused".to_string()));
        }
        state.opened += 1;
        Ok(FakeSession {
            database: descriptor.database.clone(),
            state: Arc::clone(&self.state),
        })
    }
}

pub struct FakeSession {
    database: String,
    state: Arc<Mutex<FakeState>>,
}

impl DbSession for FakeSession {
    async fn execute(&mut self, sql: &str) -> Result<QueryOutcome, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        if state.fail_on.as_deref().is_some_and(|p| sql.contains(p)) {
            return Err(sqlx::Error::Protocol(format!("simulated error for: {sql}")));
        }

        let missing = || sqlx::Error::Protocol("relation \"test_data\" does not exist".to_string());
        let statement = sql.trim_start();

        if statement.starts_with("CREATE TABLE") {
            state.tables.entry(self.database.clone()).or_default();
            Ok(QueryOutcome {
                rows: Vec::new(),
                rows_affected: Some(0),
            })
        } else if statement.starts_with("INSERT") {
            let captures = INSERT_VALUES
                .captures(statement)
                .ok_or_else(|| sqlx::Error::Protocol("unsupported insert".to_string()))?;
            let message = captures[1].replace("''", "'");
            let db_name = captures[2].replace("''", "'");
            if !state.tables.contains_key(&self.database) {
                return Err(missing());
            }
            let row = state.new_row(&message, &db_name);
            if let Some(table) = state.tables.get_mut(&self.database) {
                table.push(row.clone());
            }
            Ok(QueryOutcome {
                rows: vec![row],
                rows_affected: Some(1),
            })
        } else if statement.starts_with("SELECT") {
            let rows: Vec<Row> = state
                .tables
                .get(&self.database)
                .ok_or_else(missing)?
                .iter()
                .rev()
                .cloned()
                .collect();
            let count = rows.len() as u64;
            Ok(QueryOutcome {
                rows,
                rows_affected: Some(count),
            })
        } else {
            Err(sqlx::Error::Protocol(format!("unsupported statement: {sql}")))
        }
    }

    async fn close(self) -> Result<(), sqlx::Error> {
        self.state.lock().unwrap().closed += 1;
        Ok(())
    }
}
