//! Error types shared across the fork demo.

use thiserror::Error;

/// Failure of an external CLI invocation.
///
/// Kept separate from [`DemoError`] so callers can branch on "the command
/// failed" without also catching parse or database errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// The command could not be started at all (not installed, not executable).
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran and exited unsuccessfully.
    #[error("`{command}` {}: {}", exit_label(*.code), failure_detail(.stderr, .stdout))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
        stdout: String,
    },
}

fn exit_label(code: Option<i32>) -> String {
    code.map_or_else(
        || "was terminated by a signal".to_string(),
        |code| format!("exited with status {code}"),
    )
}

fn failure_detail<'a>(stderr: &'a str, stdout: &'a str) -> &'a str {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        let stdout = stdout.trim();
        if stdout.is_empty() {
            "no output"
        } else {
            stdout
        }
    } else {
        stderr
    }
}

/// Errors produced by the demo workflow.
#[derive(Debug, Error)]
pub enum DemoError {
    /// No source service could be resolved from flags, environment or CLI config.
    #[error(
        "no source service configured: set MAIN_DB, TIGER_SERVICE_ID or TIGER_SERVICE, \
         or store a default with `{cli} config set service_id <id>`"
    )]
    Config { cli: String },

    /// A service identifier was empty.
    #[error("service id must not be empty")]
    EmptyServiceId,

    #[error(transparent)]
    Cli(#[from] CliError),

    /// The CLI exited successfully but printed nothing we can use.
    #[error("`{command}` succeeded but returned no usable output")]
    UnusableOutput { command: String },

    #[error("invalid connection string: {0}")]
    InvalidConnectionString(String),

    #[error("failed to connect for {description}")]
    Connect {
        description: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("query failed: {description}")]
    Query {
        description: String,
        #[source]
        source: sqlx::Error,
    },
}
