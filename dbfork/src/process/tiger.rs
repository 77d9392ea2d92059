//! Invocation of the external database-service CLI.

use std::future::Future;

use tracing::{info, warn};

use super::spawn::{spawn_process, ProcessOptions};
use crate::config::DEFAULT_CLI;
use crate::db::redact_passwords;
use crate::error::CliError;

/// Captured output of a successful CLI call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// stdout followed by stderr, for parsers that don't care which stream
    /// a line arrived on.
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
        }
    }
}

/// Something that can run CLI subcommands.
///
/// Implemented by [`SystemCli`] for real runs and by scripted fakes in tests.
pub trait TigerCli: Sync {
    /// Run `<cli> <args...>`; any unsuccessful exit is an error.
    fn run(&self, args: &[&str]) -> impl Future<Output = Result<CommandOutput, CliError>> + Send;

    /// The command as configured, for messages that tell the user what to type.
    fn command(&self) -> &str;
}

/// Runs the CLI as a child process.
#[derive(Debug, Clone)]
pub struct SystemCli {
    command: String,
    program: String,
    leading_args: Vec<String>,
}

impl SystemCli {
    /// `command` may carry leading arguments, e.g. `npx tiger`.
    pub fn new(command: &str) -> Self {
        let mut parts = command.split_whitespace().map(String::from);
        let program = parts.next().unwrap_or_else(|| DEFAULT_CLI.to_string());
        let leading_args: Vec<String> = parts.collect();
        Self {
            command: command.trim().to_string(),
            program,
            leading_args,
        }
    }
}

impl TigerCli for SystemCli {
    async fn run(&self, args: &[&str]) -> Result<CommandOutput, CliError> {
        let options = ProcessOptions::new(&self.program)
            .args(self.leading_args.iter().cloned())
            .args(args.iter().copied());
        let command = options.command_line();
        info!("$ {command}");

        let result = spawn_process(options).await?;

        for line in &result.stdout {
            info!("  {}", redact_passwords(line));
        }
        for line in &result.stderr {
            warn!("  {}", redact_passwords(line));
        }

        if !result.success() {
            return Err(CliError::Failed {
                command,
                code: result.code(),
                stderr: result.stderr_string(),
                stdout: result.stdout_string(),
            });
        }

        Ok(CommandOutput {
            stdout: result.stdout_string(),
            stderr: result.stderr_string(),
        })
    }

    fn command(&self) -> &str {
        &self.command
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write_script(dir: &Path, body: &str) -> String {
        let path = dir.join("fake-tiger.sh");
        std::fs::write(&path, body).unwrap();
        format!("sh {}", path.display())
    }

    #[test]
    fn test_splits_leading_args() {
        let cli = SystemCli::new("  npx tiger ");
        assert_eq!(cli.program, "npx");
        assert_eq!(cli.leading_args, vec!["tiger"]);
        assert_eq!(cli.command(), "npx tiger");

        let blank = SystemCli::new("");
        assert_eq!(blank.program, "tiger");
        assert!(blank.leading_args.is_empty());
    }

    #[tokio::test]
    async fn test_passes_arguments_after_leading_args() {
        let dir = tempfile::tempdir().unwrap();
        let command = write_script(dir.path(), "echo \"args: $*\"\n");
        let cli = SystemCli::new(&command);

        let output = cli.run(&["service", "delete", "abc", "--confirm"]).await.unwrap();
        assert_eq!(output.stdout, "args: service delete abc --confirm");
        assert!(output.stderr.is_empty());
    }

    #[tokio::test]
    async fn test_nonzero_exit_surfaces_output() {
        let dir = tempfile::tempdir().unwrap();
        let command = write_script(dir.path(), "echo partial\necho 'no such service' >&2\nexit 3\n");
        let cli = SystemCli::new(&command);

        let err = cli.run(&["service", "fork", "svc1"]).await.unwrap_err();
        match err {
            CliError::Failed {
                command,
                code,
                stderr,
                stdout,
            } => {
                assert!(command.ends_with("service fork svc1"));
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "no such service");
                assert_eq!(stdout, "partial");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let cli = SystemCli::new("definitely-not-a-real-cli-98765");
        let err = cli.run(&["config", "show"]).await.unwrap_err();
        assert!(matches!(err, CliError::Spawn { .. }));
    }

    #[test]
    fn test_combined_output() {
        let both = CommandOutput {
            stdout: "out".to_string(),
            stderr: "err".to_string(),
        };
        assert_eq!(both.combined(), "out\nerr");

        let only_err = CommandOutput {
            stdout: String::new(),
            stderr: "err".to_string(),
        };
        assert_eq!(only_err.combined(), "err");
    }
}
