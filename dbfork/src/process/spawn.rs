//! Async process spawning with captured output.
//!
//! stdout and stderr are read line by line on separate tasks and funneled
//! through one channel, so neither pipe can fill up and stall the child.

use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::error::CliError;

/// Output line from a spawned process.
#[derive(Debug, Clone)]
enum ProcessOutput {
    Stdout(String),
    Stderr(String),
}

/// What to run.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// The program to execute.
    pub program: String,

    /// Arguments to pass to the program.
    pub args: Vec<String>,
}

impl ProcessOptions {
    /// Create new options for the given program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add an argument.
    #[cfg(test)]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The command as it would be typed in a shell, for logs and errors.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result from a completed process.
#[derive(Debug)]
pub struct ProcessResult {
    /// Exit status of the process.
    pub status: ExitStatus,

    /// All stdout lines collected.
    pub stdout: Vec<String>,

    /// All stderr lines collected.
    pub stderr: Vec<String>,
}

impl ProcessResult {
    /// Check if the process exited successfully.
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Get stdout as a single string.
    pub fn stdout_string(&self) -> String {
        self.stdout.join("\n")
    }

    /// Get stderr as a single string.
    pub fn stderr_string(&self) -> String {
        self.stderr.join("\n")
    }

    /// Get the exit code, if available.
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }
}

/// Spawn a process, wait for it and collect all output.
///
/// A non-zero exit is not an error here; callers decide what it means.
pub async fn spawn_process(options: ProcessOptions) -> Result<ProcessResult, CliError> {
    let spawn_error = |source| CliError::Spawn {
        command: options.command_line(),
        source,
    };

    let mut child = Command::new(&options.program)
        .args(&options.args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(Stdio::null())
        .spawn()
        .map_err(spawn_error)?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (tx, mut rx) = mpsc::channel::<ProcessOutput>(1000);

    if let Some(stdout) = stdout {
        tokio::spawn(forward_lines(stdout, tx.clone(), ProcessOutput::Stdout));
    }

    if let Some(stderr) = stderr {
        tokio::spawn(forward_lines(stderr, tx.clone(), ProcessOutput::Stderr));
    }

    // Drop the original sender so the channel closes when readers finish
    drop(tx);

    let mut stdout_lines = Vec::new();
    let mut stderr_lines = Vec::new();
    while let Some(output) = rx.recv().await {
        match output {
            ProcessOutput::Stdout(line) => stdout_lines.push(line),
            ProcessOutput::Stderr(line) => stderr_lines.push(line),
        }
    }

    let status = child.wait().await.map_err(spawn_error)?;

    Ok(ProcessResult {
        status,
        stdout: stdout_lines,
        stderr: stderr_lines,
    })
}

/// Send each line of `pipe` to `tx` until EOF.
///
/// Lines are decoded lossily so invalid UTF-8 never ends the read early.
async fn forward_lines<R>(
    pipe: R,
    tx: mpsc::Sender<ProcessOutput>,
    wrap: fn(String) -> ProcessOutput,
) where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']).to_string();
                if tx.send(wrap(line)).await.is_err() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawn_echo() {
        let result = spawn_process(ProcessOptions::new("echo").arg("hello world"))
            .await
            .unwrap();

        assert!(result.success());
        assert_eq!(result.stdout, vec!["hello world"]);
        assert!(result.stderr.is_empty());
    }

    #[tokio::test]
    async fn test_spawn_nonexistent() {
        let result = spawn_process(ProcessOptions::new("nonexistent_command_12345")).await;
        assert!(matches!(result, Err(CliError::Spawn { .. })));
    }

    #[tokio::test]
    async fn test_spawn_stderr() {
        let result = spawn_process(ProcessOptions::new("sh").arg("-c").arg("echo error >&2"))
            .await
            .unwrap();

        assert!(result.success());
        assert!(result.stdout.is_empty());
        assert_eq!(result.stderr_string(), "error");
    }

    #[tokio::test]
    async fn test_exit_code() {
        let result = spawn_process(ProcessOptions::new("sh").arg("-c").arg("echo out; exit 42"))
            .await
            .unwrap();

        assert!(!result.success());
        assert_eq!(result.code(), Some(42));
        assert_eq!(result.stdout_string(), "out");
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_keeps_reading() {
        let script = r"printf 'progress \377\n| Service ID | abc123 |\nNew Service ID: abc123\n'";
        let result = spawn_process(ProcessOptions::new("sh").arg("-c").arg(script))
            .await
            .unwrap();

        assert!(result.success());
        assert_eq!(result.stdout.len(), 3);
        assert_eq!(result.stdout[0], "progress \u{FFFD}");
        assert_eq!(result.stdout[1], "| Service ID | abc123 |");
        assert_eq!(result.stdout[2], "New Service ID: abc123");
    }

    #[tokio::test]
    async fn test_crlf_and_unterminated_lines() {
        let result = spawn_process(ProcessOptions::new("sh").arg("-c").arg(r"printf 'one\r\ntwo'"))
            .await
            .unwrap();

        assert_eq!(result.stdout, vec!["one", "two"]);
    }

    #[test]
    fn test_command_line() {
        let options = ProcessOptions::new("tiger").args(["service", "delete", "abc", "--confirm"]);
        assert_eq!(options.command_line(), "tiger service delete abc --confirm");
    }
}
