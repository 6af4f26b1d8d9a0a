//! External tool execution.
//!
//! Every analyzer, patcher, and test runner shells out through
//! [`CommandRunner`]: combined stdout+stderr capture, a hard timeout, and
//! the child killed when the timeout fires.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};

/// Captured result of one tool invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code, when the process exited normally
    pub status: Option<i32>,
    /// Interleaved stdout then stderr
    pub output: String,
    pub timed_out: bool,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        !self.timed_out && self.status == Some(0)
    }
}

#[derive(Debug, Clone)]
pub struct CommandRunner {
    timeout: Duration,
}

impl CommandRunner {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Whether `program` resolves on PATH.
    pub fn available(program: &str) -> bool {
        if program.contains('/') {
            return Path::new(program).is_file();
        }
        let Some(path) = std::env::var_os("PATH") else {
            return false;
        };
        std::env::split_paths(&path).any(|dir| dir.join(program).is_file())
    }

    /// Run a tool and capture its combined output.
    pub async fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: &Path,
    ) -> DomainResult<CommandOutput> {
        self.run_inner(program, args, cwd, None).await
    }

    /// Run a tool, feeding `stdin_data` to its standard input.
    pub async fn run_with_stdin(
        &self,
        program: &str,
        args: &[&str],
        cwd: &Path,
        stdin_data: &str,
    ) -> DomainResult<CommandOutput> {
        self.run_inner(program, args, cwd, Some(stdin_data)).await
    }

    async fn run_inner(
        &self,
        program: &str,
        args: &[&str],
        cwd: &Path,
        stdin_data: Option<&str>,
    ) -> DomainResult<CommandOutput> {
        debug!(program, ?args, cwd = %cwd.display(), "Running tool");

        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(cwd)
            .stdin(if stdin_data.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            DomainError::WorkspaceError(format!("failed to spawn '{program}': {e}"))
        })?;

        if let Some(data) = stdin_data {
            if let Some(mut stdin) = child.stdin.take() {
                stdin
                    .write_all(data.as_bytes())
                    .await
                    .map_err(|e| DomainError::WorkspaceError(format!("stdin write failed: {e}")))?;
                // Closing stdin lets the child see EOF.
                drop(stdin);
            }
        }

        // kill_on_drop reaps the child when the timeout branch drops it.
        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(out)) => {
                let mut text = String::from_utf8_lossy(&out.stdout).into_owned();
                let stderr = String::from_utf8_lossy(&out.stderr);
                if !stderr.is_empty() {
                    if !text.is_empty() && !text.ends_with('\n') {
                        text.push('\n');
                    }
                    text.push_str(&stderr);
                }
                Ok(CommandOutput {
                    status: out.status.code(),
                    output: text,
                    timed_out: false,
                })
            }
            Ok(Err(e)) => Err(DomainError::WorkspaceError(format!(
                "'{program}' did not finish: {e}"
            ))),
            Err(_) => Ok(CommandOutput {
                status: None,
                output: format!(
                    "'{program}' timed out after {} seconds",
                    self.timeout.as_secs()
                ),
                timed_out: true,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_and_exit_code() {
        let runner = CommandRunner::new(10);
        let out = runner
            .run("sh", &["-c", "echo hello"], Path::new("."))
            .await
            .unwrap();
        assert!(out.success());
        assert_eq!(out.output.trim(), "hello");
    }

    #[tokio::test]
    async fn combines_stderr_after_stdout() {
        let runner = CommandRunner::new(10);
        let out = runner
            .run("sh", &["-c", "echo out; echo err >&2; exit 3"], Path::new("."))
            .await
            .unwrap();
        assert!(!out.success());
        assert_eq!(out.status, Some(3));
        assert!(out.output.contains("out"));
        assert!(out.output.contains("err"));
    }

    #[tokio::test]
    async fn timeout_kills_and_reports() {
        let runner = CommandRunner::new(1);
        let out = runner
            .run("sh", &["-c", "sleep 30"], Path::new("."))
            .await
            .unwrap();
        assert!(out.timed_out);
        assert!(!out.success());
        assert!(out.output.contains("timed out"));
    }

    #[tokio::test]
    async fn stdin_is_forwarded() {
        let runner = CommandRunner::new(10);
        let out = runner
            .run_with_stdin("sh", &["-c", "cat"], Path::new("."), "piped body\n")
            .await
            .unwrap();
        assert_eq!(out.output, "piped body\n");
    }

    #[tokio::test]
    async fn missing_program_is_an_error() {
        let runner = CommandRunner::new(1);
        let err = runner
            .run("definitely-not-a-real-tool", &[], Path::new("."))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::WorkspaceError(_)));
    }

    #[test]
    fn availability_check() {
        assert!(CommandRunner::available("sh"));
        assert!(!CommandRunner::available("definitely-not-a-real-tool"));
    }
}
