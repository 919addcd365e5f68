//
//  tf-collect
//  stages/process.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! External tool invocation.
//!
//! Every `git` and `terraform` call goes through [`run_tool`], which captures
//! output, enforces a timeout (the child is killed when it expires), and at
//! DEBUG level echoes the shell-quoted command line and its exit code.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use super::StageError;

/// Timeout for `--version` probes.
pub const PREFLIGHT_TIMEOUT: Duration = Duration::from_secs(10);

/// Captured output of a successful invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: Vec<u8>,
    pub stderr: String,
}

impl ToolOutput {
    /// Stdout decoded lossily.
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

/// Runs `program args...` in `cwd` and waits for it.
///
/// # Parameters
///
/// * `program` - Executable name or path
/// * `args` - Arguments, passed verbatim
/// * `cwd` - Working directory (`None` for the current one)
/// * `timeout` - Upper bound on the run; the child is killed when exceeded
///
/// # Errors
///
/// - [`StageError::Spawn`] when the program cannot be started
/// - [`StageError::Timeout`] when it runs too long
/// - [`StageError::ToolFailed`] on a non-zero exit, carrying stderr (or
///   stdout when stderr is empty)
pub async fn run_tool(
    program: &str,
    args: &[&str],
    cwd: Option<&Path>,
    timeout: Duration,
) -> Result<ToolOutput, StageError> {
    let command = shell_words::join(std::iter::once(program).chain(args.iter().copied()));
    debug!(
        command = %command,
        cwd = %cwd.map_or_else(|| ".".to_string(), |p| p.display().to_string()),
        "running"
    );

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let child = cmd.spawn().map_err(|source| StageError::Spawn {
        program: program.to_string(),
        source,
    })?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(|source| StageError::Spawn {
            program: program.to_string(),
            source,
        })?,
        Err(_) => {
            debug!(command = %command, "timed out");
            return Err(StageError::Timeout { command, timeout });
        }
    };

    let code = output.status.code();
    debug!(command = %command, exit_code = ?code, "finished");

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !output.status.success() {
        let stderr = if stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr
        };
        return Err(StageError::ToolFailed {
            command,
            code,
            stderr,
        });
    }

    Ok(ToolOutput {
        stdout: output.stdout,
        stderr,
    })
}

/// Checks that `program --version` runs, returning the first line it prints.
pub async fn ensure_tool(program: &str) -> Result<String, StageError> {
    let output = run_tool(program, &["--version"], None, PREFLIGHT_TIMEOUT).await?;
    let version = output
        .stdout_text()
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();
    debug!(program, version = %version, "tool available");
    Ok(version)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::stages::testing::{fake_tool, tools_dir};

    #[tokio::test]
    async fn test_captures_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(&tools_dir(dir.path()), "echoer", r#"echo "args: $*""#);

        let output = run_tool(&tool, &["a b", "c"], None, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(output.stdout_text().trim(), "args: a b c");
    }

    #[tokio::test]
    async fn test_runs_in_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(&tools_dir(dir.path()), "where", "pwd");
        let work = dir.path().join("work");
        std::fs::create_dir_all(&work).unwrap();

        let output = run_tool(&tool, &[], Some(&work), Duration::from_secs(5))
            .await
            .unwrap();
        let reported = std::path::PathBuf::from(output.stdout_text().trim());
        assert_eq!(
            reported.canonicalize().unwrap(),
            work.canonicalize().unwrap()
        );
    }

    #[tokio::test]
    async fn test_non_zero_exit_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(
            &tools_dir(dir.path()),
            "broken",
            "echo 'fatal: no such remote' >&2\nexit 3",
        );

        match run_tool(&tool, &["fetch"], None, Duration::from_secs(5)).await {
            Err(StageError::ToolFailed { code, stderr, command }) => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "fatal: no such remote");
                assert!(command.ends_with("broken fetch"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_kills_tool() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(&tools_dir(dir.path()), "sleepy", "sleep 5");

        let err = run_tool(&tool, &[], None, Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let err = ensure_tool("/nonexistent/tool-that-does-not-exist")
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_ensure_tool_reports_version() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(
            &tools_dir(dir.path()),
            "terraform",
            "echo 'Terraform v1.9.5'\necho 'on linux_amd64'",
        );
        assert_eq!(ensure_tool(&tool).await.unwrap(), "Terraform v1.9.5");
    }
}
