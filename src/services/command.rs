use std::ffi::OsStr;
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command;

/// External tool execution errors
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {timeout_secs} seconds")]
    TimedOut { program: String, timeout_secs: u64 },

    #[error("{program} exited with status {code:?}: {stderr}")]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Runs `program` to completion and returns its stdout.
///
/// The child is killed if the deadline expires or if the returned future is
/// dropped before it finishes (e.g. the client went away).
pub async fn run_tool<I, S>(program: &str, args: I, timeout: Duration) -> Result<Vec<u8>, ToolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    tracing::debug!(command = ?cmd.as_std(), "Running external tool");
    let start = Instant::now();

    let output = match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(result) => result.map_err(|source| ToolError::Spawn {
            program: program.to_string(),
            source,
        })?,
        Err(_) => {
            tracing::warn!(program, timeout_secs = timeout.as_secs(), "External tool timed out, killed");
            return Err(ToolError::TimedOut {
                program: program.to_string(),
                timeout_secs: timeout.as_secs(),
            });
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        tracing::error!(
            program,
            code = ?output.status.code(),
            stderr = %stderr,
            "External tool failed"
        );
        return Err(ToolError::Failed {
            program: program.to_string(),
            code: output.status.code(),
            stderr,
        });
    }

    tracing::debug!(
        program,
        duration_ms = start.elapsed().as_millis() as u64,
        stdout_bytes = output.stdout.len(),
        "External tool finished"
    );

    Ok(output.stdout)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout() {
        let out = run_tool("sh", ["-c", "printf hello"], Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(out, b"hello");
    }

    #[tokio::test]
    async fn non_zero_exit_is_an_error() {
        let err = run_tool("sh", ["-c", "echo boom >&2; exit 3"], Duration::from_secs(5))
            .await
            .unwrap_err();
        match err {
            ToolError::Failed { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn deadline_kills_the_child() {
        let start = Instant::now();
        let err = run_tool("sleep", ["10"], Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::TimedOut { .. }));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn missing_program_fails_to_spawn() {
        let err = run_tool("definitely-not-a-real-tool-7f3a", ["-h"], Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }));
    }
}
