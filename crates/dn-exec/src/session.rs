//! Persistent interpreter session.
//!
//! One session owns one guest-language process for the lifetime of a run.
//! The process runs an embedded driver that holds a single shared
//! namespace and serves JSON-line requests, so consecutive blocks see
//! each other's variables. The child is spawned with kill-on-drop: a run
//! abandoned mid-block never leaves an orphan process behind.

use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::error::{ExecError, ExecResult};

/// The Python driver served to the interpreter via `-c`.
const DRIVER: &str = include_str!("driver.py");

/// Outcome of executing one source payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecOutcome {
    #[serde(rename = "id")]
    request_id: u64,
    pub ok: bool,
    #[serde(default)]
    pub stdout: String,
    /// repr() of the payload's value, when it was a bare expression.
    #[serde(default)]
    pub result: Option<String>,
    /// Traceback text on failure.
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub duration_ms: f64,
}

/// A running interpreter process with a shared namespace.
pub struct KernelSession {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    next_id: u64,
}

impl KernelSession {
    /// Spawn the interpreter and its driver in the given working
    /// directory.
    pub async fn start(interpreter: &Path, working_dir: &Path) -> ExecResult<Self> {
        log::debug!(
            "starting interpreter session: {} (cwd {})",
            interpreter.display(),
            working_dir.display()
        );
        let mut child = Command::new(interpreter)
            .arg("-u")
            .arg("-c")
            .arg(DRIVER)
            .current_dir(working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExecError::ProcessFailure {
                message: format!("could not start '{}': {}", interpreter.display(), e),
            })?;

        let stdin = child.stdin.take().ok_or_else(|| ExecError::ProcessFailure {
            message: "interpreter stdin unavailable".to_string(),
        })?;
        let stdout = child
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or_else(|| ExecError::ProcessFailure {
                message: "interpreter stdout unavailable".to_string(),
            })?;

        Ok(Self {
            child,
            stdin,
            stdout,
            next_id: 1,
        })
    }

    /// Execute one source payload in the shared namespace.
    pub async fn execute(&mut self, code: &str) -> ExecResult<ExecOutcome> {
        let request_id = self.next_id;
        self.next_id += 1;

        let request = serde_json::json!({ "id": request_id, "code": code });
        let mut line = serde_json::to_string(&request)?;
        line.push('\n');
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;

        let mut response = String::new();
        let read = self.stdout.read_line(&mut response).await?;
        if read == 0 {
            return Err(ExecError::ProcessFailure {
                message: "interpreter exited unexpectedly".to_string(),
            });
        }

        let outcome: ExecOutcome =
            serde_json::from_str(response.trim()).map_err(|e| ExecError::Protocol {
                message: format!("malformed driver response: {}", e),
            })?;
        if outcome.request_id != request_id {
            return Err(ExecError::Protocol {
                message: format!(
                    "response id {} does not match request id {}",
                    outcome.request_id, request_id
                ),
            });
        }
        Ok(outcome)
    }

    /// Shut the interpreter down, waiting briefly before killing it.
    pub async fn shutdown(mut self) -> ExecResult<()> {
        let farewell = "{\"op\": \"shutdown\"}\n";
        // The driver may already be gone; a write failure just means we
        // fall through to kill
        let _ = self.stdin.write_all(farewell.as_bytes()).await;
        let _ = self.stdin.flush().await;

        match tokio::time::timeout(std::time::Duration::from_secs(5), self.child.wait()).await {
            Ok(Ok(status)) => {
                log::debug!("interpreter exited with {}", status);
                Ok(())
            }
            Ok(Err(e)) => Err(ExecError::Io(e)),
            Err(_) => {
                log::warn!("interpreter did not exit, killing it");
                self.child.kill().await?;
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for KernelSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KernelSession")
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

/// Check that the interpreter starts at all.
pub fn interpreter_available(interpreter: &Path) -> bool {
    std::process::Command::new(interpreter)
        .arg("--version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
