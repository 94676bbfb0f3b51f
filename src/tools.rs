// src/tools.rs

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Failure modes of an external tool invocation. All of them are expected at
/// runtime (missing binaries, malformed PDFs) and are recovered by callers.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("{program} exited with {status}: {stderr}")]
    ExitStatus {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("{program} produced no output file")]
    MissingOutput { program: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run `command` to completion, killing it if it outlives `timeout`.
///
/// The child is spawned with `kill_on_drop`, so when the timeout elapses and
/// the output future is dropped the process is terminated rather than left
/// running in the background.
pub async fn run_with_timeout(
    program: &str,
    command: &mut Command,
    timeout: Duration,
) -> Result<Output, ToolError> {
    command.kill_on_drop(true);

    let output = match tokio::time::timeout(timeout, command.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(source)) => {
            return Err(ToolError::Spawn {
                program: program.to_string(),
                source,
            });
        }
        Err(_) => {
            return Err(ToolError::Timeout {
                program: program.to_string(),
                timeout,
            });
        }
    };

    if !output.status.success() {
        return Err(ToolError::ExitStatus {
            program: program.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output)
}
