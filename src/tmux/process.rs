//! Process and shell execution helpers shared by the tmux adapters.

use crate::error::TransportError;
use std::process::Stdio;
use tokio::process::Command;

/// Captured result of one finished child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExecOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Run a local shell command.
pub(crate) async fn run_sh_process(command: &str) -> Result<ExecOutput, TransportError> {
    run_process("sh", &["-c".into(), command.into()]).await
}

/// Spawn and wait for a process.
pub(crate) async fn run_process(
    program: &str,
    args: &[String],
) -> Result<ExecOutput, TransportError> {
    let mut cmd = Command::new(program);
    // An interrupted run drops in-flight futures; take the child down with it.
    cmd.kill_on_drop(true);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let child = cmd.spawn().map_err(|e| TransportError::Spawn {
        program: program.to_string(),
        message: e.to_string(),
    })?;

    let output = child
        .wait_with_output()
        .await
        .map_err(|e| TransportError::Spawn {
            program: program.to_string(),
            message: e.to_string(),
        })?;

    Ok(ExecOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

/// Convert non-zero command status into contextual transport errors.
pub(crate) fn ensure_success(
    output: ExecOutput,
    context: impl Into<String>,
) -> Result<ExecOutput, TransportError> {
    if output.exit_code == 0 {
        return Ok(output);
    }

    let mut details = if output.stderr.trim().is_empty() {
        output.stdout.trim().to_string()
    } else {
        output.stderr.trim().to_string()
    };
    if details.is_empty() {
        details = format!("command exited with {}", output.exit_code);
    }

    Err(TransportError::Command {
        context: context.into(),
        details,
    })
}

/// Shell-safe single-quote escaping.
pub(crate) fn shell_quote(s: &str) -> String {
    if s.is_empty() {
        "''".into()
    } else {
        format!("'{}'", s.replace('\'', "'\\''"))
    }
}
