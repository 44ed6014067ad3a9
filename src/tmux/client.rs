//! Production control port backed by the local `tmux` binary.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::TransportError;
use crate::types::{ControlKey, Pane, PaneTarget, Session};

use super::command::{
    build_capture_pane_command, build_has_session_command, build_kill_session_command,
    build_new_session_command, build_new_window_command, build_send_key_command,
    build_send_literal_command,
};
use super::process::{ensure_success, run_process, run_sh_process};
use super::TerminalControlPort;

/// tmux key names used for each logical control key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    pub submit: String,
    pub newline: String,
    pub clear_input: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            submit: "Enter".to_string(),
            newline: "C-j".to_string(),
            clear_input: "C-u".to_string(),
        }
    }
}

impl KeyBindings {
    pub fn key_name(&self, key: ControlKey) -> &str {
        match key {
            ControlKey::Submit => &self.submit,
            ControlKey::Newline => &self.newline,
            ControlKey::ClearInput => &self.clear_input,
        }
    }
}

/// Drives tmux through `sh -c` with fully quoted arguments.
#[derive(Debug, Clone, Default)]
pub struct TmuxClient {
    keys: KeyBindings,
    /// Start directory for the session's first window.
    root: Option<PathBuf>,
}

impl TmuxClient {
    pub fn new(keys: KeyBindings) -> Self {
        Self { keys, root: None }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    async fn run(&self, command: &str, context: &str) -> Result<String, TransportError> {
        debug!(command, "tmux");
        let output = run_sh_process(command).await?;
        ensure_success(output, context).map(|out| out.stdout)
    }
}

#[async_trait]
impl TerminalControlPort for TmuxClient {
    async fn create_session(&self, name: &str) -> Result<Session, TransportError> {
        let probe = run_sh_process(&build_has_session_command(name)).await?;
        if probe.exit_code == 0 {
            debug!(session = name, "replacing existing tmux session");
            self.run(
                &build_kill_session_command(name),
                "failed to kill existing tmux session",
            )
            .await?;
        }
        self.run(
            &build_new_session_command(name, self.root.as_deref()),
            "failed to create tmux session",
        )
        .await?;
        Ok(Session::new(name))
    }

    async fn create_pane(
        &self,
        session: &Session,
        index: usize,
        label: &str,
        working_directory: &Path,
    ) -> Result<Pane, TransportError> {
        let target = session.target(index);
        self.run(
            &build_new_window_command(&target.to_string(), label, working_directory),
            "failed to create tmux window",
        )
        .await?;
        Ok(Pane::new(target))
    }

    async fn send_literal(&self, pane: &PaneTarget, text: &str) -> Result<(), TransportError> {
        if text.is_empty() {
            return Ok(());
        }
        self.run(
            &build_send_literal_command(&pane.to_string(), text),
            "failed to send literal keys to tmux pane",
        )
        .await
        .map(|_| ())
    }

    async fn send_control_key(
        &self,
        pane: &PaneTarget,
        key: ControlKey,
    ) -> Result<(), TransportError> {
        self.run(
            &build_send_key_command(&pane.to_string(), self.keys.key_name(key)),
            "failed to send key to tmux pane",
        )
        .await
        .map(|_| ())
    }

    async fn capture(&self, pane: &PaneTarget) -> Result<String, TransportError> {
        self.run(
            &build_capture_pane_command(&pane.to_string()),
            "failed to capture tmux pane",
        )
        .await
    }
}

/// Report the installed tmux version (`tmux -V`).
pub async fn tmux_version() -> Result<String, TransportError> {
    let output = run_process("tmux", &["-V".to_string()]).await?;
    ensure_success(output, "tmux -V failed").map(|out| out.stdout.trim().to_string())
}

/// Attach the calling terminal to `session`, returning once the client detaches.
pub async fn attach_session(session: &str) -> Result<(), TransportError> {
    let status = tokio::process::Command::new("tmux")
        .args(["attach", "-t", session])
        .status()
        .await
        .map_err(|e| TransportError::Spawn {
            program: "tmux".to_string(),
            message: e.to_string(),
        })?;
    if status.success() {
        Ok(())
    } else {
        Err(TransportError::Command {
            context: format!("failed to attach to tmux session {session}"),
            details: format!("tmux exited with {status}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_key_bindings_map_each_control_key() {
        let keys = KeyBindings::default();
        assert_eq!(keys.key_name(ControlKey::Submit), "Enter");
        assert_eq!(keys.key_name(ControlKey::Newline), "C-j");
        assert_eq!(keys.key_name(ControlKey::ClearInput), "C-u");
    }

    #[test]
    fn custom_key_bindings_are_used_verbatim() {
        let keys = KeyBindings {
            submit: "C-m".to_string(),
            newline: "S-Enter".to_string(),
            clear_input: "Escape".to_string(),
        };
        assert_eq!(keys.key_name(ControlKey::Submit), "C-m");
        assert_eq!(keys.key_name(ControlKey::Newline), "S-Enter");
    }

    #[tokio::test]
    async fn empty_literal_is_a_no_op() {
        // No tmux server is needed: the call never reaches the binary.
        let client = TmuxClient::default();
        client
            .send_literal(&PaneTarget::new("panelaunch-unused", 0), "")
            .await
            .expect("empty literal");
    }
}
