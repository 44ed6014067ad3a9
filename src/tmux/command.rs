//! Builders for the tmux shell commands issued by `TmuxClient`.
//!
//! Every argument goes through `shell_quote`, so the strings here can be
//! handed to `sh -c` verbatim.

use std::path::Path;

use super::process::shell_quote;

/// Exact-match session selector; a bare name would also prefix-match.
fn exact_session(session: &str) -> String {
    shell_quote(&format!("={session}"))
}

pub(crate) fn build_has_session_command(session: &str) -> String {
    format!("tmux has-session -t {}", exact_session(session))
}

pub(crate) fn build_kill_session_command(session: &str) -> String {
    format!("tmux kill-session -t {}", exact_session(session))
}

pub(crate) fn build_new_session_command(session: &str, directory: Option<&Path>) -> String {
    let mut cmd = format!("tmux new-session -d -s {}", shell_quote(session));
    if let Some(dir) = directory {
        cmd.push_str(" -c ");
        cmd.push_str(&shell_quote(&dir.display().to_string()));
    }
    cmd
}

/// Create (or replace, via `-k`) the window at `target`.
pub(crate) fn build_new_window_command(target: &str, label: &str, directory: &Path) -> String {
    format!(
        "tmux new-window -d -k -t {} -n {} -c {}",
        shell_quote(target),
        shell_quote(label),
        shell_quote(&directory.display().to_string())
    )
}

/// Literal send; `--` stops option parsing so leading dashes stay text.
pub(crate) fn build_send_literal_command(target: &str, text: &str) -> String {
    format!(
        "tmux send-keys -l -t {} -- {}",
        shell_quote(target),
        shell_quote(text)
    )
}

pub(crate) fn build_send_key_command(target: &str, key_name: &str) -> String {
    format!(
        "tmux send-keys -t {} {}",
        shell_quote(target),
        shell_quote(key_name)
    )
}

pub(crate) fn build_capture_pane_command(target: &str) -> String {
    format!("tmux capture-pane -p -J -t {}", shell_quote(target))
}
