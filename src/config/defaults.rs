//! Default configuration constants and the bundled agent roster.

use std::path::PathBuf;

use super::AgentEntry;

/// Embedded default `panelaunch.toml` written by `panelaunch init`.
pub(super) const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../templates/panelaunch.toml");
/// File name looked up locally and under the global config directory.
pub(super) const CONFIG_FILE_NAME: &str = "panelaunch.toml";
pub(super) const CONFIG_DIR_NAME: &str = "panelaunch";

pub(super) const DEFAULT_SESSION_NAME: &str = "api_builder";
pub(super) const DEFAULT_PROGRAM: &str = "claude";
pub(super) const DEFAULT_STANDARDS_FILE: &str = "AGENT_STANDARDS.md";

pub(super) const DEFAULT_DIRECTORY_SETTLE_MS: u64 = 200;
pub(super) const DEFAULT_CLEAR_SETTLE_MS: u64 = 200;
pub(super) const DEFAULT_STARTUP_SETTLE_MS: u64 = 1500;
pub(super) const DEFAULT_POST_DELIVERY_SETTLE_MS: u64 = 500;
pub(super) const DEFAULT_LAUNCH_GAP_MS: u64 = 1000;
pub(super) const DEFAULT_STAGGER_MS: u64 = 500;

pub(super) const DEFAULT_READINESS_POLL_MS: u64 = 250;
pub(super) const DEFAULT_READINESS_TIMEOUT_MS: u64 = 15_000;

pub(super) const DEFAULT_SUBMIT_SETTLE_MS: u64 = 500;

pub(super) fn default_workspace() -> PathBuf {
    PathBuf::from("workspace")
}

pub(super) fn default_prompts_dir() -> PathBuf {
    PathBuf::from("prompts")
}

/// The nine-agent API builder team, in window order.
pub(super) fn default_roster() -> Vec<AgentEntry> {
    [
        ("orchestrator", "Orchestrator"),
        ("lead", "Lead Developer"),
        ("fastapi", "FastAPI Developer"),
        ("mcp", "MCP Server Developer"),
        ("make", "Make Command Builder"),
        ("docs", "Documentation Developer"),
        ("tester", "E2E Tester"),
        ("jupyter", "Jupyter Developer"),
        ("devops", "DevOps Engineer"),
    ]
    .into_iter()
    .map(|(label, title)| AgentEntry {
        label: label.to_string(),
        title: title.to_string(),
        prompt: None,
    })
    .collect()
}
