//! Checks that run before any tmux state is touched.
//!
//! Hard failures come back as actionable error strings; soft problems are
//! returned as warnings and the run continues.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::tmux::tmux_version;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preflight {
    pub tmux_version: String,
    /// Absolute, existing workspace directory.
    pub workspace: PathBuf,
    pub warnings: Vec<String>,
}

pub async fn run_preflight(config: &Config) -> Result<Preflight, String> {
    let version = tmux_version().await.map_err(|err| {
        format!("tmux is required but `tmux -V` did not succeed ({err}). Install tmux and retry.")
    })?;
    let workspace = prepare_workspace(&config.session.workspace)?;
    Ok(Preflight {
        tmux_version: version,
        workspace,
        warnings: collect_warnings(config),
    })
}

/// Create the workspace if needed and return its absolute path.
pub fn prepare_workspace(path: &Path) -> Result<PathBuf, String> {
    std::fs::create_dir_all(path)
        .map_err(|err| format!("cannot create workspace `{}`: {err}", path.display()))?;
    path.canonicalize()
        .map_err(|err| format!("cannot resolve workspace `{}`: {err}", path.display()))
}

/// Absolute form of `path` without touching the filesystem.
pub fn absolute_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

pub fn collect_warnings(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();
    if let Some(helper) = config.delivery_helper() {
        if !helper.is_available() {
            warnings.push(format!(
                "delivery helper `{}` not found; atomic sends go through tmux directly",
                helper.path().display()
            ));
        }
    }
    if !config.session.prompts_dir.is_dir() {
        warnings.push(format!(
            "prompts directory `{}` not found; agents get a one-line role prompt",
            config.session.prompts_dir.display()
        ));
    }
    if let Some(probe) = config.readiness_probe() {
        if probe.timeout < probe.poll {
            warnings.push(format!(
                "readiness timeout ({}ms) is shorter than one poll interval ({}ms)",
                probe.timeout.as_millis(),
                probe.poll.as_millis()
            ));
        }
    }
    warnings
}
