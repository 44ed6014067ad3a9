//! Environment overrides for the `[session]` section.

use std::path::PathBuf;

use super::Config;

pub(super) const ENV_SESSION: &str = "PANELAUNCH_SESSION";
pub(super) const ENV_PROGRAM: &str = "PANELAUNCH_PROGRAM";
pub(super) const ENV_WORKSPACE: &str = "PANELAUNCH_WORKSPACE";

/// Apply `PANELAUNCH_*` variables on top of file values. Blank values are
/// ignored.
pub(super) fn apply_env_overrides<FEnv>(config: &mut Config, env_lookup: &FEnv)
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(name) = non_blank(env_lookup, ENV_SESSION) {
        config.session.name = name;
    }
    if let Some(program) = non_blank(env_lookup, ENV_PROGRAM) {
        config.session.program = program;
    }
    if let Some(workspace) = non_blank(env_lookup, ENV_WORKSPACE) {
        config.session.workspace = PathBuf::from(workspace);
    }
}

fn non_blank<FEnv>(env_lookup: &FEnv, name: &str) -> Option<String>
where
    FEnv: Fn(&str) -> Option<String>,
{
    env_lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
