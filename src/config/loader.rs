//! Top-level config loading pipeline.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::env::apply_env_overrides;
use super::init::config_root_dir;
use super::sources::{read_config_text_with_sources, ConfigSource};
use super::Config;

/// A validated configuration and the source it was read from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: ConfigSource,
}

/// Load configuration from disk and environment.
///
/// `path_override` is an explicit config file path (from `--config`).
pub fn load_config(path_override: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    load_config_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        config_root_dir,
    )
}

pub(super) fn load_config_from_sources<FRead, FEnv, FRoot>(
    path_override: Option<&Path>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<LoadedConfig, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let (text, source) = read_config_text_with_sources(path_override, &read_file, &config_root)?;
    let mut config: Config = toml::from_str(&text)?;
    apply_env_overrides(&mut config, &env_lookup);
    validate(&config)?;
    Ok(LoadedConfig { config, source })
}

/// Reject configurations the launcher cannot run.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.session.name.trim().is_empty() {
        return Err(invalid("session.name must not be empty"));
    }
    if config.session.program.trim().is_empty() {
        return Err(invalid("session.program must not be empty"));
    }
    if config.delivery.strategies.is_empty() {
        return Err(invalid("delivery.strategies must list at least one strategy"));
    }
    if config.delivery.chunk_lines == 0 {
        return Err(invalid("delivery.chunk_lines must be at least 1"));
    }
    if config.schedule.max_active == 0 {
        return Err(invalid("schedule.max_active must be at least 1"));
    }
    if config.agents.is_empty() {
        return Err(invalid("at least one [[agents]] entry is required"));
    }
    let mut seen = BTreeSet::new();
    for agent in &config.agents {
        if agent.label.trim().is_empty() {
            return Err(invalid("agent labels must not be empty"));
        }
        if !seen.insert(agent.label.as_str()) {
            return Err(invalid(&format!("duplicate agent label `{}`", agent.label)));
        }
    }
    Ok(())
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_string())
}
