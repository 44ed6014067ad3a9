//! Turning the agent roster into launch specs.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::{AgentEntry, Config};
use crate::error::ConfigError;
use crate::payload::{render_briefing, BriefingParams};
use crate::project::ProjectConfig;
use crate::types::LaunchSpec;

/// Where an agent's base prompt came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSource {
    Enhanced(PathBuf),
    Plain(PathBuf),
    /// No prompt file; a one-line role statement was used.
    Fallback,
}

impl fmt::Display for PromptSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enhanced(path) | Self::Plain(path) => write!(f, "{}", path.display()),
            Self::Fallback => f.write_str("built-in role line"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPane {
    pub spec: LaunchSpec,
    pub prompt: PromptSource,
}

/// Build one launch spec per roster entry, in roster order.
pub fn build_launch_specs(
    config: &Config,
    project: &ProjectConfig,
    workspace: &Path,
) -> Result<Vec<LaunchSpec>, ConfigError> {
    Ok(build_plan(config, project, workspace)?
        .into_iter()
        .map(|planned| planned.spec)
        .collect())
}

pub fn build_plan(
    config: &Config,
    project: &ProjectConfig,
    workspace: &Path,
) -> Result<Vec<PlannedPane>, ConfigError> {
    build_plan_with(config, project, workspace, |path| std::fs::read_to_string(path))
}

pub(crate) fn build_plan_with<FRead>(
    config: &Config,
    project: &ProjectConfig,
    workspace: &Path,
    read_file: FRead,
) -> Result<Vec<PlannedPane>, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
{
    let standards = read_optional(&config.session.standards_path(), &read_file)?.unwrap_or_default();
    config
        .agents
        .iter()
        .enumerate()
        .map(|(index, agent)| -> Result<PlannedPane, ConfigError> {
            let (base_prompt, prompt) = resolve_prompt(&config.session.prompts_dir, agent, &read_file)?;
            let payload = render_briefing(BriefingParams {
                base_prompt: &base_prompt,
                standards: &standards,
                project,
            });
            Ok(PlannedPane {
                spec: LaunchSpec::new(
                    index,
                    agent.label.as_str(),
                    workspace,
                    config.session.program.as_str(),
                    payload,
                ),
                prompt,
            })
        })
        .collect()
}

/// `enhanced_prompt_<key>.md`, then `prompt_<key>.md`, then a role line.
pub fn resolve_prompt<FRead>(
    prompts_dir: &Path,
    agent: &AgentEntry,
    read_file: &FRead,
) -> Result<(String, PromptSource), ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
{
    let key = agent.prompt_key();
    let enhanced = prompts_dir.join(format!("enhanced_prompt_{key}.md"));
    if let Some(text) = read_optional(&enhanced, read_file)? {
        return Ok((text, PromptSource::Enhanced(enhanced)));
    }
    let plain = prompts_dir.join(format!("prompt_{key}.md"));
    if let Some(text) = read_optional(&plain, read_file)? {
        return Ok((text, PromptSource::Plain(plain)));
    }
    Ok((
        format!("You are the {} agent.", agent.title),
        PromptSource::Fallback,
    ))
}

/// Missing files are `None`; any other read failure is an error.
fn read_optional<FRead>(path: &Path, read_file: &FRead) -> Result<Option<String>, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
{
    match read_file(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ConfigError::Invalid(format!(
            "failed to read {}: {e}",
            path.display()
        ))),
    }
}
