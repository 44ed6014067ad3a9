//! Project description record shared by every agent briefing.
//!
//! The record is stored as pretty-printed JSON (`project_config.json`) and
//! is never mutated in place: `with_context` returns a new value.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// File name used when the record is saved next to the workspace.
pub const PROJECT_FILE_NAME: &str = "project_config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub description: String,
    pub api_type: String,
    pub database: String,
    pub authentication: String,
    pub features: Vec<String>,
    pub mcp_tools: Vec<String>,
    /// Percentage; older records store it as a string.
    #[serde(deserialize_with = "percent_from_number_or_string")]
    pub test_coverage_target: u32,
    pub test_types: Vec<String>,
    pub context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_repo: Option<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "my-api".to_string(),
            description: String::new(),
            api_type: "REST".to_string(),
            database: "PostgreSQL".to_string(),
            authentication: "JWT".to_string(),
            features: Vec::new(),
            mcp_tools: Vec::new(),
            test_coverage_target: 80,
            test_types: vec!["unit".into(), "integration".into(), "e2e".into()],
            context: String::new(),
            github_repo: None,
        }
    }
}

impl ProjectConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write the record as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Summary block describing the project to an agent.
    pub fn context_block(&self) -> String {
        [
            format!("Project: {}", self.name),
            format!("Description: {}", self.description),
            format!("API Type: {}", self.api_type),
            format!("Database: {}", self.database),
            format!("Authentication: {}", self.authentication),
            format!("Features: {}", self.features.join(", ")),
            format!("MCP Tools: {}", self.mcp_tools.join(", ")),
            format!("Test Coverage Target: {}%", self.test_coverage_target),
        ]
        .join("\n")
    }

    /// Copy of this record whose `context` is filled from the other fields
    /// when it is blank.
    pub fn with_context(&self) -> Self {
        let mut next = self.clone();
        if next.context.trim().is_empty() {
            next.context = self.context_block();
        }
        next
    }

    /// Repository name derived from the project name.
    pub fn default_repo_name(&self) -> String {
        self.name.trim().replace(' ', "-").to_lowercase()
    }
}

fn percent_from_number_or_string<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Percent {
        Number(u32),
        Text(String),
    }

    match Percent::deserialize(deserializer)? {
        Percent::Number(value) => Ok(value),
        Percent::Text(text) => text
            .trim()
            .trim_end_matches('%')
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid coverage target `{text}`"))),
    }
}
