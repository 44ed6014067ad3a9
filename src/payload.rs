//! Agent briefing composition.
//!
//! Every pane receives the same bundled template filled with its own base
//! prompt plus the shared standards and project record.

use std::collections::BTreeMap;

use crate::project::ProjectConfig;

const BRIEFING_TEMPLATE: &str = include_str!("templates/briefing.md");

/// Parameters used to fill the briefing template.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BriefingParams<'a> {
    pub base_prompt: &'a str,
    /// Shared standards text; blank drops the section.
    pub standards: &'a str,
    pub project: &'a ProjectConfig,
}

pub fn render_briefing(params: BriefingParams<'_>) -> String {
    let project = params.project;
    let mut vars = BTreeMap::<&str, String>::new();
    vars.insert("BASE_PROMPT", params.base_prompt.trim().to_string());
    vars.insert("STANDARDS_BLOCK", render_standards(params.standards));
    vars.insert("PROJECT_CONTEXT", project.with_context().context.trim().to_string());
    vars.insert("FOCUS_LIST", render_focus(project));
    vars.insert("REPOSITORY_LINE", render_repository(project.github_repo.as_deref()));
    vars.insert("COVERAGE_TARGET", project.test_coverage_target.to_string());

    normalize_blank_lines(&render_template(BRIEFING_TEMPLATE, &vars))
}

fn render_template(template: &str, vars: &BTreeMap<&str, String>) -> String {
    let mut rendered = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("{{{{{key}}}}}");
        rendered = rendered.replace(&placeholder, value);
    }
    rendered
}

fn render_standards(standards: &str) -> String {
    let standards = standards.trim();
    if standards.is_empty() {
        return String::new();
    }
    format!("## MANDATORY AGENT STANDARDS\n\n{standards}")
}

fn render_focus(project: &ProjectConfig) -> String {
    [
        format!("- API Type: Build {} API", project.api_type),
        format!("- Database: Use {} for data persistence", project.database),
        format!("- Auth: Implement {} authentication", project.authentication),
        format!("- Features: {}", project.features.join(", ")),
        format!("- Test Coverage Target: {}%", project.test_coverage_target),
        format!("- MCP Tools: {}", project.mcp_tools.join(", ")),
    ]
    .join("\n")
}

fn render_repository(repo: Option<&str>) -> String {
    match repo.map(str::trim).filter(|repo| !repo.is_empty()) {
        Some(repo) => format!("Repository Name: {repo}"),
        None => "No GitHub repository requested".to_string(),
    }
}

/// Collapse blank-line runs, trim trailing spaces and the whole text.
fn normalize_blank_lines(text: &str) -> String {
    let mut out = String::new();
    let mut previous_blank = false;

    for line in text.lines() {
        let is_blank = line.trim().is_empty();
        if is_blank && previous_blank {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(line.trim_end());
        previous_blank = is_blank;
    }

    out.trim().to_string()
}
