//! Configuration data model.
//!
//! Every section deserializes with `#[serde(default)]`, so a partial file
//! only overrides the keys it names. Conversions into runtime settings live
//! next to the section they read from.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::coordinator::Schedule;
use crate::deliver::{DeliverySettings, DEFAULT_CHUNK_LINES, DEFAULT_MAX_ATOMIC_BYTES, DEFAULT_PLAN};
use crate::launcher::{LaunchTimings, ReadinessProbe};
use crate::tmux::{DeliveryHelper, KeyBindings};
use crate::types::Strategy;

use super::defaults::{
    default_prompts_dir, default_roster, default_workspace, DEFAULT_CLEAR_SETTLE_MS,
    DEFAULT_DIRECTORY_SETTLE_MS, DEFAULT_LAUNCH_GAP_MS, DEFAULT_POST_DELIVERY_SETTLE_MS,
    DEFAULT_PROGRAM, DEFAULT_READINESS_POLL_MS, DEFAULT_READINESS_TIMEOUT_MS,
    DEFAULT_SESSION_NAME, DEFAULT_STAGGER_MS, DEFAULT_STANDARDS_FILE, DEFAULT_STARTUP_SETTLE_MS,
    DEFAULT_SUBMIT_SETTLE_MS,
};

/// Top-level runtime configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub session: SessionConfig,
    pub timing: TimingConfig,
    pub readiness: ReadinessConfig,
    pub delivery: DeliveryConfig,
    pub schedule: ScheduleConfig,
    /// One pane per entry, in order.
    pub agents: Vec<AgentEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            timing: TimingConfig::default(),
            readiness: ReadinessConfig::default(),
            delivery: DeliveryConfig::default(),
            schedule: ScheduleConfig::default(),
            agents: default_roster(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    pub name: String,
    pub workspace: PathBuf,
    pub program: String,
    pub prompts_dir: PathBuf,
    /// Shared standards file name, resolved inside `prompts_dir`.
    pub standards_file: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SESSION_NAME.to_string(),
            workspace: default_workspace(),
            program: DEFAULT_PROGRAM.to_string(),
            prompts_dir: default_prompts_dir(),
            standards_file: DEFAULT_STANDARDS_FILE.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn standards_path(&self) -> PathBuf {
        self.prompts_dir.join(&self.standards_file)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimingConfig {
    pub directory_settle_ms: u64,
    pub clear_settle_ms: u64,
    pub startup_settle_ms: u64,
    pub post_delivery_settle_ms: u64,
    pub launch_gap_ms: u64,
    pub stagger_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            directory_settle_ms: DEFAULT_DIRECTORY_SETTLE_MS,
            clear_settle_ms: DEFAULT_CLEAR_SETTLE_MS,
            startup_settle_ms: DEFAULT_STARTUP_SETTLE_MS,
            post_delivery_settle_ms: DEFAULT_POST_DELIVERY_SETTLE_MS,
            launch_gap_ms: DEFAULT_LAUNCH_GAP_MS,
            stagger_ms: DEFAULT_STAGGER_MS,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Text that shows up once the program accepts input. Unset means the
    /// fixed startup wait is used.
    pub marker: Option<String>,
    pub poll_ms: u64,
    pub timeout_ms: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            marker: None,
            poll_ms: DEFAULT_READINESS_POLL_MS,
            timeout_ms: DEFAULT_READINESS_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct DeliveryConfig {
    pub strategies: Vec<Strategy>,
    pub max_atomic_bytes: usize,
    pub chunk_lines: usize,
    pub submit_settle_ms: u64,
    pub helper: Option<PathBuf>,
    pub clear_before_fallback: bool,
    pub submit_key: String,
    pub newline_key: String,
    pub clear_key: String,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        let keys = KeyBindings::default();
        Self {
            strategies: DEFAULT_PLAN.to_vec(),
            max_atomic_bytes: DEFAULT_MAX_ATOMIC_BYTES,
            chunk_lines: DEFAULT_CHUNK_LINES,
            submit_settle_ms: DEFAULT_SUBMIT_SETTLE_MS,
            helper: None,
            clear_before_fallback: false,
            submit_key: keys.submit,
            newline_key: keys.newline,
            clear_key: keys.clear_input,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleMode {
    #[default]
    Sequential,
    Parallel,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScheduleConfig {
    pub mode: ScheduleMode,
    pub max_active: usize,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            mode: ScheduleMode::Sequential,
            max_active: crate::coordinator::DEFAULT_MAX_ACTIVE,
        }
    }
}

/// One `[[agents]]` roster entry.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AgentEntry {
    /// Window name; must be unique within the roster.
    pub label: String,
    pub title: String,
    /// Prompt file key; defaults to `label`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

impl AgentEntry {
    pub fn prompt_key(&self) -> &str {
        self.prompt.as_deref().unwrap_or(&self.label)
    }
}

/// Result of `panelaunch init`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlobalConfigInitResult {
    Created { path: PathBuf },
    AlreadyInitialized { path: PathBuf },
    Overwritten { path: PathBuf, backup_path: PathBuf },
}

impl Config {
    pub fn launch_timings(&self) -> LaunchTimings {
        let t = &self.timing;
        LaunchTimings {
            directory_settle: Duration::from_millis(t.directory_settle_ms),
            clear_settle: Duration::from_millis(t.clear_settle_ms),
            startup_settle: Duration::from_millis(t.startup_settle_ms),
            post_delivery_settle: Duration::from_millis(t.post_delivery_settle_ms),
        }
    }

    pub fn readiness_probe(&self) -> Option<ReadinessProbe> {
        let marker = self
            .readiness
            .marker
            .as_deref()
            .map(str::trim)
            .filter(|marker| !marker.is_empty())?;
        Some(ReadinessProbe {
            marker: marker.to_string(),
            poll: Duration::from_millis(self.readiness.poll_ms.max(1)),
            timeout: Duration::from_millis(self.readiness.timeout_ms),
        })
    }

    pub fn delivery_settings(&self) -> DeliverySettings {
        let d = &self.delivery;
        DeliverySettings {
            plan: d.strategies.clone(),
            max_atomic_bytes: d.max_atomic_bytes,
            chunk_lines: d.chunk_lines,
            submit_settle: Duration::from_millis(d.submit_settle_ms),
            clear_before_fallback: d.clear_before_fallback,
        }
    }

    pub fn key_bindings(&self) -> KeyBindings {
        KeyBindings {
            submit: self.delivery.submit_key.clone(),
            newline: self.delivery.newline_key.clone(),
            clear_input: self.delivery.clear_key.clone(),
        }
    }

    pub fn delivery_helper(&self) -> Option<DeliveryHelper> {
        self.delivery
            .helper
            .as_deref()
            .map(|path| DeliveryHelper::new(expand_home(path)))
    }

    pub fn schedule(&self) -> Schedule {
        match self.schedule.mode {
            ScheduleMode::Sequential => Schedule::Sequential {
                launch_gap: Duration::from_millis(self.timing.launch_gap_ms),
            },
            ScheduleMode::Parallel => Schedule::Parallel {
                max_active: self.schedule.max_active,
                stagger: Duration::from_millis(self.timing.stagger_ms),
            },
        }
    }
}

/// Expand a leading `~/` against the user's home directory.
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
