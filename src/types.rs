//! Core data model shared by the control port, deliverer, and launchers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{LaunchError, StrategyError};

// ---------------------------------------------------------------------------
// Launch specification
// ---------------------------------------------------------------------------

/// Everything needed to bring up one pane. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pane_index: usize,
    label: String,
    working_directory: PathBuf,
    start_command: String,
    payload: String,
}

impl LaunchSpec {
    pub fn new(
        pane_index: usize,
        label: impl Into<String>,
        working_directory: impl Into<PathBuf>,
        start_command: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            pane_index,
            label: label.into(),
            working_directory: working_directory.into(),
            start_command: start_command.into(),
            payload: payload.into(),
        }
    }

    pub fn pane_index(&self) -> usize {
        self.pane_index
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn working_directory(&self) -> &std::path::Path {
        &self.working_directory
    }

    pub fn start_command(&self) -> &str {
        &self.start_command
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }
}

// ---------------------------------------------------------------------------
// Session / pane addressing
// ---------------------------------------------------------------------------

/// Address of one pane inside a multiplexer session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaneTarget {
    pub session: String,
    pub index: usize,
}

impl PaneTarget {
    pub fn new(session: impl Into<String>, index: usize) -> Self {
        Self {
            session: session.into(),
            index,
        }
    }
}

impl fmt::Display for PaneTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.session, self.index)
    }
}

/// A freshly created session and the pane indices created inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub name: String,
    pub panes: Vec<usize>,
}

impl Session {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            panes: Vec::new(),
        }
    }

    pub fn target(&self, index: usize) -> PaneTarget {
        PaneTarget::new(self.name.clone(), index)
    }
}

/// Named non-literal keystrokes understood by the control port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKey {
    /// Submit the pending input to the program.
    Submit,
    /// Insert a line break without submitting.
    Newline,
    /// Discard the pending, unsubmitted input.
    ClearInput,
}

impl fmt::Display for ControlKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Submit => "submit",
            Self::Newline => "newline",
            Self::ClearInput => "clear-input",
        })
    }
}

// ---------------------------------------------------------------------------
// Pane lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle position of one pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaneState {
    Created,
    DirectorySet,
    Cleared,
    ProgramStarting,
    ProgramReady,
    PayloadDelivered,
    Confirmed,
    Failed,
}

impl PaneState {
    /// Position in the forward lifecycle; `Failed` sits outside it.
    fn rank(self) -> Option<u8> {
        match self {
            Self::Created => Some(0),
            Self::DirectorySet => Some(1),
            Self::Cleared => Some(2),
            Self::ProgramStarting => Some(3),
            Self::ProgramReady => Some(4),
            Self::PayloadDelivered => Some(5),
            Self::Confirmed => Some(6),
            Self::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed)
    }

    /// Whether a pane in this state occupies the startup-to-delivery window.
    pub fn is_launching(self) -> bool {
        matches!(
            self,
            Self::ProgramStarting | Self::ProgramReady | Self::PayloadDelivered
        )
    }
}

impl fmt::Display for PaneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "created",
            Self::DirectorySet => "directory-set",
            Self::Cleared => "cleared",
            Self::ProgramStarting => "program-starting",
            Self::ProgramReady => "program-ready",
            Self::PayloadDelivered => "payload-delivered",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
        })
    }
}

/// One pane and its lifecycle state. Only a launcher advances it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pane {
    pub target: PaneTarget,
    state: PaneState,
}

impl Pane {
    pub fn new(target: PaneTarget) -> Self {
        Self {
            target,
            state: PaneState::Created,
        }
    }

    pub fn index(&self) -> usize {
        self.target.index
    }

    pub fn state(&self) -> PaneState {
        self.state
    }

    /// Move exactly one step forward in the lifecycle.
    pub fn advance(&mut self, next: PaneState) -> Result<(), LaunchError> {
        let from = self.state;
        match (from.rank(), next.rank()) {
            (Some(current), Some(wanted)) if wanted == current + 1 => {
                self.state = next;
                Ok(())
            }
            _ => Err(LaunchError::InvalidTransition { from, to: next }),
        }
    }

    /// Enter the terminal failure state from any non-terminal state.
    pub fn fail(&mut self) -> Result<(), LaunchError> {
        if self.state.is_terminal() {
            return Err(LaunchError::InvalidTransition {
                from: self.state,
                to: PaneState::Failed,
            });
        }
        self.state = PaneState::Failed;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

/// Text-injection strategies, ordered by how many round-trips they need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Whole payload as one quoted literal.
    Atomic,
    /// One literal per line with newline keystrokes in between.
    #[serde(alias = "line")]
    LineLiteral,
    /// Fixed-size line batches with embedded newlines.
    Chunked,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Atomic => "atomic",
            Self::LineLiteral => "line-literal",
            Self::Chunked => "chunked",
        })
    }
}

/// One payload bound for one pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryRequest<'a> {
    pub target: &'a PaneTarget,
    pub payload: &'a str,
}

/// Result of running a delivery plan against one pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub succeeded: bool,
    /// The strategy that delivered the payload, if any did.
    pub strategy_used: Option<Strategy>,
    pub elapsed: Duration,
    /// Every failed attempt, in plan order.
    pub attempts: Vec<(Strategy, StrategyError)>,
}

impl DeliveryOutcome {
    /// Last error seen, if the plan was exhausted.
    pub fn error(&self) -> Option<&StrategyError> {
        if self.succeeded {
            return None;
        }
        self.attempts.last().map(|(_, err)| err)
    }

    pub fn fallbacks(&self) -> usize {
        self.attempts.len()
    }
}
