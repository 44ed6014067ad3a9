//! In-memory control port that emulates panes and records every call.
//!
//! Each pane models a simple input line editor: literal text is appended
//! to the pending input (embedded `\n` starts a new line), `Newline` adds a
//! line break, `Submit` moves the pending input onto the screen and records
//! one submission, and `ClearInput` drops whatever is pending.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::TransportError;
use crate::types::{ControlKey, Pane, PaneTarget, Session};

use super::TerminalControlPort;

/// One recorded port call, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortCall {
    CreateSession(String),
    CreatePane {
        target: PaneTarget,
        label: String,
        directory: PathBuf,
    },
    Literal {
        target: PaneTarget,
        text: String,
    },
    Key {
        target: PaneTarget,
        key: ControlKey,
    },
    Capture(PaneTarget),
}

impl PortCall {
    pub fn target(&self) -> Option<&PaneTarget> {
        match self {
            Self::CreateSession(_) => None,
            Self::CreatePane { target, .. }
            | Self::Literal { target, .. }
            | Self::Key { target, .. }
            | Self::Capture(target) => Some(target),
        }
    }
}

#[derive(Debug, Default)]
struct PaneBuffer {
    label: String,
    directory: PathBuf,
    screen: Vec<String>,
    pending: String,
    submissions: Vec<String>,
}

impl PaneBuffer {
    fn capture(&self) -> String {
        let mut lines = self.screen.clone();
        if !self.pending.is_empty() {
            lines.extend(self.pending.split('\n').map(str::to_string));
        }
        lines.join("\n")
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    sessions: BTreeMap<String, BTreeMap<usize, PaneBuffer>>,
    calls: Vec<PortCall>,
    literal_calls: usize,
    literal_limit: Option<usize>,
    pane_literal_limits: BTreeMap<usize, usize>,
    literal_faults: BTreeSet<usize>,
    failing_panes: BTreeSet<usize>,
    failing_pane_creation: BTreeSet<usize>,
    fail_sessions: bool,
}

impl MemoryState {
    fn pane_mut(&mut self, target: &PaneTarget) -> Result<&mut PaneBuffer, TransportError> {
        self.sessions
            .get_mut(&target.session)
            .and_then(|panes| panes.get_mut(&target.index))
            .ok_or_else(|| TransportError::rejected(format!("no pane {target}")))
    }

    fn pane(&self, target: &PaneTarget) -> Option<&PaneBuffer> {
        self.sessions
            .get(&target.session)
            .and_then(|panes| panes.get(&target.index))
    }

    fn check_pane_online(&self, target: &PaneTarget) -> Result<(), TransportError> {
        if self.failing_panes.contains(&target.index) {
            return Err(TransportError::rejected(format!("pane {target} is offline")));
        }
        Ok(())
    }
}

/// Deterministic, thread-safe fake of a terminal multiplexer.
#[derive(Debug, Default)]
pub struct MemoryPort {
    state: Mutex<MemoryState>,
}

impl MemoryPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject literal sends longer than `bytes`, like an argument ceiling.
    pub fn with_literal_limit(self, bytes: usize) -> Self {
        self.lock().literal_limit = Some(bytes);
        self
    }

    /// Like [`Self::with_literal_limit`], but only for pane `index`.
    pub fn with_pane_literal_limit(self, index: usize, bytes: usize) -> Self {
        self.lock().pane_literal_limits.insert(index, bytes);
        self
    }

    /// Fail the `nth` literal send (1-based, counted across all panes) once.
    pub fn with_literal_fault(self, nth: usize) -> Self {
        self.lock().literal_faults.insert(nth);
        self
    }

    /// Fail every send and capture addressed to pane `index`.
    pub fn with_failing_pane(self, index: usize) -> Self {
        self.lock().failing_panes.insert(index);
        self
    }

    /// Fail creation of pane `index`.
    pub fn with_failing_pane_creation(self, index: usize) -> Self {
        self.lock().failing_pane_creation.insert(index);
        self
    }

    /// Fail every session creation.
    pub fn with_failing_sessions(self) -> Self {
        self.lock().fail_sessions = true;
        self
    }

    pub fn calls(&self) -> Vec<PortCall> {
        self.lock().calls.clone()
    }

    /// Calls addressed to one pane, in order.
    pub fn calls_for(&self, target: &PaneTarget) -> Vec<PortCall> {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.target() == Some(target))
            .cloned()
            .collect()
    }

    pub fn session_names(&self) -> Vec<String> {
        self.lock().sessions.keys().cloned().collect()
    }

    /// Pane indices and labels of a live session.
    pub fn panes(&self, session: &str) -> Vec<(usize, String)> {
        self.lock()
            .sessions
            .get(session)
            .map(|panes| {
                panes
                    .iter()
                    .map(|(index, pane)| (*index, pane.label.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn directory(&self, target: &PaneTarget) -> Option<PathBuf> {
        self.lock().pane(target).map(|pane| pane.directory.clone())
    }

    /// Every submitted input block for a pane.
    pub fn submissions(&self, target: &PaneTarget) -> Vec<String> {
        self.lock()
            .pane(target)
            .map(|pane| pane.submissions.clone())
            .unwrap_or_default()
    }

    /// Input typed into a pane but not yet submitted.
    pub fn pending(&self, target: &PaneTarget) -> String {
        self.lock()
            .pane(target)
            .map(|pane| pane.pending.clone())
            .unwrap_or_default()
    }

    pub fn key_count(&self, target: &PaneTarget, key: ControlKey) -> usize {
        self.calls_for(target)
            .iter()
            .filter(|call| matches!(call, PortCall::Key { key: k, .. } if *k == key))
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A panicking test thread must not hide the recorded calls.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl TerminalControlPort for MemoryPort {
    async fn create_session(&self, name: &str) -> Result<Session, TransportError> {
        let mut state = self.lock();
        state.calls.push(PortCall::CreateSession(name.to_string()));
        if state.fail_sessions {
            return Err(TransportError::rejected(format!(
                "session {name} cannot be created"
            )));
        }
        state.sessions.insert(name.to_string(), BTreeMap::new());
        Ok(Session::new(name))
    }

    async fn create_pane(
        &self,
        session: &Session,
        index: usize,
        label: &str,
        working_directory: &Path,
    ) -> Result<Pane, TransportError> {
        let mut state = self.lock();
        let target = session.target(index);
        state.calls.push(PortCall::CreatePane {
            target: target.clone(),
            label: label.to_string(),
            directory: working_directory.to_path_buf(),
        });
        if state.failing_pane_creation.contains(&index) {
            return Err(TransportError::rejected(format!(
                "pane {target} cannot be created"
            )));
        }
        let panes = state
            .sessions
            .get_mut(&session.name)
            .ok_or_else(|| TransportError::rejected(format!("no session {}", session.name)))?;
        panes.insert(
            index,
            PaneBuffer {
                label: label.to_string(),
                directory: working_directory.to_path_buf(),
                ..PaneBuffer::default()
            },
        );
        Ok(Pane::new(target))
    }

    async fn send_literal(&self, pane: &PaneTarget, text: &str) -> Result<(), TransportError> {
        let mut state = self.lock();
        state.calls.push(PortCall::Literal {
            target: pane.clone(),
            text: text.to_string(),
        });
        state.literal_calls += 1;
        let nth = state.literal_calls;
        state.check_pane_online(pane)?;
        if state.literal_faults.remove(&nth) {
            return Err(TransportError::rejected(format!(
                "injected fault on literal send #{nth}"
            )));
        }
        let limit = state
            .pane_literal_limits
            .get(&pane.index)
            .copied()
            .or(state.literal_limit);
        if let Some(limit) = limit {
            if text.len() > limit {
                return Err(TransportError::rejected(format!(
                    "literal of {} bytes exceeds {limit}",
                    text.len()
                )));
            }
        }
        state.pane_mut(pane)?.pending.push_str(text);
        Ok(())
    }

    async fn send_control_key(
        &self,
        pane: &PaneTarget,
        key: ControlKey,
    ) -> Result<(), TransportError> {
        let mut state = self.lock();
        state.calls.push(PortCall::Key {
            target: pane.clone(),
            key,
        });
        state.check_pane_online(pane)?;
        let buffer = state.pane_mut(pane)?;
        match key {
            ControlKey::Newline => buffer.pending.push('\n'),
            ControlKey::ClearInput => buffer.pending.clear(),
            ControlKey::Submit => {
                let input = std::mem::take(&mut buffer.pending);
                buffer
                    .screen
                    .extend(input.split('\n').map(str::to_string));
                buffer.submissions.push(input);
            }
        }
        Ok(())
    }

    async fn capture(&self, pane: &PaneTarget) -> Result<String, TransportError> {
        let mut state = self.lock();
        state.calls.push(PortCall::Capture(pane.clone()));
        state.check_pane_online(pane)?;
        state
            .pane(pane)
            .map(PaneBuffer::capture)
            .ok_or_else(|| TransportError::rejected(format!("no pane {pane}")))
    }
}
