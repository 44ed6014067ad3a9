//! Terminal multiplexer control port and its adapters.
//!
//! `TerminalControlPort` is the only surface the launch core talks to.
//! `TmuxClient` drives a real tmux server; `MemoryPort` is an in-process
//! stand-in that records every call for tests.

use async_trait::async_trait;
use std::path::Path;

use crate::error::TransportError;
use crate::types::{ControlKey, Pane, PaneTarget, Session};

mod client;
pub(crate) mod command;
mod helper;
pub mod memory;
pub(crate) mod process;

pub use client::{attach_session, tmux_version, KeyBindings, TmuxClient};
pub use helper::DeliveryHelper;
pub use memory::{MemoryPort, PortCall};

/// Capabilities the launch core needs from a terminal multiplexer.
///
/// Every call is a discrete round-trip; callers treat failures as local to
/// the pane they address.
#[async_trait]
pub trait TerminalControlPort: Send + Sync {
    /// Create `name`, destroying any existing session with that name first.
    async fn create_session(&self, name: &str) -> Result<Session, TransportError>;

    /// Create pane `index` inside `session`, rooted at `working_directory`.
    async fn create_pane(
        &self,
        session: &Session,
        index: usize,
        label: &str,
        working_directory: &Path,
    ) -> Result<Pane, TransportError>;

    /// Type `text` into the pane exactly as given; nothing is parsed as a flag.
    async fn send_literal(&self, pane: &PaneTarget, text: &str) -> Result<(), TransportError>;

    /// Press one named, non-literal key.
    async fn send_control_key(
        &self,
        pane: &PaneTarget,
        key: ControlKey,
    ) -> Result<(), TransportError>;

    /// Visible buffer content of the pane.
    async fn capture(&self, pane: &PaneTarget) -> Result<String, TransportError>;
}
