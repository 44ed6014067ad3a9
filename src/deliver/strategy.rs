//! The three text-injection strategies.
//!
//! Each strategy types the whole payload and then presses submit exactly
//! once. A strategy that fails never presses submit; it reports whether any
//! fragment already reached the pane so the caller can decide on cleanup.

use std::time::Duration;
use tokio::time::sleep;

use crate::error::{EscapingError, StrategyError, TransportError};
use crate::tmux::process::shell_quote;
use crate::tmux::{DeliveryHelper, TerminalControlPort};
use crate::types::{ControlKey, PaneTarget};

/// A failed strategy attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyFailure {
    pub error: StrategyError,
    /// Whether some text was already typed into the pane.
    pub partial: bool,
    /// The submit key may already have been pressed; no other strategy may
    /// run for this payload.
    pub terminal: bool,
}

/// Port handle that remembers whether anything was transmitted.
pub(super) struct Wire<'a> {
    port: &'a dyn TerminalControlPort,
    target: &'a PaneTarget,
    transmitted: bool,
}

impl<'a> Wire<'a> {
    pub(super) fn new(port: &'a dyn TerminalControlPort, target: &'a PaneTarget) -> Self {
        Self {
            port,
            target,
            transmitted: false,
        }
    }

    fn failure(&self, error: impl Into<StrategyError>) -> StrategyFailure {
        StrategyFailure {
            error: error.into(),
            partial: self.transmitted,
            terminal: false,
        }
    }

    async fn literal(&mut self, text: &str) -> Result<(), StrategyFailure> {
        self.port
            .send_literal(self.target, text)
            .await
            .map_err(|e| self.failure(e))?;
        self.transmitted = true;
        Ok(())
    }

    async fn key(&mut self, key: ControlKey) -> Result<(), StrategyFailure> {
        self.port
            .send_control_key(self.target, key)
            .await
            .map_err(|e| self.failure(e))?;
        self.transmitted = true;
        Ok(())
    }

    async fn submit_after(&mut self, settle: Duration) -> Result<(), StrategyFailure> {
        sleep(settle).await;
        self.key(ControlKey::Submit).await
    }
}

/// Size of `payload` once quoted as a single shell argument.
pub(crate) fn atomic_argument_len(payload: &str, ceiling: usize) -> Result<usize, EscapingError> {
    if let Some(offset) = payload.find('\0') {
        return Err(EscapingError::NulByte { offset });
    }
    let escaped = shell_quote(payload).len();
    if escaped > ceiling {
        return Err(EscapingError::TooLong { escaped, ceiling });
    }
    Ok(escaped)
}

/// Whole payload in one literal, then one submit.
///
/// With an available helper the helper does both steps. A helper that exits
/// non-zero may have submitted before failing, so its failure is terminal.
pub(super) async fn atomic(
    wire: &mut Wire<'_>,
    payload: &str,
    ceiling: usize,
    settle: Duration,
    helper: Option<&DeliveryHelper>,
) -> Result<(), StrategyFailure> {
    atomic_argument_len(payload, ceiling).map_err(|e| wire.failure(e))?;
    if let Some(helper) = helper.filter(|helper| helper.is_available()) {
        return helper
            .deliver(wire.target, payload)
            .await
            .map_err(|e: TransportError| StrategyFailure {
                error: e.into(),
                partial: true,
                terminal: true,
            });
    }
    wire.literal(payload).await?;
    wire.submit_after(settle).await
}

/// One literal per line with newline keystrokes between lines.
pub(super) async fn line_literal(
    wire: &mut Wire<'_>,
    payload: &str,
    settle: Duration,
) -> Result<(), StrategyFailure> {
    let lines: Vec<&str> = payload.split('\n').collect();
    let last = lines.len() - 1;
    for (i, line) in lines.iter().enumerate() {
        if !line.is_empty() {
            wire.literal(line).await?;
        }
        if i < last {
            wire.key(ControlKey::Newline).await?;
        }
    }
    wire.submit_after(settle).await
}

/// Batches of `chunk_lines` lines, each batch one literal with embedded newlines.
pub(super) async fn chunked(
    wire: &mut Wire<'_>,
    payload: &str,
    chunk_lines: usize,
    settle: Duration,
) -> Result<(), StrategyFailure> {
    for batch in chunk_batches(payload, chunk_lines) {
        if !batch.is_empty() {
            wire.literal(&batch).await?;
        }
    }
    wire.submit_after(settle).await
}

/// Split `payload` into literal batches; every batch but the last keeps its
/// trailing line break so batch boundaries do not merge lines.
pub(crate) fn chunk_batches(payload: &str, chunk_lines: usize) -> Vec<String> {
    let lines: Vec<&str> = payload.split('\n').collect();
    let chunks: Vec<&[&str]> = lines.chunks(chunk_lines.max(1)).collect();
    let last = chunks.len() - 1;
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let mut batch = chunk.join("\n");
            if i < last {
                batch.push('\n');
            }
            batch
        })
        .collect()
}
