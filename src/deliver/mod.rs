//! Payload delivery into a pane's input stream.
//!
//! A `Deliverer` walks an ordered plan of strategies and stops at the first
//! one that succeeds. Strategy failures stay inside the deliverer; callers
//! only see the aggregate `DeliveryOutcome`.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::tmux::{DeliveryHelper, TerminalControlPort};
use crate::types::{ControlKey, DeliveryOutcome, DeliveryRequest, Strategy};

mod strategy;

pub use strategy::StrategyFailure;
use strategy::Wire;

/// Default fallback order: one round-trip first, then batches.
pub const DEFAULT_PLAN: [Strategy; 2] = [Strategy::Atomic, Strategy::Chunked];
/// Largest escaped payload the atomic strategy will pass as one argument.
pub const DEFAULT_MAX_ATOMIC_BYTES: usize = 16 * 1024;
pub const DEFAULT_CHUNK_LINES: usize = 100;
pub const DEFAULT_SUBMIT_SETTLE: Duration = Duration::from_millis(500);

/// Tunables for one deliverer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliverySettings {
    /// Strategies to try, in order.
    pub plan: Vec<Strategy>,
    pub max_atomic_bytes: usize,
    pub chunk_lines: usize,
    /// Pause between the last text fragment and the submit key.
    pub submit_settle: Duration,
    /// Press `ClearInput` before falling back after a partial write.
    pub clear_before_fallback: bool,
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            plan: DEFAULT_PLAN.to_vec(),
            max_atomic_bytes: DEFAULT_MAX_ATOMIC_BYTES,
            chunk_lines: DEFAULT_CHUNK_LINES,
            submit_settle: DEFAULT_SUBMIT_SETTLE,
            clear_before_fallback: false,
        }
    }
}

impl DeliverySettings {
    /// Same settings with a single-strategy plan.
    pub fn only(mut self, strategy: Strategy) -> Self {
        self.plan = vec![strategy];
        self
    }
}

pub struct Deliverer {
    port: Arc<dyn TerminalControlPort>,
    settings: DeliverySettings,
    helper: Option<DeliveryHelper>,
}

impl Deliverer {
    pub fn new(port: Arc<dyn TerminalControlPort>, settings: DeliverySettings) -> Self {
        Self {
            port,
            settings,
            helper: None,
        }
    }

    /// Route atomic deliveries through an external helper when it exists.
    pub fn with_helper(mut self, helper: Option<DeliveryHelper>) -> Self {
        self.helper = helper;
        self
    }

    pub fn settings(&self) -> &DeliverySettings {
        &self.settings
    }

    /// Run the configured plan until one strategy succeeds.
    pub async fn deliver(&self, request: DeliveryRequest<'_>) -> DeliveryOutcome {
        let started = Instant::now();
        let plan = &self.settings.plan;
        let mut attempts = Vec::new();

        for (position, strategy) in plan.iter().copied().enumerate() {
            debug!(target_pane = %request.target, %strategy, bytes = request.payload.len(), "delivering");
            match self.deliver_with(strategy, request).await {
                Ok(()) => {
                    info!(target_pane = %request.target, %strategy, fallbacks = attempts.len(), "payload delivered");
                    return DeliveryOutcome {
                        succeeded: true,
                        strategy_used: Some(strategy),
                        elapsed: started.elapsed(),
                        attempts,
                    };
                }
                Err(failure) => {
                    warn!(
                        target_pane = %request.target,
                        %strategy,
                        partial = failure.partial,
                        error = %failure.error,
                        "delivery strategy failed"
                    );
                    if failure.terminal {
                        attempts.push((strategy, failure.error));
                        break;
                    }
                    let has_next = position + 1 < plan.len();
                    if failure.partial && has_next && self.settings.clear_before_fallback {
                        self.clear_pending_input(request).await;
                    }
                    attempts.push((strategy, failure.error));
                }
            }
        }

        DeliveryOutcome {
            succeeded: false,
            strategy_used: None,
            elapsed: started.elapsed(),
            attempts,
        }
    }

    /// Run exactly one strategy, without fallback.
    pub async fn deliver_with(
        &self,
        strategy: Strategy,
        request: DeliveryRequest<'_>,
    ) -> Result<(), StrategyFailure> {
        let mut wire = Wire::new(self.port.as_ref(), request.target);
        let settle = self.settings.submit_settle;
        match strategy {
            Strategy::Atomic => {
                strategy::atomic(
                    &mut wire,
                    request.payload,
                    self.settings.max_atomic_bytes,
                    settle,
                    self.helper.as_ref(),
                )
                .await
            }
            Strategy::LineLiteral => strategy::line_literal(&mut wire, request.payload, settle).await,
            Strategy::Chunked => {
                strategy::chunked(&mut wire, request.payload, self.settings.chunk_lines, settle)
                    .await
            }
        }
    }

    async fn clear_pending_input(&self, request: DeliveryRequest<'_>) {
        if let Err(err) = self
            .port
            .send_control_key(request.target, ControlKey::ClearInput)
            .await
        {
            warn!(target_pane = %request.target, error = %err, "failed to clear partial input");
        }
    }
}
