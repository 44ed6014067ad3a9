//! Per-pane startup sequencing.
//!
//! One launcher call walks a pane through
//! `Created -> DirectorySet -> Cleared -> ProgramStarting -> ProgramReady ->
//! PayloadDelivered -> Confirmed`, dropping into `Failed` on the first
//! transport error or when every delivery strategy is exhausted.
//!
//! Readiness of the started program cannot be observed directly. Unless a
//! readiness marker is configured, `ProgramReady` is reached purely by
//! waiting `startup_settle`.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

use crate::deliver::Deliverer;
use crate::error::LaunchError;
use crate::tmux::process::shell_quote;
use crate::tmux::TerminalControlPort;
use crate::types::{
    ControlKey, DeliveryOutcome, DeliveryRequest, LaunchSpec, Pane, PaneState, PaneTarget,
    Strategy,
};

/// Fixed waits between lifecycle steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchTimings {
    pub directory_settle: Duration,
    pub clear_settle: Duration,
    pub startup_settle: Duration,
    pub post_delivery_settle: Duration,
}

impl Default for LaunchTimings {
    fn default() -> Self {
        Self {
            directory_settle: Duration::from_millis(200),
            clear_settle: Duration::from_millis(200),
            startup_settle: Duration::from_millis(1500),
            post_delivery_settle: Duration::from_millis(500),
        }
    }
}

impl LaunchTimings {
    /// No waiting at all; for fakes that need no settle time.
    pub fn none() -> Self {
        Self {
            directory_settle: Duration::ZERO,
            clear_settle: Duration::ZERO,
            startup_settle: Duration::ZERO,
            post_delivery_settle: Duration::ZERO,
        }
    }
}

/// Poll pane captures for `marker` instead of trusting a fixed wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessProbe {
    pub marker: String,
    pub poll: Duration,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchEventKind {
    State(PaneState),
    StrategyFailed { strategy: Strategy, error: String },
    /// The readiness marker never showed up; delivery went ahead anyway.
    ReadinessTimeout,
    Delivered {
        strategy: Strategy,
        elapsed: Duration,
        fallbacks: usize,
    },
    Failed(String),
}

/// Progress notification for one pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchEvent {
    pub pane_index: usize,
    pub label: String,
    pub kind: LaunchEventKind,
}

/// Final word on one pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneReport {
    pub index: usize,
    pub label: String,
    pub state: PaneState,
    pub outcome: Option<DeliveryOutcome>,
    pub error: Option<String>,
}

impl PaneReport {
    pub fn confirmed(&self) -> bool {
        self.state == PaneState::Confirmed
    }

    /// Report for a pane that never got as far as a launcher.
    pub(crate) fn not_launched(spec: &LaunchSpec, error: String) -> Self {
        Self {
            index: spec.pane_index(),
            label: spec.label().to_string(),
            state: PaneState::Failed,
            outcome: None,
            error: Some(error),
        }
    }
}

pub struct PaneLauncher {
    port: Arc<dyn TerminalControlPort>,
    deliverer: Deliverer,
    timings: LaunchTimings,
    readiness: Option<ReadinessProbe>,
    events: Option<UnboundedSender<LaunchEvent>>,
}

impl PaneLauncher {
    pub fn new(
        port: Arc<dyn TerminalControlPort>,
        deliverer: Deliverer,
        timings: LaunchTimings,
    ) -> Self {
        Self {
            port,
            deliverer,
            timings,
            readiness: None,
            events: None,
        }
    }

    pub fn with_readiness(mut self, probe: Option<ReadinessProbe>) -> Self {
        self.readiness = probe;
        self
    }

    pub fn with_events(mut self, events: UnboundedSender<LaunchEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Bring `pane` from `Created` to `Confirmed` or `Failed`.
    pub async fn launch(&self, mut pane: Pane, spec: &LaunchSpec) -> PaneReport {
        let mut outcome = None;
        let result = self.drive(&mut pane, spec, &mut outcome).await;
        let error = match result {
            Ok(()) => None,
            Err(err) => {
                warn!(pane = %pane.target, label = spec.label(), error = %err, "pane launch failed");
                if pane.fail().is_ok() {
                    self.emit(spec, LaunchEventKind::Failed(err.to_string()));
                }
                Some(err.to_string())
            }
        };
        PaneReport {
            index: pane.index(),
            label: spec.label().to_string(),
            state: pane.state(),
            outcome,
            error,
        }
    }

    async fn drive(
        &self,
        pane: &mut Pane,
        spec: &LaunchSpec,
        outcome: &mut Option<DeliveryOutcome>,
    ) -> Result<(), LaunchError> {
        let target = pane.target.clone();
        let dir = spec.working_directory().display().to_string();

        self.run_line(&target, &format!("cd {}", shell_quote(&dir)))
            .await?;
        sleep(self.timings.directory_settle).await;
        self.advance(pane, spec, PaneState::DirectorySet)?;

        self.run_line(&target, "clear").await?;
        sleep(self.timings.clear_settle).await;
        self.advance(pane, spec, PaneState::Cleared)?;

        self.run_line(&target, spec.start_command()).await?;
        self.advance(pane, spec, PaneState::ProgramStarting)?;

        self.await_ready(&target, spec).await?;
        self.advance(pane, spec, PaneState::ProgramReady)?;

        let delivered = self
            .deliverer
            .deliver(DeliveryRequest {
                target: &target,
                payload: spec.payload(),
            })
            .await;
        for (strategy, error) in &delivered.attempts {
            self.emit(
                spec,
                LaunchEventKind::StrategyFailed {
                    strategy: *strategy,
                    error: error.to_string(),
                },
            );
        }
        let strategy_used = delivered.strategy_used;
        let elapsed = delivered.elapsed;
        let fallbacks = delivered.fallbacks();
        let attempts = delivered.attempts.clone();
        *outcome = Some(delivered);
        let Some(strategy) = strategy_used else {
            return Err(LaunchError::DeliveryExhausted { attempts });
        };

        self.advance(pane, spec, PaneState::PayloadDelivered)?;
        self.emit(
            spec,
            LaunchEventKind::Delivered {
                strategy,
                elapsed,
                fallbacks,
            },
        );

        sleep(self.timings.post_delivery_settle).await;
        self.advance(pane, spec, PaneState::Confirmed)
    }

    /// Type one shell line and press submit.
    async fn run_line(&self, target: &PaneTarget, line: &str) -> Result<(), LaunchError> {
        self.port.send_literal(target, line).await?;
        self.port.send_control_key(target, ControlKey::Submit).await?;
        Ok(())
    }

    async fn await_ready(&self, target: &PaneTarget, spec: &LaunchSpec) -> Result<(), LaunchError> {
        let Some(probe) = &self.readiness else {
            sleep(self.timings.startup_settle).await;
            return Ok(());
        };
        let deadline = Instant::now() + probe.timeout;
        loop {
            let screen = self.port.capture(target).await?;
            if screen.contains(&probe.marker) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                warn!(pane = %target, marker = %probe.marker, "readiness marker not seen before timeout");
                self.emit(spec, LaunchEventKind::ReadinessTimeout);
                return Ok(());
            }
            sleep(probe.poll).await;
        }
    }

    fn advance(
        &self,
        pane: &mut Pane,
        spec: &LaunchSpec,
        next: PaneState,
    ) -> Result<(), LaunchError> {
        pane.advance(next)?;
        info!(pane = %pane.target, label = spec.label(), state = %next, "pane state");
        self.emit(spec, LaunchEventKind::State(next));
        Ok(())
    }

    pub(crate) fn emit(&self, spec: &LaunchSpec, kind: LaunchEventKind) {
        if let Some(events) = &self.events {
            // A closed receiver only means nobody is rendering progress.
            let _ = events.send(LaunchEvent {
                pane_index: spec.pane_index(),
                label: spec.label().to_string(),
                kind,
            });
        }
    }
}
