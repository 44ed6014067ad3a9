//! Session-wide fan-out over pane launchers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

use crate::error::LaunchError;
use crate::launcher::{LaunchEventKind, PaneLauncher, PaneReport};
use crate::tmux::TerminalControlPort;
use crate::types::{LaunchSpec, Pane, Session};

pub const DEFAULT_LAUNCH_GAP: Duration = Duration::from_millis(1000);
pub const DEFAULT_MAX_ACTIVE: usize = 4;
pub const DEFAULT_STAGGER: Duration = Duration::from_millis(500);

/// How pane launchers are run once every pane exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// One pane at a time, `launch_gap` apart.
    Sequential { launch_gap: Duration },
    /// At most `max_active` launchers at once, submissions `stagger` apart.
    Parallel { max_active: usize, stagger: Duration },
}

impl Default for Schedule {
    fn default() -> Self {
        Self::Sequential {
            launch_gap: DEFAULT_LAUNCH_GAP,
        }
    }
}

impl Schedule {
    pub fn parallel() -> Self {
        Self::Parallel {
            max_active: DEFAULT_MAX_ACTIVE,
            stagger: DEFAULT_STAGGER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub session: Session,
    /// One report per launch spec, in spec order.
    pub panes: Vec<PaneReport>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn confirmed(&self) -> usize {
        self.panes.iter().filter(|pane| pane.confirmed()).count()
    }

    pub fn failures(&self) -> usize {
        self.panes.len() - self.confirmed()
    }

    pub fn summary(&self) -> String {
        let mut line = format!(
            "{} of {} panes confirmed",
            self.confirmed(),
            self.panes.len()
        );
        if self.failures() > 0 {
            line.push_str(&format!(" ({} failed)", self.failures()));
        }
        line
    }
}

pub struct SessionCoordinator {
    port: Arc<dyn TerminalControlPort>,
    launcher: Arc<PaneLauncher>,
    schedule: Schedule,
}

impl SessionCoordinator {
    pub fn new(
        port: Arc<dyn TerminalControlPort>,
        launcher: PaneLauncher,
        schedule: Schedule,
    ) -> Self {
        Self {
            port,
            launcher: Arc::new(launcher),
            schedule,
        }
    }

    /// Recreate `session_name`, create one pane per spec and launch them all.
    ///
    /// Specs that share a pane index are rejected before anything is
    /// created. After that only a session-creation failure aborts the run;
    /// every pane-level failure ends up in the returned report.
    pub async fn run(
        &self,
        session_name: &str,
        specs: &[LaunchSpec],
    ) -> Result<RunReport, LaunchError> {
        ensure_distinct_panes(specs)?;
        let started = Instant::now();
        let mut session = self
            .port
            .create_session(session_name)
            .await
            .map_err(LaunchError::Session)?;
        info!(session = %session.name, panes = specs.len(), "session created");

        let mut slots: Vec<Option<PaneReport>> = vec![None; specs.len()];
        let mut jobs: Vec<(usize, Pane)> = Vec::with_capacity(specs.len());
        for (position, spec) in specs.iter().enumerate() {
            match self
                .port
                .create_pane(
                    &session,
                    spec.pane_index(),
                    spec.label(),
                    spec.working_directory(),
                )
                .await
            {
                Ok(pane) => {
                    session.panes.push(pane.index());
                    jobs.push((position, pane));
                }
                Err(err) => {
                    warn!(label = spec.label(), index = spec.pane_index(), error = %err, "pane creation failed");
                    self.launcher
                        .emit(spec, LaunchEventKind::Failed(err.to_string()));
                    slots[position] = Some(PaneReport::not_launched(spec, err.to_string()));
                }
            }
        }

        match self.schedule {
            Schedule::Sequential { launch_gap } => {
                for (n, (position, pane)) in jobs.into_iter().enumerate() {
                    if n > 0 {
                        sleep(launch_gap).await;
                    }
                    slots[position] = Some(self.launcher.launch(pane, &specs[position]).await);
                }
            }
            Schedule::Parallel { max_active, stagger } => {
                self.run_bounded(jobs, specs, max_active, stagger, &mut slots)
                    .await;
            }
        }

        let panes = slots
            .into_iter()
            .zip(specs)
            .map(|(slot, spec)| {
                slot.unwrap_or_else(|| {
                    PaneReport::not_launched(spec, "launcher task ended without a report".into())
                })
            })
            .collect();
        let report = RunReport {
            session,
            panes,
            elapsed: started.elapsed(),
        };
        info!(session = %report.session.name, summary = %report.summary(), "run finished");
        Ok(report)
    }

    async fn run_bounded(
        &self,
        jobs: Vec<(usize, Pane)>,
        specs: &[LaunchSpec],
        max_active: usize,
        stagger: Duration,
        slots: &mut [Option<PaneReport>],
    ) {
        let permits = Arc::new(Semaphore::new(max_active.max(1)));
        let mut tasks = JoinSet::new();
        for (n, (position, pane)) in jobs.into_iter().enumerate() {
            if n > 0 {
                sleep(stagger).await;
            }
            // The semaphore is never closed, so acquisition only waits.
            let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                break;
            };
            let launcher = Arc::clone(&self.launcher);
            let spec = specs[position].clone();
            tasks.spawn(async move {
                let report = launcher.launch(pane, &spec).await;
                drop(permit);
                (position, report)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((position, report)) => slots[position] = Some(report),
                Err(err) => warn!(error = %err, "pane launcher task aborted"),
            }
        }
    }
}

/// One launcher per pane: two specs on one index would interleave their input.
fn ensure_distinct_panes(specs: &[LaunchSpec]) -> Result<(), LaunchError> {
    let mut claimed: HashMap<usize, &str> = HashMap::with_capacity(specs.len());
    for spec in specs {
        if let Some(first) = claimed.insert(spec.pane_index(), spec.label()) {
            return Err(LaunchError::DuplicatePane {
                index: spec.pane_index(),
                first: first.to_string(),
                second: spec.label().to_string(),
            });
        }
    }
    Ok(())
}
