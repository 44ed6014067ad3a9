//! Launch scenarios driven end to end against the in-memory control port.
//!
//! These run on every `cargo test`; the live tmux checks are in
//! `live_tmux.rs` and stay ignored by default.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;

use panelaunch::config::{load_config, ConfigSource};
use panelaunch::coordinator::{Schedule, SessionCoordinator};
use panelaunch::deliver::{Deliverer, DeliverySettings};
use panelaunch::launcher::{LaunchEventKind, LaunchTimings, PaneLauncher};
use panelaunch::plan::build_launch_specs;
use panelaunch::project::ProjectConfig;
use panelaunch::tmux::{MemoryPort, PortCall, TerminalControlPort};
use panelaunch::types::{
    ControlKey, DeliveryRequest, LaunchSpec, PaneState, PaneTarget, Strategy,
};

/// Scratch directory removed on drop.
struct Scratch {
    root: PathBuf,
}

impl Scratch {
    fn new(label: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let root = std::env::temp_dir().join(format!(
            "panelaunch-it-{label}-{}-{nanos}",
            std::process::id()
        ));
        fs::create_dir_all(&root).expect("create scratch dir");
        Self { root }
    }

    fn write(&self, relative: &str, text: &str) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(&path, text).expect("write scratch file");
        path
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

fn instant_settings() -> DeliverySettings {
    DeliverySettings {
        submit_settle: Duration::ZERO,
        ..DeliverySettings::default()
    }
}

async fn single_pane(port: &MemoryPort) -> PaneTarget {
    let session = port.create_session("solo").await.expect("session");
    port.create_pane(&session, 0, "agent", Path::new("/w"))
        .await
        .expect("pane")
        .target
}

fn literals(port: &MemoryPort, target: &PaneTarget) -> Vec<String> {
    port.calls_for(target)
        .into_iter()
        .filter_map(|call| match call {
            PortCall::Literal { text, .. } => Some(text),
            _ => None,
        })
        .collect()
}

fn specs(count: usize) -> Vec<LaunchSpec> {
    (0..count)
        .map(|i| {
            LaunchSpec::new(
                i,
                format!("agent-{i}"),
                "/w",
                "claude",
                format!("- task {i}\n-- verbose\nreport back"),
            )
        })
        .collect()
}

fn coordinator(
    port: &Arc<MemoryPort>,
    schedule: Schedule,
    timings: LaunchTimings,
) -> (SessionCoordinator, mpsc::UnboundedReceiver<panelaunch::launcher::LaunchEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let launcher = PaneLauncher::new(
        port.clone(),
        Deliverer::new(port.clone(), instant_settings()),
        timings,
    )
    .with_events(tx);
    (SessionCoordinator::new(port.clone(), launcher, schedule), rx)
}

#[tokio::test]
async fn three_line_payload_arrives_as_three_literal_lines() {
    let port = Arc::new(MemoryPort::new());
    let target = single_pane(&port).await;
    let payload = "- Build REST API\n-- verbose\nLine three";

    let outcome = Deliverer::new(port.clone(), instant_settings().only(Strategy::LineLiteral))
        .deliver(DeliveryRequest {
            target: &target,
            payload,
        })
        .await;

    assert!(outcome.succeeded);
    assert_eq!(outcome.strategy_used, Some(Strategy::LineLiteral));
    assert_eq!(
        literals(&port, &target),
        vec!["- Build REST API", "-- verbose", "Line three"]
    );
    assert_eq!(port.key_count(&target, ControlKey::Newline), 2);
    assert_eq!(port.key_count(&target, ControlKey::Submit), 1);
    assert_eq!(port.submissions(&target), vec![payload.to_string()]);
}

#[tokio::test]
async fn oversized_payload_falls_back_to_chunked_batches() {
    let port = Arc::new(MemoryPort::new());
    let target = single_pane(&port).await;
    let payload = (0..250)
        .map(|i| format!("- item {i}"))
        .collect::<Vec<_>>()
        .join("\n");
    let settings = DeliverySettings {
        max_atomic_bytes: 1024,
        chunk_lines: 100,
        ..instant_settings()
    };

    let outcome = Deliverer::new(port.clone(), settings)
        .deliver(DeliveryRequest {
            target: &target,
            payload: &payload,
        })
        .await;

    assert!(outcome.succeeded);
    assert_eq!(outcome.strategy_used, Some(Strategy::Chunked));
    assert_eq!(outcome.fallbacks(), 1);
    assert_eq!(outcome.attempts[0].0, Strategy::Atomic);
    // The atomic attempt is rejected before anything is typed.
    assert_eq!(literals(&port, &target).len(), 3);
    assert_eq!(port.key_count(&target, ControlKey::Submit), 1);
    assert_eq!(port.submissions(&target), vec![payload]);
    assert!(port.pending(&target).is_empty());
}

#[tokio::test]
async fn briefings_from_a_config_file_reach_every_pane() {
    let scratch = Scratch::new("e2e");
    let workspace = scratch.root.join("workspace");
    fs::create_dir_all(&workspace).expect("workspace");
    scratch.write("prompts/prompt_alpha.md", "You build the API.\n-- not a flag");
    scratch.write("prompts/AGENT_STANDARDS.md", "Run the tests before reporting.");
    let config_path = scratch.write(
        "panelaunch.toml",
        &format!(
            r#"
[session]
name = "e2e"
workspace = "{workspace}"
program = "claude"
prompts_dir = "{prompts}"
standards_file = "AGENT_STANDARDS.md"

[timing]
directory_settle_ms = 0
clear_settle_ms = 0
startup_settle_ms = 0
post_delivery_settle_ms = 0
launch_gap_ms = 0
stagger_ms = 0

[delivery]
strategies = ["line-literal"]
submit_settle_ms = 0

[[agents]]
label = "alpha"
title = "Alpha"

[[agents]]
label = "beta"
title = "Beta"
"#,
            workspace = workspace.display(),
            prompts = scratch.root.join("prompts").display(),
        ),
    );

    let loaded = load_config(Some(&config_path)).expect("load config");
    assert_eq!(loaded.source, ConfigSource::Explicit(config_path.clone()));
    let config = loaded.config;
    let specs = build_launch_specs(&config, &ProjectConfig::default(), &workspace)
        .expect("launch specs");
    assert_eq!(specs.len(), 2);
    assert!(specs[0].payload().contains("You build the API.\n-- not a flag"));
    assert!(specs[0].payload().contains("Run the tests before reporting."));
    assert!(specs[1].payload().contains("You are the Beta agent."));

    let port = Arc::new(MemoryPort::new());
    let deliverer = Deliverer::new(port.clone(), config.delivery_settings());
    let launcher = PaneLauncher::new(port.clone(), deliverer, config.launch_timings())
        .with_readiness(config.readiness_probe());
    let coordinator = SessionCoordinator::new(port.clone(), launcher, config.schedule());

    let report = coordinator.run("e2e", &specs).await.expect("run");
    assert_eq!(report.confirmed(), 2, "{}", report.summary());

    for spec in &specs {
        let target = PaneTarget::new("e2e", spec.pane_index());
        let submissions = port.submissions(&target);
        assert_eq!(submissions.len(), 4, "{submissions:?}");
        assert!(submissions[0].starts_with("cd '"));
        assert_eq!(submissions[1], "clear");
        assert_eq!(submissions[2], "claude");
        assert_eq!(submissions[3], spec.payload());
        assert_eq!(port.directory(&target).as_deref(), Some(workspace.as_path()));
    }

    // A second run recreates the session instead of stacking a new one.
    let rerun = coordinator.run("e2e", &specs).await.expect("rerun");
    assert_eq!(rerun.confirmed(), 2);
    assert_eq!(port.session_names(), vec!["e2e".to_string()]);
    assert_eq!(port.panes("e2e").len(), 2);
}

#[tokio::test]
async fn one_unreachable_pane_does_not_stop_the_others() {
    let port = Arc::new(MemoryPort::new().with_failing_pane(3));
    let schedule = Schedule::Parallel {
        max_active: 4,
        stagger: Duration::ZERO,
    };
    let (coordinator, _rx) = coordinator(&port, schedule, LaunchTimings::none());

    let report = coordinator.run("team", &specs(5)).await.expect("run");

    assert_eq!(report.confirmed(), 4);
    assert_eq!(report.failures(), 1);
    let failed = &report.panes[3];
    assert_eq!(failed.state, PaneState::Failed);
    assert!(failed
        .error
        .as_deref()
        .is_some_and(|error| error.contains("offline")));
    for index in [0, 1, 2, 4] {
        let target = PaneTarget::new("team", index);
        assert_eq!(port.key_count(&target, ControlKey::Submit), 4);
    }
}

#[tokio::test]
async fn exhausted_delivery_fails_only_its_own_pane() {
    // Shell lines fit under the ceiling; every briefing fragment does not.
    let port = Arc::new(MemoryPort::new().with_pane_literal_limit(2, 12));
    let settings = DeliverySettings {
        plan: vec![Strategy::Atomic, Strategy::Chunked, Strategy::LineLiteral],
        ..instant_settings()
    };
    let launcher = PaneLauncher::new(
        port.clone(),
        Deliverer::new(port.clone(), settings),
        LaunchTimings::none(),
    );
    let schedule = Schedule::Parallel {
        max_active: 4,
        stagger: Duration::ZERO,
    };
    let coordinator = SessionCoordinator::new(port.clone(), launcher, schedule);
    let specs: Vec<LaunchSpec> = (0..4)
        .map(|i| {
            LaunchSpec::new(
                i,
                format!("agent-{i}"),
                "/w",
                "claude",
                format!("- implement endpoint {i}\n-- with verbose logging"),
            )
        })
        .collect();

    let report = coordinator.run("team", &specs).await.expect("run");

    assert_eq!(report.summary(), "3 of 4 panes confirmed (1 failed)");
    let failed = &report.panes[2];
    assert_eq!(failed.state, PaneState::Failed);
    let outcome = failed.outcome.as_ref().expect("delivery outcome");
    assert!(!outcome.succeeded);
    assert_eq!(
        outcome
            .attempts
            .iter()
            .map(|(strategy, _)| *strategy)
            .collect::<Vec<_>>(),
        vec![Strategy::Atomic, Strategy::Chunked, Strategy::LineLiteral]
    );
    let target = PaneTarget::new("team", 2);
    // cd, clear and the start command; nothing after.
    assert_eq!(port.key_count(&target, ControlKey::Submit), 3);
    assert_eq!(port.submissions(&target), vec!["cd '/w'", "clear", "claude"]);
    assert!(port.pending(&target).is_empty());

    for index in [0, 1, 3] {
        assert!(report.panes[index].confirmed(), "pane {index}");
        let target = PaneTarget::new("team", index);
        assert_eq!(port.submissions(&target)[3], specs[index].payload());
    }
}

#[tokio::test]
async fn configured_bound_limits_concurrent_launchers() {
    let port = Arc::new(MemoryPort::new());
    let timings = LaunchTimings {
        startup_settle: Duration::from_millis(15),
        ..LaunchTimings::none()
    };
    let schedule = Schedule::Parallel {
        max_active: 2,
        stagger: Duration::ZERO,
    };
    let (coordinator, mut rx) = coordinator(&port, schedule, timings);

    let report = coordinator.run("bounded", &specs(6)).await.expect("run");
    drop(coordinator);
    assert_eq!(report.confirmed(), 6);

    let mut active = 0usize;
    let mut peak = 0usize;
    while let Some(event) = rx.recv().await {
        match event.kind {
            LaunchEventKind::State(PaneState::ProgramStarting) => {
                active += 1;
                peak = peak.max(active);
            }
            LaunchEventKind::State(PaneState::Confirmed) | LaunchEventKind::Failed(_) => {
                active -= 1;
            }
            _ => {}
        }
    }
    assert!(peak <= 2, "peak active launchers: {peak}");
}
