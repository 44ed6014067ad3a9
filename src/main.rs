//! CLI entry point for panelaunch.

mod cli;

use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use cli::{Command, InitArgs, PlanArgs, RunArgs};
use panelaunch::build_info::banner_metadata_line;
use panelaunch::config::{
    initialize_default_global_config, load_config, validate, Config, GlobalConfigInitResult,
    LoadedConfig, ScheduleMode,
};
use panelaunch::coordinator::SessionCoordinator;
use panelaunch::deliver::Deliverer;
use panelaunch::error::LaunchError;
use panelaunch::launcher::PaneLauncher;
use panelaunch::plan::{build_launch_specs, build_plan};
use panelaunch::preflight::{absolute_path, run_preflight};
use panelaunch::project::{ProjectConfig, PROJECT_FILE_NAME};
use panelaunch::tmux::{attach_session, TmuxClient};
use panelaunch::types::Strategy;
use panelaunch::ui::{format_duration, render_launch_event, render_run_report, Renderer};

const EXIT_OK: i32 = 0;
const EXIT_FAILURE: i32 = 1;
/// `--strict` run where at least one pane failed.
const EXIT_PANES_FAILED: i32 = 2;

const LOG_ENV: &str = "PANELAUNCH_LOG";

#[tokio::main]
async fn main() {
    let command = cli::Args::parse().into_command();
    init_tracing(command.common().verbose);
    let renderer = Renderer::new(!command.common().no_color);

    let code = tokio::select! {
        code = dispatch(command, renderer) => code,
        _ = tokio::signal::ctrl_c() => {
            eprintln!();
            renderer.warn("launch cancelled; panes created so far are left running");
            EXIT_OK
        }
    };
    std::process::exit(code);
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "error",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn dispatch(command: Command, renderer: Renderer) -> i32 {
    match command {
        Command::Init(args) => run_init(&args, renderer),
        Command::Plan(args) => run_plan(&args, renderer),
        Command::Run(args) => run_launch(&args, renderer).await,
    }
}

fn run_init(args: &InitArgs, renderer: Renderer) -> i32 {
    match initialize_default_global_config(args.force) {
        Ok(GlobalConfigInitResult::Created { path }) => {
            renderer.success(&format!("wrote {}", path.display()));
            EXIT_OK
        }
        Ok(GlobalConfigInitResult::AlreadyInitialized { path }) => {
            renderer.activity(&format!(
                "{} already exists (use --force to replace it)",
                path.display()
            ));
            EXIT_OK
        }
        Ok(GlobalConfigInitResult::Overwritten { path, backup_path }) => {
            renderer.success(&format!("rewrote {}", path.display()));
            renderer.field("backup", &backup_path.display().to_string());
            EXIT_OK
        }
        Err(e) => {
            renderer.error(&format!("init failed: {e}"));
            EXIT_FAILURE
        }
    }
}

fn run_plan(args: &PlanArgs, renderer: Renderer) -> i32 {
    let Some(loaded) = load_or_report(args.common.config.as_deref(), renderer) else {
        return EXIT_FAILURE;
    };
    let config = loaded.config;
    let workspace = absolute_path(&config.session.workspace);
    let Some(project) = load_project(args.project.as_deref(), &workspace, renderer) else {
        return EXIT_FAILURE;
    };

    let plan = match build_plan(&config, &project, &workspace) {
        Ok(plan) => plan,
        Err(e) => {
            renderer.error(&format!("{e}"));
            return EXIT_FAILURE;
        }
    };
    renderer.section(&format!("Session {}", config.session.name));
    renderer.field("config", &loaded.source.to_string());
    renderer.field("program", &config.session.program);
    let plan_text = config
        .delivery
        .strategies
        .iter()
        .map(Strategy::to_string)
        .collect::<Vec<_>>()
        .join(" -> ");
    renderer.field("delivery", &plan_text);
    for planned in &plan {
        let spec = &planned.spec;
        println!(
            "{}\t{}\t{}\t{} bytes\t{}",
            spec.pane_index(),
            spec.label(),
            spec.working_directory().display(),
            spec.payload().len(),
            planned.prompt
        );
    }
    EXIT_OK
}

async fn run_launch(args: &RunArgs, renderer: Renderer) -> i32 {
    let Some(loaded) = load_or_report(args.common.config.as_deref(), renderer) else {
        return EXIT_FAILURE;
    };
    let mut config = loaded.config;
    apply_run_overrides(&mut config, args);
    if let Err(e) = validate(&config) {
        renderer.error(&format!("config: {e}"));
        return EXIT_FAILURE;
    }

    renderer.header(&banner_metadata_line());
    let preflight = match run_preflight(&config).await {
        Ok(preflight) => preflight,
        Err(msg) => {
            renderer.error(&msg);
            return EXIT_FAILURE;
        }
    };
    for warning in &preflight.warnings {
        renderer.warn(warning);
    }
    let workspace = preflight.workspace;

    let Some(project) = load_project(args.project.as_deref(), &workspace, renderer) else {
        return EXIT_FAILURE;
    };
    let project = project.with_context();
    if let Err(e) = project.save(&workspace.join(PROJECT_FILE_NAME)) {
        renderer.warn(&format!("could not save {PROJECT_FILE_NAME}: {e}"));
    }

    let specs = match build_launch_specs(&config, &project, &workspace) {
        Ok(specs) => specs,
        Err(e) => {
            renderer.error(&format!("{e}"));
            return EXIT_FAILURE;
        }
    };

    renderer.section(&format!("Session {}", config.session.name));
    renderer.field("config", &loaded.source.to_string());
    renderer.field("tmux", &preflight.tmux_version);
    renderer.field("workspace", &workspace.display().to_string());
    renderer.field("panes", &specs.len().to_string());
    renderer.field(
        "schedule",
        match config.schedule.mode {
            ScheduleMode::Sequential => "sequential",
            ScheduleMode::Parallel => "parallel",
        },
    );

    let port = Arc::new(TmuxClient::new(config.key_bindings()).with_root(&workspace));
    let deliverer = Deliverer::new(port.clone(), config.delivery_settings())
        .with_helper(config.delivery_helper());
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let launcher = PaneLauncher::new(port.clone(), deliverer, config.launch_timings())
        .with_readiness(config.readiness_probe())
        .with_events(events_tx);
    let coordinator = SessionCoordinator::new(port, launcher, config.schedule());

    let progress = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            render_launch_event(&renderer, &event);
        }
    });

    renderer.activity("launching panes");
    let result = coordinator.run(&config.session.name, &specs).await;
    // Dropping the coordinator closes the event channel.
    drop(coordinator);
    let _ = progress.await;

    let report = match result {
        Ok(report) => report,
        Err(LaunchError::Session(e)) => {
            renderer.error(&format!("could not create session {}: {e}", config.session.name));
            return EXIT_FAILURE;
        }
        Err(e) => {
            renderer.error(&e.to_string());
            return EXIT_FAILURE;
        }
    };
    render_run_report(&renderer, &report);
    tracing::info!(elapsed = %format_duration(report.elapsed), "launch complete");

    if args.attach {
        if let Err(e) = attach_session(&report.session.name).await {
            renderer.error(&e.to_string());
            return EXIT_FAILURE;
        }
    } else {
        renderer.detail(&format!("attach with: tmux attach -t {}", report.session.name));
    }

    if args.strict && report.failures() > 0 {
        EXIT_PANES_FAILED
    } else {
        EXIT_OK
    }
}

fn apply_run_overrides(config: &mut Config, args: &RunArgs) {
    if let Some(session) = args.session.as_deref() {
        config.session.name = session.to_string();
    }
    if args.parallel || args.max_active.is_some() {
        config.schedule.mode = ScheduleMode::Parallel;
    }
    if let Some(max_active) = args.max_active {
        config.schedule.max_active = max_active;
    }
    if let Some(strategy) = args.strategy {
        config.delivery.strategies = vec![strategy.into()];
    }
}

fn load_or_report(path: Option<&Path>, renderer: Renderer) -> Option<LoadedConfig> {
    match load_config(path) {
        Ok(loaded) => Some(loaded),
        Err(e) => {
            renderer.error(&format!("config: {e}"));
            None
        }
    }
}

/// `--project` if given, else a record saved in the workspace by an earlier
/// run, else built-in defaults.
fn load_project(
    explicit: Option<&Path>,
    workspace: &Path,
    renderer: Renderer,
) -> Option<ProjectConfig> {
    let saved: PathBuf = workspace.join(PROJECT_FILE_NAME);
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None if saved.is_file() => saved,
        None => {
            renderer.warn("no project record given (--project); using default project values");
            return Some(ProjectConfig::default());
        }
    };
    match ProjectConfig::load(&path) {
        Ok(project) => Some(project),
        Err(e) => {
            renderer.error(&format!("project {}: {e}", path.display()));
            None
        }
    }
}
