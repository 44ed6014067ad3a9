//! CLI argument parsing via clap.

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use panelaunch::build_info::HELP_BUILD_METADATA;
use panelaunch::types::Strategy;

/// Provision a tmux session with one pane per agent and brief each agent.
#[derive(Debug, Parser)]
#[command(
    name = "panelaunch",
    version,
    after_help = HELP_BUILD_METADATA,
    args_conflicts_with_subcommands = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Options for the default `run` command.
    #[command(flatten)]
    pub run: RunArgs,
}

impl Args {
    /// The command to execute; no subcommand means `run`.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Run(self.run))
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the session, launch every pane and deliver the briefings (default).
    Run(RunArgs),
    /// Write the default config to ~/.config/panelaunch/panelaunch.toml.
    Init(InitArgs),
    /// Print the resolved panes without touching tmux.
    Plan(PlanArgs),
}

/// Options shared by every command.
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct CommonArgs {
    /// Path to config file (default: ./panelaunch.toml or ~/.config/panelaunch/panelaunch.toml).
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Disable color output.
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Log more (-v info, -vv debug). PANELAUNCH_LOG overrides.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Default, ClapArgs)]
pub struct RunArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Project record (JSON) used to compose the briefings.
    #[arg(short = 'p', long = "project")]
    pub project: Option<PathBuf>,

    /// Override the tmux session name.
    #[arg(short = 's', long = "session")]
    pub session: Option<String>,

    /// Launch panes concurrently instead of one after another.
    #[arg(long = "parallel")]
    pub parallel: bool,

    /// Upper bound on concurrently launching panes (implies --parallel).
    #[arg(long = "max-active", value_name = "K")]
    pub max_active: Option<usize>,

    /// Use only this delivery strategy instead of the configured fallback plan.
    #[arg(long = "strategy", value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Attach to the session once every pane has been launched.
    #[arg(long = "attach")]
    pub attach: bool,

    /// Exit with status 2 when any pane failed.
    #[arg(long = "strict")]
    pub strict: bool,
}

#[derive(Debug, Clone, Default, ClapArgs)]
pub struct InitArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Replace an existing config, keeping a timestamped backup.
    #[arg(long = "force")]
    pub force: bool,
}

#[derive(Debug, Clone, Default, ClapArgs)]
pub struct PlanArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Project record (JSON) used to compose the briefings.
    #[arg(short = 'p', long = "project")]
    pub project: Option<PathBuf>,
}

impl Command {
    pub fn common(&self) -> &CommonArgs {
        match self {
            Self::Run(args) => &args.common,
            Self::Init(args) => &args.common,
            Self::Plan(args) => &args.common,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    Atomic,
    Chunked,
    Line,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Atomic => Strategy::Atomic,
            StrategyArg::Chunked => Strategy::Chunked,
            StrategyArg::Line => Strategy::LineLiteral,
        }
    }
}
