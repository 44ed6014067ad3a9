//! panelaunch: provision a tmux session with one pane per agent and brief
//! each agent with a multi-line payload.
//!
//! The launch core only talks to a [`tmux::TerminalControlPort`]. Payloads
//! are delivered through an ordered fallback plan of strategies (atomic
//! paste, literal lines, chunked batches), so a briefing arrives as one
//! submission regardless of its size or leading characters.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use panelaunch::coordinator::{Schedule, SessionCoordinator};
//! use panelaunch::deliver::{Deliverer, DeliverySettings};
//! use panelaunch::launcher::{LaunchTimings, PaneLauncher};
//! use panelaunch::tmux::{KeyBindings, TerminalControlPort, TmuxClient};
//! use panelaunch::types::LaunchSpec;
//!
//! # async fn example() {
//! let port: Arc<dyn TerminalControlPort> = Arc::new(TmuxClient::new(KeyBindings::default()));
//! let deliverer = Deliverer::new(port.clone(), DeliverySettings::default());
//! let launcher = PaneLauncher::new(port.clone(), deliverer, LaunchTimings::default());
//! let coordinator = SessionCoordinator::new(port, launcher, Schedule::parallel());
//!
//! let specs = vec![LaunchSpec::new(0, "fastapi", "/tmp/ws", "claude", "Build the API.\nAdd tests.")];
//! let report = coordinator.run("api_builder", &specs).await.unwrap();
//! println!("{}", report.summary());
//! # }
//! ```

pub mod build_info;
pub mod config;
pub mod coordinator;
pub mod deliver;
pub mod error;
pub mod launcher;
pub mod payload;
pub mod plan;
pub mod preflight;
pub mod project;
#[cfg(test)]
pub mod testsupport;
pub mod tmux;
pub mod types;
pub mod ui;
