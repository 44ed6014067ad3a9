//! Rendering contract and launch-progress adapters.
//!
//! `RenderSink` is what orchestration code writes to. `Renderer` is the
//! terminal implementation; tests substitute a recording sink.

use std::time::Duration;

use crate::coordinator::RunReport;
use crate::launcher::{LaunchEvent, LaunchEventKind};
use crate::types::PaneState;

pub use super::renderer::{PaneTone, Renderer};

pub trait RenderSink: Send + Sync {
    fn header(&self, detail: &str);
    /// Titled section divider.
    fn section(&self, title: &str);
    /// Activity/lifecycle text.
    fn activity(&self, text: &str);
    /// One key/value field row.
    fn field(&self, key: &str, value: &str);
    fn detail(&self, text: &str);
    /// Progress line for one pane.
    fn pane(&self, index: usize, label: &str, tone: PaneTone, text: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
    fn success(&self, msg: &str);
}

impl RenderSink for Renderer {
    fn header(&self, detail: &str) {
        self.header(detail);
    }

    fn section(&self, title: &str) {
        self.section(title);
    }

    fn activity(&self, text: &str) {
        self.activity(text);
    }

    fn field(&self, key: &str, value: &str) {
        self.field(key, value);
    }

    fn detail(&self, text: &str) {
        self.detail(text);
    }

    fn pane(&self, index: usize, label: &str, tone: PaneTone, text: &str) {
        self.pane(index, label, tone, text);
    }

    fn warn(&self, msg: &str) {
        self.warn(msg);
    }

    fn error(&self, msg: &str) {
        self.error(msg);
    }

    fn success(&self, msg: &str) {
        self.success(msg);
    }
}

/// Render one launch event as a pane progress line.
///
/// Intermediate settle states are skipped; only steps a user can act on
/// or wait for are shown.
pub fn render_launch_event(sink: &dyn RenderSink, event: &LaunchEvent) {
    let (index, label) = (event.pane_index, event.label.as_str());
    match &event.kind {
        LaunchEventKind::State(PaneState::ProgramStarting) => {
            sink.pane(index, label, PaneTone::Step, "program starting")
        }
        LaunchEventKind::State(PaneState::ProgramReady) => {
            sink.pane(index, label, PaneTone::Step, "sending briefing")
        }
        LaunchEventKind::State(PaneState::Confirmed) => {
            sink.pane(index, label, PaneTone::Ok, "ready")
        }
        LaunchEventKind::State(_) => {}
        LaunchEventKind::StrategyFailed { strategy, error } => {
            sink.warn(&format!("[{index}] {label}: {strategy} delivery failed: {error}"))
        }
        LaunchEventKind::ReadinessTimeout => sink.warn(&format!(
            "[{index}] {label}: readiness marker not seen, sending anyway"
        )),
        LaunchEventKind::Delivered {
            strategy,
            elapsed,
            fallbacks,
        } => {
            let mut text = format!("delivered via {strategy} in {}", format_duration(*elapsed));
            if *fallbacks > 0 {
                text.push_str(&format!(" after {fallbacks} fallback(s)"));
            }
            sink.pane(index, label, PaneTone::Step, &text);
        }
        LaunchEventKind::Failed(error) => sink.pane(index, label, PaneTone::Failed, error),
    }
}

/// Closing summary for a finished run.
pub fn render_run_report(sink: &dyn RenderSink, report: &RunReport) {
    sink.section("Summary");
    sink.field("session", &report.session.name);
    sink.field("elapsed", &format_duration(report.elapsed));
    for pane in report.panes.iter().filter(|pane| !pane.confirmed()) {
        let reason = pane.error.as_deref().unwrap_or("unknown failure");
        sink.pane(pane.index, &pane.label, PaneTone::Failed, reason);
    }
    if report.failures() == 0 {
        sink.success(&report.summary());
    } else {
        sink.warn(&report.summary());
    }
}

/// Compact human duration: `850ms`, `4.2s`, `3m07s`.
pub fn format_duration(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    if millis < 1000 {
        return format!("{millis}ms");
    }
    let secs = elapsed.as_secs();
    if secs < 60 {
        return format!("{:.1}s", elapsed.as_secs_f64());
    }
    format!("{}m{:02}s", secs / 60, secs % 60)
}
