//! Helpers for the live tmux integration tests.
//!
//! Shell and tmux orchestration lives here so the ignored tests in
//! `live_tmux.rs` only carry the launch assertions.

use std::path::PathBuf;
use std::process::Command;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Convenience result alias for harness operations.
pub type HarnessResult<T> = Result<T, String>;

/// Owns one throwaway tmux session name and kills it on drop.
pub struct TmuxHarness {
    session_name: String,
    work_dir: PathBuf,
}

impl TmuxHarness {
    /// Reserve a unique session name and a scratch working directory.
    pub fn new(scenario: &str) -> HarnessResult<Self> {
        verify_tooling_prereqs()?;
        let session_name = format!("panelaunch-live-{scenario}-{}", unique_suffix());
        let work_dir = std::env::temp_dir().join(&session_name);
        std::fs::create_dir_all(&work_dir)
            .map_err(|e| format!("failed creating work dir: {e}"))?;
        Ok(Self {
            session_name,
            work_dir,
        })
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    pub fn work_dir(&self) -> &PathBuf {
        &self.work_dir
    }

    /// Capture the visible text of window `index`.
    pub fn capture_pane(&self, index: usize) -> HarnessResult<String> {
        run_tmux([
            "capture-pane",
            "-p",
            "-J",
            "-S",
            "-",
            "-E",
            "-",
            "-t",
            &format!("{}:{index}", self.session_name),
        ])
    }

    /// Poll captures of window `index` until every needle is present.
    pub fn wait_for_all(
        &self,
        index: usize,
        needles: &[&str],
        timeout: Duration,
    ) -> HarnessResult<String> {
        let deadline = Instant::now() + timeout;
        let mut latest = String::new();
        while Instant::now() < deadline {
            latest = self.capture_pane(index)?;
            if needles.iter().all(|needle| latest.contains(needle)) {
                return Ok(latest);
            }
            thread::sleep(Duration::from_millis(200));
        }
        Err(format!(
            "timed out waiting for pane {index} to contain {needles:?} after {timeout:?}. latest snapshot:\n{latest}"
        ))
    }

    /// Names of the windows currently in the session.
    pub fn window_names(&self) -> HarnessResult<Vec<String>> {
        let listing = run_tmux([
            "list-windows",
            "-t",
            &format!("={}", self.session_name),
            "-F",
            "#{window_name}",
        ])?;
        Ok(listing.lines().map(str::to_string).collect())
    }

    pub fn cleanup(&mut self) {
        let _ = run_tmux(["kill-session", "-t", &format!("={}", self.session_name)]);
        let _ = std::fs::remove_dir_all(&self.work_dir);
    }
}

impl Drop for TmuxHarness {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Fail early with a readable message when tmux is not installed.
pub fn verify_tooling_prereqs() -> HarnessResult<()> {
    let status = Command::new("tmux")
        .arg("-V")
        .status()
        .map_err(|e| format!("tmux is required for live tests: {e}"))?;
    if !status.success() {
        return Err(format!("`tmux -V` exited with {status}"));
    }
    Ok(())
}

fn run_tmux<I, S>(args: I) -> HarnessResult<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let output = Command::new("tmux")
        .args(args)
        .output()
        .map_err(|e| format!("failed running tmux: {e}"))?;
    if !output.status.success() {
        return Err(format!(
            "tmux command failed ({}): {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    format!("{}-{nanos}", std::process::id())
}
