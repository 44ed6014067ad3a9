//! Stamps the binary with the commit and build time shown by `--help` and
//! the run banner. Missing git or date tooling degrades to "unknown".

use std::env;
use std::path::Path;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

const COMMIT_ENV: &str = "PANELAUNCH_BUILD_GIT_HASH";
const STAMP_ENV: &str = "PANELAUNCH_BUILD_TIMESTAMP";

fn main() {
    watch_git_head(Path::new(".git"));

    let commit = pinned_or(COMMIT_ENV, || {
        capture("git", &["describe", "--always", "--dirty", "--abbrev=12"])
            .unwrap_or_else(|| "unknown".to_string())
    });
    let stamp = pinned_or(STAMP_ENV, || {
        capture("date", &["-u", "+%Y-%m-%dT%H:%M:%SZ"]).unwrap_or_else(epoch_stamp)
    });

    println!("cargo:rustc-env={COMMIT_ENV}={commit}");
    println!("cargo:rustc-env={STAMP_ENV}={stamp}");
}

/// Value pinned in the environment (reproducible builds), else computed.
fn pinned_or(var: &str, compute: impl FnOnce() -> String) -> String {
    println!("cargo:rerun-if-env-changed={var}");
    env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(compute)
}

/// Rebuild when HEAD moves, including commits on the checked-out branch.
fn watch_git_head(git_dir: &Path) {
    let head = git_dir.join("HEAD");
    println!("cargo:rerun-if-changed={}", head.display());
    let branch_ref = std::fs::read_to_string(&head)
        .ok()
        .and_then(|text| text.trim().strip_prefix("ref: ").map(str::to_string));
    if let Some(branch_ref) = branch_ref {
        println!("cargo:rerun-if-changed={}", git_dir.join(branch_ref).display());
    }
}

fn capture(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    Some(text.trim().to_string()).filter(|text| !text.is_empty())
}

fn epoch_stamp() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0);
    format!("unix:{secs}")
}
