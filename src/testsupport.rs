//! Scratch-directory fixture for tests that touch the filesystem.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_FIXTURE: AtomicU64 = AtomicU64::new(0);

/// A fresh directory under the system temp dir, removed on drop.
#[derive(Debug)]
pub struct TestTempDir {
    root: PathBuf,
}

impl TestTempDir {
    pub fn new(scenario: &str) -> Self {
        let serial = NEXT_FIXTURE.fetch_add(1, Ordering::Relaxed);
        let root = std::env::temp_dir().join(format!(
            "panelaunch-{scenario}-{}-{serial}",
            std::process::id()
        ));
        // Leftovers from a crashed run with the same pid would leak state.
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).expect("create fixture dir");
        Self { root }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn child(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Create `relative` (and its parents) as a directory.
    pub fn mkdir(&self, relative: &str) -> PathBuf {
        let dir = self.child(relative);
        fs::create_dir_all(&dir).expect("create fixture subdir");
        dir
    }

    pub fn write_text(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.child(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture parent");
        }
        fs::write(&path, content).expect("write fixture file");
        path
    }

    /// Write an executable `sh` script, e.g. a stand-in delivery helper.
    #[cfg(unix)]
    pub fn write_script(&self, relative: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.write_text(relative, &format!("#!/bin/sh\n{body}"));
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod script");
        path
    }
}

impl Drop for TestTempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_files_get_their_parents() {
        let fixture = TestTempDir::new("fixture");
        let file = fixture.write_text("prompts/prompt_docs.md", "hello");
        assert_eq!(fs::read_to_string(file).expect("read back"), "hello");
        assert!(fixture.child("prompts").is_dir());
    }

    #[test]
    fn fixtures_are_distinct_and_removed_on_drop() {
        let first = TestTempDir::new("drop");
        let second = TestTempDir::new("drop");
        assert_ne!(first.path(), second.path());
        let path = first.path().to_path_buf();
        drop(first);
        assert!(!path.exists());
        assert!(second.path().is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn scripts_are_executable() {
        use std::os::unix::fs::PermissionsExt;

        let fixture = TestTempDir::new("script");
        let script = fixture.write_script("bin/helper.sh", "exit 0\n");
        let mode = fs::metadata(&script).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }
}
