//! Optional external delivery helper.
//!
//! A helper is any executable called as `HELPER TARGET MESSAGE` that types
//! the message into the target and submits it once.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::TransportError;
use crate::types::PaneTarget;

use super::process::{ensure_success, run_process};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryHelper {
    path: PathBuf,
}

impl DeliveryHelper {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_available(&self) -> bool {
        self.path.is_file()
    }

    /// Send `message` plus one submit through the helper.
    pub async fn deliver(&self, target: &PaneTarget, message: &str) -> Result<(), TransportError> {
        let program = self.path.display().to_string();
        debug!(helper = %program, %target, bytes = message.len(), "delivery helper");
        let output = run_process(&program, &[target.to_string(), message.to_string()]).await?;
        ensure_success(output, format!("delivery helper {program} failed")).map(|_| ())
    }
}
