//! Config-path helpers and `panelaunch init`.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ConfigError;

use super::defaults::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_CONFIG_TEMPLATE};
use super::GlobalConfigInitResult;

/// Per-user config path (`~/.config/panelaunch/panelaunch.toml`).
pub fn default_global_config_path() -> Option<PathBuf> {
    config_root_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Write the bundled template to the global config path.
///
/// Without `force` an existing file is left alone. With `force` the old
/// file is moved aside to a timestamped backup first.
pub fn initialize_default_global_config(
    force: bool,
) -> Result<GlobalConfigInitResult, ConfigError> {
    let path = default_global_config_path().ok_or_else(|| {
        ConfigError::Invalid("no per-user config directory (set XDG_CONFIG_HOME or HOME)".into())
    })?;
    initialize_config_at_path(&path, force)
}

pub(super) fn initialize_config_at_path(
    path: &Path,
    force: bool,
) -> Result<GlobalConfigInitResult, ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let path_buf = path.to_path_buf();

    if !path.exists() {
        if write_template_new(path)? {
            return Ok(GlobalConfigInitResult::Created { path: path_buf });
        }
        // Lost a race with another `init`; theirs stands.
        return Ok(GlobalConfigInitResult::AlreadyInitialized { path: path_buf });
    }
    if !force {
        return Ok(GlobalConfigInitResult::AlreadyInitialized { path: path_buf });
    }

    let backup_path = free_backup_path(path);
    fs::rename(path, &backup_path)?;
    write_template_new(path)?;
    Ok(GlobalConfigInitResult::Overwritten {
        path: path_buf,
        backup_path,
    })
}

/// Create `path` with the template; `false` if it already exists.
fn write_template_new(path: &Path) -> Result<bool, ConfigError> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => {
            file.write_all(DEFAULT_CONFIG_TEMPLATE.as_bytes())?;
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(ConfigError::Io(e)),
    }
}

/// `panelaunch.toml.bak-<unix secs>`, with `-N` appended on collision.
fn free_backup_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| CONFIG_FILE_NAME.to_string());
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0);
    let mut candidate = path.with_file_name(format!("{name}.bak-{secs}"));
    let mut attempt = 1u32;
    while candidate.exists() {
        candidate = path.with_file_name(format!("{name}.bak-{secs}-{attempt}"));
        attempt += 1;
    }
    candidate
}

/// `$XDG_CONFIG_HOME`, else `~/.config`, else the platform config dir.
pub fn config_root_dir() -> Option<PathBuf> {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .or_else(dirs::config_dir)
}
