//! Compile-time build metadata exposed to CLI surfaces.

/// Semver package version from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// VCS commit hash captured at build time.
pub const GIT_COMMIT: &str = env!("PANELAUNCH_BUILD_GIT_HASH");

/// Build timestamp captured at compile time.
pub const BUILD_TIMESTAMP: &str = env!("PANELAUNCH_BUILD_TIMESTAMP");

/// Help trailer block that surfaces build metadata in `panelaunch --help`.
pub const HELP_BUILD_METADATA: &str = concat!(
    "Build metadata:\n  commit: ",
    env!("PANELAUNCH_BUILD_GIT_HASH"),
    "\n  built: ",
    env!("PANELAUNCH_BUILD_TIMESTAMP")
);

/// Render the one-line banner shown before a launch run.
pub fn banner_metadata_line() -> String {
    format!("v{VERSION} ({GIT_COMMIT}, built {BUILD_TIMESTAMP})")
}
