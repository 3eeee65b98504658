//! Locating the file to patch.
//!
//! Workspace priority:
//! 1. `--workspace` flag
//! 2. `PROGRESS_PATCHER_WORKSPACE` environment variable (if the path exists)
//! 3. Current directory
//!
//! The target file is joined onto the workspace. An absolute target ignores
//! the workspace entirely.

use std::env;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const WORKSPACE_ENV: &str = "PROGRESS_PATCHER_WORKSPACE";

/// Resolve the workspace from the CLI flag, the environment and the current directory.
pub fn resolve_workspace(cli_workspace: Option<PathBuf>) -> io::Result<PathBuf> {
    resolve_workspace_from(cli_workspace, env::var_os(WORKSPACE_ENV), env::current_dir)
}

/// Same as [`resolve_workspace`] with the environment passed in explicitly.
pub fn resolve_workspace_from(
    cli_workspace: Option<PathBuf>,
    env_workspace: Option<OsString>,
    current_dir: impl FnOnce() -> io::Result<PathBuf>,
) -> io::Result<PathBuf> {
    if let Some(path) = cli_workspace {
        return path.canonicalize();
    }

    if let Some(value) = env_workspace.filter(|v| !v.is_empty()) {
        let path = PathBuf::from(&value);
        if path.exists() {
            return path.canonicalize();
        }
        warn!(
            "{} is set but path doesn't exist: {}",
            WORKSPACE_ENV,
            path.display()
        );
    }

    current_dir()
}

pub fn resolve_target(workspace: &Path, file: &Path) -> PathBuf {
    workspace.join(file)
}
