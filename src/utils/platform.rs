//! Platform-specific helpers.
//!
//! Currently limited to locating the system git executable; kept as its own
//! module so platform quirks stay out of the command builder.

use crate::core::SkmError;
use anyhow::Result;

/// Returns the git command name for the current platform.
///
/// Windows resolves `git.exe` explicitly; Unix-like systems rely on PATH
/// resolution of `git`.
pub const fn get_git_command() -> &'static str {
    if cfg!(windows) { "git.exe" } else { "git" }
}

/// Returns true when a git executable can be found on PATH.
pub fn is_git_installed() -> bool {
    which::which(get_git_command()).is_ok()
}

/// Fails with [`SkmError::GitNotFound`] when git is unavailable.
///
/// Called once before the first subprocess invocation so users get a clear
/// installation hint instead of a spawn error.
pub fn ensure_git_available() -> Result<()> {
    if is_git_installed() {
        Ok(())
    } else {
        Err(SkmError::GitNotFound.into())
    }
}
