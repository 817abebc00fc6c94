//! Type-safe Git command builder for consistent command execution
//!
//! This module provides a fluent API for building and executing Git commands,
//! eliminating duplication and ensuring consistent error handling across the
//! version-control adapter.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::core::SkmError;
use crate::utils::platform::get_git_command;

/// Builder for constructing and executing Git commands.
///
/// Handles working-directory selection via `-C`, timeout management, output
/// capture, and mapping non-zero exits to [`SkmError::GitCommandError`].
/// New commands default to a 5-minute timeout, which covers clone operations
/// on slow links without hanging forever on stuck authentication prompts.
pub struct GitCommand {
    /// Command arguments to pass to Git (e.g. ["clone", "url", "path"])
    args: Vec<String>,

    /// Working directory for command execution (defaults to current directory)
    current_dir: Option<std::path::PathBuf>,

    /// Maximum duration to wait for command completion (None = no timeout)
    timeout_duration: Option<Duration>,
}

impl Default for GitCommand {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            current_dir: None,
            // Default timeout of 5 minutes for most git operations
            timeout_duration: Some(Duration::from_secs(300)),
        }
    }
}

impl GitCommand {
    /// Creates a new Git command builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the working directory for Git command execution.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Adds a single argument to the Git command.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds multiple arguments to the Git command.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Overrides the default timeout.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout_duration = Some(duration);
        self
    }

    /// Execute the command and return the output.
    pub async fn execute(self) -> Result<GitCommandOutput> {
        let start = std::time::Instant::now();
        let git_command = get_git_command();
        let mut cmd = Command::new(git_command);

        // Build the full arguments list including -C flag if needed, so git
        // operations are independent of the process's current directory.
        let mut full_args = Vec::new();
        if let Some(ref dir) = self.current_dir {
            full_args.push("-C".to_string());
            full_args.push(dir.display().to_string());
        }
        full_args.extend(self.args.clone());

        cmd.args(&full_args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.stdin(Stdio::null());

        tracing::debug!(target: "git", "Executing command: {} {}", git_command, full_args.join(" "));

        let operation = effective_operation(&full_args);
        let output_future = cmd.output();

        let output = if let Some(duration) = self.timeout_duration {
            match timeout(duration, output_future).await {
                Ok(result) => result
                    .context(format!("Failed to execute git {}", full_args.join(" ")))?,
                Err(_) => {
                    tracing::warn!(
                        target: "git",
                        "Command timed out after {} seconds: git {}",
                        duration.as_secs(),
                        full_args.join(" ")
                    );
                    return Err(SkmError::GitCommandError {
                        operation,
                        stderr: format!(
                            "git command timed out after {} seconds; try running it manually: git {}",
                            duration.as_secs(),
                            full_args.join(" ")
                        ),
                    }
                    .into());
                }
            }
        } else {
            output_future
                .await
                .context(format!("Failed to execute git {}", full_args.join(" ")))?
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!(
                target: "git",
                "Command failed with exit code {:?}: {}",
                output.status.code(),
                stderr.trim()
            );
            return Err(SkmError::GitCommandError {
                operation,
                stderr: stderr.to_string(),
            }
            .into());
        }

        let elapsed = start.elapsed();
        if elapsed.as_secs() > 1 {
            tracing::debug!(target: "git", "Git {} took {:.2}s", operation, elapsed.as_secs_f64());
        }

        Ok(GitCommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        })
    }

    /// Execute the command and return only stdout as a trimmed string.
    pub async fn execute_stdout(self) -> Result<String> {
        let output = self.execute().await?;
        Ok(output.stdout.trim().to_string())
    }

    /// Execute the command and check for success without inspecting output.
    pub async fn execute_success(self) -> Result<()> {
        self.execute().await?;
        Ok(())
    }
}

/// Skips the `-C <dir>` prefix when naming the failing operation.
fn effective_operation(full_args: &[String]) -> String {
    let args_start =
        if full_args.first().map(String::as_str) == Some("-C") && full_args.len() > 2 { 2 } else { 0 };
    full_args.get(args_start).cloned().unwrap_or_else(|| "unknown".to_string())
}

/// Output from a Git command.
pub struct GitCommandOutput {
    /// Standard output from the Git command
    pub stdout: String,
}

// Convenience builders for the operations the vcs adapter needs

impl GitCommand {
    /// Lists tag refs on a remote without cloning it.
    pub fn ls_remote_tags(url: &str) -> Self {
        Self::new().args(["ls-remote", "--tags", "--refs", url])
    }

    /// Shallow single-revision clone of a tag or branch.
    pub fn clone_shallow(url: &str, reference: &str, target: impl AsRef<Path>) -> Self {
        Self::new()
            .args(["clone", "--depth", "1", "--branch", reference, url])
            .arg(target.as_ref().display().to_string())
    }

    /// Full clone, used as the fallback when the requested revision is a
    /// commit hash that `--branch` cannot address.
    pub fn clone_full(url: &str, target: impl AsRef<Path>) -> Self {
        Self::new().args(["clone", url]).arg(target.as_ref().display().to_string())
    }

    /// Checkout of a specific reference inside an existing clone.
    pub fn checkout(reference: &str) -> Self {
        Self::new().args(["checkout", "--detach", reference])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_operation_skips_dir_flag() {
        let args =
            vec!["-C".to_string(), "/tmp/repo".to_string(), "checkout".to_string(), "v1".to_string()];
        assert_eq!(effective_operation(&args), "checkout");

        let bare = vec!["ls-remote".to_string()];
        assert_eq!(effective_operation(&bare), "ls-remote");
    }
}
