//! Git operations for the version-control source adapter.
//!
//! Uses the system git command (like Cargo does) rather than an embedded
//! library, so users' existing credential helpers, SSH agents, and proxy
//! configuration keep working. All subprocess plumbing lives in
//! [`command_builder::GitCommand`]; this module exposes the two remote
//! operations the adapter needs: tag listing and single-revision checkout.

pub mod command_builder;

use anyhow::{Context, Result};
use std::path::Path;

use crate::utils::platform::ensure_git_available;
use command_builder::GitCommand;

/// Lists tags on a remote repository, in the order the listing returns them.
///
/// Runs `git ls-remote --tags --refs <url>` and strips the `refs/tags/`
/// prefix from each line. No ordering beyond the listing's own is applied;
/// callers that treat the last entry as "latest" inherit the listing order,
/// not a semantic-version maximum.
pub async fn list_remote_tags(url: &str) -> Result<Vec<String>> {
    ensure_git_available()?;

    let stdout = GitCommand::ls_remote_tags(url)
        .execute_stdout()
        .await
        .with_context(|| format!("Failed to list tags for repository: {url}"))?;

    Ok(stdout
        .lines()
        .filter_map(|line| {
            // Each line is "<sha>\trefs/tags/<name>"
            line.split('\t').nth(1).and_then(|r| r.strip_prefix("refs/tags/"))
        })
        .map(ToString::to_string)
        .collect())
}

/// Materializes a single revision of a repository into `target`.
///
/// Tags and branches get a shallow `--depth 1 --branch` clone; raw commit
/// hashes (which `--branch` cannot address) fall back to a full clone plus
/// detached checkout. The `.git` metadata directory is stripped before
/// returning, leaving a plain file tree.
pub async fn checkout_revision(url: &str, reference: &str, target: &Path) -> Result<()> {
    ensure_git_available()?;

    let shallow = GitCommand::clone_shallow(url, reference, target).execute_success().await;

    if shallow.is_err() {
        // --branch rejects commit hashes; retry with a full clone.
        crate::utils::remove_dir_all(target)?;
        GitCommand::clone_full(url, target)
            .execute_success()
            .await
            .with_context(|| format!("Failed to clone repository: {url}"))?;
        GitCommand::checkout(reference)
            .current_dir(target)
            .execute_success()
            .await
            .with_context(|| format!("Failed to checkout revision '{reference}' from {url}"))?;
    }

    strip_git_metadata(target)
}

/// Removes the `.git` directory from a checked-out tree.
///
/// Downloaded skills are content, not working repositories; shipping the
/// metadata directory would make hashes depend on clone internals.
fn strip_git_metadata(target: &Path) -> Result<()> {
    let git_dir = target.join(".git");
    if git_dir.exists() {
        crate::utils::remove_dir_all(&git_dir)
            .with_context(|| format!("Failed to strip git metadata from {}", target.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn strip_git_metadata_removes_only_git_dir() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(".git/objects")).unwrap();
        fs::write(tmp.path().join(".git/HEAD"), "ref: refs/heads/main").unwrap();
        fs::write(tmp.path().join("SKILL.md"), "# demo").unwrap();

        strip_git_metadata(tmp.path()).unwrap();

        assert!(!tmp.path().join(".git").exists());
        assert!(tmp.path().join("SKILL.md").exists());
    }

    #[test]
    fn strip_git_metadata_tolerates_missing() {
        let tmp = TempDir::new().unwrap();
        strip_git_metadata(tmp.path()).unwrap();
    }
}
