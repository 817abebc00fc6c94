//! File system utilities shared across the skill manager.
//!
//! These helpers wrap the standard library with consistent error context and
//! the small behavioral guarantees the rest of the crate depends on:
//! recursive copies preserve permission bits, removals tolerate missing
//! paths, and manifest writes are atomic (write to a temp file, rename into
//! place) so a crash never leaves a half-written file.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Creates a directory and all parent directories if they don't exist.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Creates the parent directory of `path` if needed.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    Ok(())
}

/// Recursively copies a directory and all its contents to a new location.
///
/// Creates the destination if it doesn't exist and preserves the directory
/// structure. Only regular files and directories are copied; symlinks and
/// special files are skipped. `fs::copy` carries permission bits across on
/// Unix, so executable skill scripts stay executable.
pub fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    ensure_dir(dst)?;

    for entry in
        fs::read_dir(src).with_context(|| format!("Failed to read directory: {}", src.display()))?
    {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if file_type.is_dir() {
            copy_dir(&src_path, &dst_path)?;
        } else if file_type.is_file() {
            fs::copy(&src_path, &dst_path).with_context(|| {
                format!("Failed to copy file from {} to {}", src_path.display(), dst_path.display())
            })?;
        }
        // Skip symlinks and other file types
    }

    Ok(())
}

/// Recursively removes a directory and all its contents.
///
/// Safe to call on non-existent directories; cleanup paths may or may not
/// exist depending on prior operations.
pub fn remove_dir_all(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Writes content to a file atomically.
///
/// Writes to a temporary sibling first, syncs, then renames into place.
/// The destination file is never observable in a partial state.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    use std::io::Write;

    ensure_parent_dir(path)?;

    let temp_path = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;
        file.write_all(content)
            .with_context(|| format!("Failed to write to temp file: {}", temp_path.display()))?;
        file.sync_all().context("Failed to sync file to disk")?;
    }

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

    Ok(())
}

/// Normalizes a relative path for deterministic storage and hashing.
///
/// Backslashes become forward slashes so hashes and diff listings agree
/// across platforms.
pub fn normalize_path_for_storage(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Expands a user-supplied install-target path.
///
/// Handles `~` and `~user` prefixes and environment variables, so manifests
/// can carry targets like `~/.claude/skills`.
pub fn expand_target_path(raw: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw)
        .with_context(|| format!("Failed to expand install target path: {raw}"))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn copy_dir_recurses_and_overwrites() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("a.txt"), "alpha").unwrap();
        fs::write(src.join("nested/b.txt"), "beta").unwrap();
        fs::create_dir_all(&dst).unwrap();
        fs::write(dst.join("a.txt"), "stale").unwrap();

        copy_dir(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("a.txt")).unwrap(), "alpha");
        assert_eq!(fs::read_to_string(dst.join("nested/b.txt")).unwrap(), "beta");
    }

    #[test]
    fn remove_dir_all_tolerates_missing() {
        let tmp = TempDir::new().unwrap();
        remove_dir_all(&tmp.path().join("never-created")).unwrap();
    }

    #[test]
    fn atomic_write_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("deep/nested/file.toml");
        atomic_write(&path, b"content").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "content");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn normalize_uses_forward_slashes() {
        let p = Path::new("a").join("b").join("c.txt");
        assert_eq!(normalize_path_for_storage(&p), "a/b/c.txt");
    }
}
