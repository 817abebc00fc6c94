//! File-level diff engine for update previews.
//!
//! Compares two directory snapshots and reports added, removed, and
//! modified files, with a line-granularity patch for text modifications.
//! Output is sorted ascending by path so previews are deterministic
//! regardless of walk order.

use crate::utils::normalize_path_for_storage;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Classification of a single file's change between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffStatus {
    /// Present only in the new snapshot
    Added,
    /// Present only in the old snapshot
    Removed,
    /// Present in both with differing content
    Modified,
}

impl std::fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Removed => write!(f, "removed"),
            Self::Modified => write!(f, "modified"),
        }
    }
}

/// One changed file in a diff between two snapshots.
#[derive(Debug, Clone, Serialize)]
pub struct FileDiff {
    /// Relative path within the skill tree, forward-slash normalized
    pub path: String,
    /// What happened to the file
    pub status: DiffStatus,
    /// Line-level patch. Empty for added/removed files and for binary content.
    pub patch: String,
}

/// Computes file diffs between two directory snapshots.
///
/// A missing `old_dir` or `new_dir` is treated as "no files", so a first
/// install previews every file as added. Byte-identical files are omitted
/// entirely; results are sorted ascending by path.
pub fn compute_file_diffs(old_dir: &Path, new_dir: &Path) -> Result<Vec<FileDiff>> {
    let old_files = snapshot(old_dir)?;
    let new_files = snapshot(new_dir)?;

    let mut diffs = Vec::new();

    // BTreeMap iteration is already path-ascending; merging the two sorted
    // key sets keeps the output ordered without a final sort.
    for (path, old_content) in &old_files {
        match new_files.get(path) {
            None => diffs.push(FileDiff {
                path: path.clone(),
                status: DiffStatus::Removed,
                patch: String::new(),
            }),
            Some(new_content) if new_content != old_content => {
                let patch = if is_binary(old_content) || is_binary(new_content) {
                    String::new()
                } else {
                    render_line_patch(
                        &String::from_utf8_lossy(old_content),
                        &String::from_utf8_lossy(new_content),
                    )
                };
                diffs.push(FileDiff {
                    path: path.clone(),
                    status: DiffStatus::Modified,
                    patch,
                });
            }
            Some(_) => {} // identical, omitted
        }
    }

    for path in new_files.keys() {
        if !old_files.contains_key(path) {
            diffs.push(FileDiff {
                path: path.clone(),
                status: DiffStatus::Added,
                patch: String::new(),
            });
        }
    }

    diffs.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(diffs)
}

/// Builds a path → content map for a directory tree.
///
/// Non-existent directories produce an empty map.
fn snapshot(dir: &Path) -> Result<BTreeMap<String, Vec<u8>>> {
    let mut files = BTreeMap::new();
    if dir.as_os_str().is_empty() || !dir.exists() {
        return Ok(files);
    }

    for entry in WalkDir::new(dir).follow_links(false) {
        let entry =
            entry.with_context(|| format!("Failed to walk directory: {}", dir.display()))?;
        if entry.file_type().is_file() {
            let path = entry.path();
            let relative = normalize_path_for_storage(path.strip_prefix(dir).unwrap_or(path));
            let content = fs::read(path)
                .with_context(|| format!("Failed to read file for diff: {}", path.display()))?;
            files.insert(relative, content);
        }
    }

    Ok(files)
}

/// Content containing a NUL byte is treated as binary.
fn is_binary(content: &[u8]) -> bool {
    content.contains(&0)
}

/// Renders a line-level patch between two text contents.
///
/// Lines are aligned with a longest-common-subsequence pass; the rendering
/// prefixes unchanged lines with a space, insertions with `+`, and deletions
/// with `-`, one line per output line. A trailing empty fragment (from a
/// final newline) is omitted from both sides.
fn render_line_patch(old: &str, new: &str) -> String {
    let old_lines = split_lines(old);
    let new_lines = split_lines(new);

    let mut patch = String::new();
    for op in align_lines(&old_lines, &new_lines) {
        match op {
            LineOp::Keep(line) => {
                patch.push(' ');
                patch.push_str(line);
            }
            LineOp::Delete(line) => {
                patch.push('-');
                patch.push_str(line);
            }
            LineOp::Insert(line) => {
                patch.push('+');
                patch.push_str(line);
            }
        }
        patch.push('\n');
    }
    patch
}

fn split_lines(content: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = content.split('\n').collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }
    lines
}

enum LineOp<'a> {
    Keep(&'a str),
    Delete(&'a str),
    Insert(&'a str),
}

/// Aligns two line sequences via a longest-common-subsequence table and
/// walks it back into an ordered op list.
fn align_lines<'a>(old: &[&'a str], new: &[&'a str]) -> Vec<LineOp<'a>> {
    let n = old.len();
    let m = new.len();

    // lcs[i][j] = LCS length of old[i..] and new[j..]
    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if old[i] == new[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut ops = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            ops.push(LineOp::Keep(old[i]));
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            ops.push(LineOp::Delete(old[i]));
            i += 1;
        } else {
            ops.push(LineOp::Insert(new[j]));
            j += 1;
        }
    }
    while i < n {
        ops.push(LineOp::Delete(old[i]));
        i += 1;
    }
    while j < m {
        ops.push(LineOp::Insert(new[j]));
        j += 1;
    }
    ops
}
