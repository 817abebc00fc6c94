//! Content hashing for skill directory trees.
//!
//! A skill's identity on disk is a single SHA-256 digest over every file's
//! relative path and bytes. The combination is order-independent (entries
//! are sorted by normalized relative path before the final digest), so two
//! trees with identical path/content sets always hash equal, and any change
//! to a file's bytes, path, or presence changes the value.

use crate::utils::normalize_path_for_storage;
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// The stable identifier of the hash algorithm in use.
///
/// Stored alongside values for forward compatibility; today only the value
/// itself is persisted in the manifest.
pub const HASH_ALGORITHM: &str = "sha256";

/// Result of hashing a directory tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashResult {
    /// Algorithm identifier, always [`HASH_ALGORITHM`] for now
    pub algorithm: String,
    /// Lowercase hex digest
    pub value: String,
}

/// Computes the content hash of a directory tree.
///
/// Walks the full tree (files only, symlinks not followed), hashes each
/// file, sorts the `(relative path, file digest)` pairs, and digests the
/// sorted listing into the final value.
///
/// CPU-bound; async callers should wrap this in
/// `tokio::task::spawn_blocking`.
pub fn calculate_hash(dir: &Path) -> Result<HashResult> {
    let mut file_hashes: Vec<(String, String)> = Vec::new();

    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry
            .with_context(|| format!("Failed to read directory entry in: {}", dir.display()))?;

        if entry.file_type().is_file() {
            let file_path = entry.path();
            let relative_path =
                normalize_path_for_storage(file_path.strip_prefix(dir).unwrap_or(file_path));

            let content = fs::read(file_path).with_context(|| {
                format!("Failed to read file for hashing: {}", file_path.display())
            })?;
            let mut hasher = Sha256::new();
            hasher.update(&content);
            file_hashes.push((relative_path, hex::encode(hasher.finalize())));
        }
    }

    // Sort by relative path for deterministic ordering
    file_hashes.sort_by(|a, b| a.0.cmp(&b.0));

    let mut hasher = Sha256::new();
    for (path, digest) in &file_hashes {
        hasher.update(format!("{path}:{digest}\n").as_bytes());
    }

    Ok(HashResult {
        algorithm: HASH_ALGORITHM.to_string(),
        value: hex::encode(hasher.finalize()),
    })
}
