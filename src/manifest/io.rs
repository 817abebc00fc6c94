//! Manifest load/save operations.
//!
//! Loading either succeeds with a parsed [`Manifest`] or fails with a typed
//! error; saving validates structure first and writes atomically so the file
//! on disk is never partially written.

use super::Manifest;
use crate::core::SkmError;
use crate::utils::atomic_write;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

impl Manifest {
    /// Loads a manifest from `path`.
    ///
    /// Returns [`SkmError::ManifestNotFound`] when the file does not exist
    /// and [`SkmError::ManifestParseError`] on invalid TOML. Structural
    /// validation runs at load time too, so an unknown source kind is
    /// rejected here rather than at first adapter dispatch.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SkmError::ManifestNotFound.into());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest file: {}", path.display()))?;

        let manifest: Self = toml::from_str(&content).map_err(|e| SkmError::ManifestParseError {
            file: path.display().to_string(),
            reason: e.to_string(),
        })?;

        manifest.validate()?;
        Ok(manifest)
    }

    /// Saves the manifest to `path`.
    ///
    /// Structurally invalid manifests (duplicate names, unknown source
    /// kinds, missing required fields) are rejected before anything touches
    /// the disk. The write itself goes through a temp-file rename.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;

        let content =
            toml::to_string_pretty(self).context("Failed to serialize manifest to TOML")?;

        atomic_write(path, content.as_bytes())
            .with_context(|| format!("Failed to write manifest file: {}", path.display()))?;

        tracing::debug!("Saved manifest with {} skill(s) to {}", self.skills.len(), path.display());
        Ok(())
    }
}
