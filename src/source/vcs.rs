//! Version-control source adapter.
//!
//! Fetches skills from git repositories using the system git command. The
//! "latest" version is the *last* tag in the remote listing order, not a
//! semantic-version maximum; this is a documented limitation of tag-based
//! resolution, kept deliberately.

use super::{DownloadResult, Source, SourceAdapter, SourceKind, staging_dir};
use crate::core::SkmError;
use crate::git;
use anyhow::{Context, Result};
use futures::FutureExt;
use futures::future::BoxFuture;

/// Adapter for the `vcs` source kind.
pub struct VcsAdapter;

impl VcsAdapter {
    /// Creates the adapter.
    pub fn new() -> Self {
        Self
    }

    async fn latest_tag(url: &str) -> Result<String> {
        let tags = git::list_remote_tags(url).await.map_err(|e| SkmError::NetworkError {
            operation: "latest-version".to_string(),
            resource: url.to_string(),
            reason: format!("{e:#}"),
        })?;

        // Last tag in listing order wins; no semver comparison.
        tags.last().cloned().ok_or_else(|| {
            SkmError::NetworkError {
                operation: "latest-version".to_string(),
                resource: url.to_string(),
                reason: "repository has no tags".to_string(),
            }
            .into()
        })
    }

    async fn download_inner(source: &Source, version: &str) -> Result<DownloadResult> {
        let version = if version.is_empty() {
            Self::latest_tag(&source.url).await?
        } else {
            version.to_string()
        };

        let staging = staging_dir()?;
        let checkout = staging.path().join("checkout");

        git::checkout_revision(&source.url, &version, &checkout)
            .await
            .map_err(|e| SkmError::NetworkError {
                operation: "download".to_string(),
                resource: source.url.clone(),
                reason: format!("{e:#}"),
            })
            .with_context(|| {
                format!("Failed to fetch revision '{version}' from {}", source.url)
            })?;

        Ok(DownloadResult {
            path: checkout,
            version,
            from_external_lock: source.is_externally_locked(),
            staging: Some(staging),
        })
    }
}

impl Default for VcsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceAdapter for VcsAdapter {
    fn source_kind(&self) -> SourceKind {
        SourceKind::Vcs
    }

    fn download<'a>(
        &'a self,
        source: &'a Source,
        version: &'a str,
    ) -> BoxFuture<'a, Result<DownloadResult>> {
        Self::download_inner(source, version).boxed()
    }

    fn get_latest_version<'a>(&'a self, source: &'a Source) -> BoxFuture<'a, Result<String>> {
        Self::latest_tag(&source.url).boxed()
    }
}
