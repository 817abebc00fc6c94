//! Module-registry source adapter.
//!
//! Speaks the module-proxy HTTP protocol: version metadata from
//! `GET {proxy}/{path}/@latest` and archives from
//! `GET {proxy}/{path}/@v/{version}.zip`, with archive entries rooted at
//! `{path}@{version}/`.
//!
//! # Fallback chains
//!
//! The proxy configuration is a single string with two delimiter levels:
//! comma-separated *fallback groups* tried in order with stop at first
//! success, and pipe-separated *peers* within a group, all tried before the
//! group is considered failed. The first entry of each group is marked as
//! the group's designated fallback continuation point. Two sentinels are
//! recognized: `off` (fail immediately, no network) and `direct` (bypass
//! the proxy and use version-control tag listing / checkout instead).
//!
//! The chain comes from `SKM_SKILL_PROXY`, defaulting to
//! `https://proxy.golang.org,direct`; a per-call `proxy` option on the
//! [`Source`] replaces it for that call only.

use super::{DownloadResult, Source, SourceAdapter, SourceKind, staging_dir};
use crate::core::{DEFAULT_SKILL_PROXY, PROXY_ENV, SkmError};
use crate::git;
use crate::utils::ensure_parent_dir;
use anyhow::{Context, Result, bail};
use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// One entry in a parsed proxy fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEntry {
    /// Proxy base URL, or one of the sentinels `off` / `direct`
    pub url: String,
    /// True for the first entry of each comma-separated group: the chain's
    /// designated fallback continuation point
    pub is_fallback_group: bool,
}

/// Parses a proxy configuration string into its ordered entry list.
///
/// An empty or unset configuration yields the default chain.
pub fn parse_proxy_chain(config: &str) -> Vec<ProxyEntry> {
    let config = if config.trim().is_empty() { DEFAULT_SKILL_PROXY } else { config };

    let mut entries = Vec::new();
    for group in config.split(',') {
        for (i, peer) in group.split('|').enumerate() {
            let peer = peer.trim();
            if peer.is_empty() {
                continue;
            }
            entries.push(ProxyEntry {
                url: peer.trim_end_matches('/').to_string(),
                is_fallback_group: i == 0,
            });
        }
    }
    entries
}

/// JSON document returned by `GET {proxy}/{path}/@latest`.
#[derive(Debug, Deserialize)]
struct LatestInfo {
    #[serde(rename = "Version", default)]
    version: String,
    #[serde(rename = "Time", default)]
    #[allow(dead_code)]
    time: String,
}

/// Adapter for the `module-proxy` source kind.
pub struct ModuleProxyAdapter {
    client: reqwest::Client,
    default_chain: String,
}

impl ModuleProxyAdapter {
    /// Creates the adapter, reading the default chain from `SKM_SKILL_PROXY`.
    pub fn new() -> Self {
        let chain = std::env::var(PROXY_ENV).unwrap_or_default();
        Self::with_chain(&chain)
    }

    /// Creates the adapter with an explicit default chain (tests, embedding).
    pub fn with_chain(chain: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            default_chain: chain.to_string(),
        }
    }

    /// The chain for one call: the per-call override when present, the
    /// adapter default otherwise.
    fn chain_for(&self, source: &Source) -> Vec<ProxyEntry> {
        let config = source.options.get("proxy").map_or(self.default_chain.as_str(), String::as_str);
        parse_proxy_chain(config)
    }

    async fn latest_inner(&self, source: &Source) -> Result<String> {
        let path = source.url.as_str();
        let mut failures = Vec::new();

        for entry in self.chain_for(source) {
            match entry.url.as_str() {
                "off" => return Err(fetch_disabled_error(path)),
                "direct" => match direct_latest(path).await {
                    Ok(version) => return Ok(version),
                    Err(e) => failures.push(format!("direct: {e:#}")),
                },
                proxy => match self.proxy_latest(proxy, path).await {
                    Ok(version) => return Ok(version),
                    Err(e) => failures.push(format!("{proxy}: {e:#}")),
                },
            }
        }

        Err(chain_exhausted_error("latest-version", path, &failures))
    }

    async fn proxy_latest(&self, proxy: &str, path: &str) -> Result<String> {
        let url = format!("{proxy}/{path}/@latest");
        tracing::debug!(target: "proxy", "GET {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;

        match response.status().as_u16() {
            200 => {
                let info: LatestInfo = response
                    .json()
                    .await
                    .with_context(|| format!("invalid @latest response from {proxy}"))?;
                if info.version.is_empty() {
                    bail!("proxy {proxy} returned an empty version for {path}");
                }
                Ok(info.version)
            }
            404 => bail!("module not found: {path}"),
            410 => bail!("module removed: {path}"),
            status => bail!("proxy {proxy} returned status {status} for {path}"),
        }
    }

    async fn download_inner(&self, source: &Source, version: &str) -> Result<DownloadResult> {
        let path = source.url.as_str();
        let mut failures = Vec::new();

        for entry in self.chain_for(source) {
            match entry.url.as_str() {
                "off" => return Err(fetch_disabled_error(path)),
                "direct" => match self.direct_download(source, version).await {
                    Ok(result) => return Ok(result),
                    Err(e) => failures.push(format!("direct: {e:#}")),
                },
                proxy => match self.proxy_download(proxy, source, version).await {
                    Ok(result) => return Ok(result),
                    Err(e) => failures.push(format!("{proxy}: {e:#}")),
                },
            }
        }

        Err(chain_exhausted_error("download", path, &failures))
    }

    /// Downloads `{path}/@v/{version}.zip` from one proxy and extracts it.
    async fn proxy_download(
        &self,
        proxy: &str,
        source: &Source,
        version: &str,
    ) -> Result<DownloadResult> {
        let path = source.url.as_str();
        let version = if version.is_empty() {
            self.proxy_latest(proxy, path).await?
        } else {
            version.to_string()
        };

        let url = format!("{proxy}/{path}/@v/{version}.zip");
        tracing::debug!(target: "proxy", "GET {url}");

        let mut response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;

        match response.status().as_u16() {
            200 => {}
            404 => bail!("module not found: {path}@{version}"),
            status => bail!("proxy {proxy} returned status {status} for {path}@{version}"),
        }

        let staging = staging_dir()?;
        let archive_path = staging.path().join("module.zip");
        let extract_root = staging.path().join("extract");

        // Stream the archive to disk rather than buffering it in memory.
        let mut file = tokio::fs::File::create(&archive_path)
            .await
            .with_context(|| format!("failed to create {}", archive_path.display()))?;
        while let Some(chunk) = response
            .chunk()
            .await
            .with_context(|| format!("failed while streaming {url}"))?
        {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        drop(file);

        let prefix = format!("{path}@{version}/");
        let archive = archive_path.clone();
        let dest = extract_root.clone();
        tokio::task::spawn_blocking(move || extract_module_zip(&archive, &dest, &prefix))
            .await
            .context("zip extraction task panicked")??;

        Ok(DownloadResult {
            path: extract_root,
            version,
            from_external_lock: source.is_externally_locked(),
            staging: Some(staging),
        })
    }

    /// `direct` sentinel: fall back to version-control tag listing and
    /// checkout against the module path served over https.
    async fn direct_download(&self, source: &Source, version: &str) -> Result<DownloadResult> {
        let repo_url = direct_repo_url(&source.url);
        let version = if version.is_empty() {
            direct_latest(&source.url).await?
        } else {
            version.to_string()
        };

        let staging = staging_dir()?;
        let checkout = staging.path().join("checkout");
        git::checkout_revision(&repo_url, &version, &checkout)
            .await
            .with_context(|| format!("direct fetch of {}@{version} failed", source.url))?;

        Ok(DownloadResult {
            path: checkout,
            version,
            from_external_lock: source.is_externally_locked(),
            staging: Some(staging),
        })
    }
}

impl Default for ModuleProxyAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceAdapter for ModuleProxyAdapter {
    fn source_kind(&self) -> SourceKind {
        SourceKind::ModuleProxy
    }

    fn download<'a>(
        &'a self,
        source: &'a Source,
        version: &'a str,
    ) -> BoxFuture<'a, Result<DownloadResult>> {
        self.download_inner(source, version).boxed()
    }

    fn get_latest_version<'a>(&'a self, source: &'a Source) -> BoxFuture<'a, Result<String>> {
        self.latest_inner(source).boxed()
    }
}

async fn direct_latest(path: &str) -> Result<String> {
    let repo_url = direct_repo_url(path);
    let tags = git::list_remote_tags(&repo_url)
        .await
        .with_context(|| format!("direct tag listing for {path} failed"))?;
    tags.last().cloned().ok_or_else(|| anyhow::anyhow!("repository {repo_url} has no tags"))
}

/// Module paths are served over https for direct fetching.
fn direct_repo_url(path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!("https://{path}")
    }
}

fn fetch_disabled_error(path: &str) -> anyhow::Error {
    SkmError::ConfigError {
        message: format!(
            "cannot fetch module '{path}': module fetching is disabled (proxy configuration is 'off')"
        ),
    }
    .into()
}

fn chain_exhausted_error(operation: &str, path: &str, failures: &[String]) -> anyhow::Error {
    SkmError::NetworkError {
        operation: operation.to_string(),
        resource: path.to_string(),
        reason: format!("no proxy in the fallback chain succeeded: [{}]", failures.join("; ")),
    }
    .into()
}

/// Extracts a module archive into `dest`.
///
/// Entries are expected under `prefix` (`{path}@{version}/`); entries
/// without that prefix are skipped. Any entry whose resolved destination
/// would escape `dest` is rejected.
fn extract_module_zip(archive_path: &Path, dest: &Path, prefix: &str) -> Result<()> {
    crate::utils::ensure_dir(dest)?;
    let file = fs::File::open(archive_path)
        .with_context(|| format!("failed to open archive {}", archive_path.display()))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("failed to read archive {}", archive_path.display()))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).context("failed to read archive entry")?;
        let name = entry.name().to_string();

        let Some(relative) = name.strip_prefix(prefix) else {
            tracing::debug!(target: "proxy", "skipping unprefixed archive entry: {name}");
            continue;
        };
        if relative.is_empty() {
            continue;
        }

        let relative_path = sanitized_entry_path(relative)
            .with_context(|| format!("archive entry escapes extraction root: {name}"))?;
        let dest_path = dest.join(relative_path);

        if entry.is_dir() {
            fs::create_dir_all(&dest_path)?;
        } else {
            ensure_parent_dir(&dest_path)?;
            let mut out = fs::File::create(&dest_path)
                .with_context(|| format!("failed to create {}", dest_path.display()))?;
            io::copy(&mut entry, &mut out)
                .with_context(|| format!("failed to extract {name}"))?;
        }
    }

    Ok(())
}

/// Path-traversal guard: rejects absolute entries and any `..` component.
fn sanitized_entry_path(relative: &str) -> Result<PathBuf> {
    let path = Path::new(relative);
    if path.is_absolute() {
        bail!("absolute path in archive");
    }
    for component in path.components() {
        match component {
            Component::Normal(_) => {}
            _ => bail!("illegal path component in archive"),
        }
    }
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    #[test]
    fn chain_parses_groups_and_peers() {
        let entries = parse_proxy_chain("https://proxyA|https://proxyB,direct");
        assert_eq!(
            entries,
            vec![
                ProxyEntry {
                    url: "https://proxyA".to_string(),
                    is_fallback_group: true,
                },
                ProxyEntry {
                    url: "https://proxyB".to_string(),
                    is_fallback_group: false,
                },
                ProxyEntry {
                    url: "direct".to_string(),
                    is_fallback_group: true,
                },
            ]
        );
    }

    #[test]
    fn empty_chain_uses_default() {
        let entries = parse_proxy_chain("");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].url, "https://proxy.golang.org");
        assert!(entries[0].is_fallback_group);
        assert_eq!(entries[1].url, "direct");
        assert!(entries[1].is_fallback_group);
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let entries = parse_proxy_chain("https://proxy.example.com/");
        assert_eq!(entries[0].url, "https://proxy.example.com");
    }

    #[tokio::test]
    async fn off_sentinel_fails_without_any_request() {
        let adapter = ModuleProxyAdapter::with_chain("off");
        let source = Source::new(SourceKind::ModuleProxy, "example.com/skills/demo");

        let err = adapter.get_latest_version(&source).await.unwrap_err();
        assert!(err.to_string().contains("disabled"));

        let err = adapter.download(&source, "v1.0.0").await.unwrap_err();
        assert!(err.to_string().contains("disabled"));
    }

    #[tokio::test]
    async fn per_call_override_replaces_default_chain() {
        // Default chain would try a proxy; the override of "off" must win.
        let adapter = ModuleProxyAdapter::with_chain("https://unreachable.invalid");
        let mut source = Source::new(SourceKind::ModuleProxy, "example.com/skills/demo");
        source.options = HashMap::from([("proxy".to_string(), "off".to_string())]);

        let err = adapter.get_latest_version(&source).await.unwrap_err();
        assert!(err.to_string().contains("disabled"));
    }

    fn write_test_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, content) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn extraction_strips_prefix_and_skips_foreign_entries() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("m.zip");
        let dest = tmp.path().join("out");
        write_test_zip(
            &archive,
            &[
                ("example.com/demo@v1.0.0/SKILL.md", "# demo"),
                ("example.com/demo@v1.0.0/lib/run.sh", "echo hi"),
                ("unrelated/readme.txt", "skip me"),
            ],
        );

        extract_module_zip(&archive, &dest, "example.com/demo@v1.0.0/").unwrap();

        assert_eq!(fs::read_to_string(dest.join("SKILL.md")).unwrap(), "# demo");
        assert_eq!(fs::read_to_string(dest.join("lib/run.sh")).unwrap(), "echo hi");
        assert!(!dest.join("unrelated").exists());
        assert!(!dest.join("readme.txt").exists());
    }

    #[test]
    fn extraction_rejects_path_traversal() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("evil.zip");
        let dest = tmp.path().join("out");
        write_test_zip(&archive, &[("example.com/demo@v1.0.0/../evil.txt", "boom")]);

        let err = extract_module_zip(&archive, &dest, "example.com/demo@v1.0.0/").unwrap_err();
        assert!(err.to_string().contains("escapes extraction root"));
        assert!(!tmp.path().join("evil.txt").exists());
    }
}
