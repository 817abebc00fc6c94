//! Source resolution: the pluggable protocol that turns a logical source
//! descriptor into downloaded bytes and a resolved version.
//!
//! Exactly one adapter instance exists per source kind. Dispatch goes
//! through [`AdapterRegistry`], keyed by the closed [`SourceKind`] enum, so
//! unknown kinds are rejected when a manifest is validated instead of at
//! first use. Two adapters ship with the crate:
//!
//! - [`vcs::VcsAdapter`] — clones a version-control repository at a single
//!   revision via the system git command
//! - [`proxy::ModuleProxyAdapter`] — speaks the module-proxy HTTP protocol
//!   with a layered fallback chain

pub mod proxy;
pub mod vcs;

use crate::core::{SkmError, TMPDIR_ENV};
use anyhow::Result;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// The closed set of source families a skill can be fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Version-control clone (git)
    Vcs,
    /// Module-registry proxy (HTTP, `@latest` / `@v/{version}.zip`)
    ModuleProxy,
}

impl SourceKind {
    /// All kinds, in display order.
    pub const ALL: [Self; 2] = [Self::Vcs, Self::ModuleProxy];

    /// Comma-separated list of supported kind strings, for error messages.
    pub fn supported_kinds() -> String {
        Self::ALL.map(|k| k.to_string()).join(", ")
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vcs => write!(f, "vcs"),
            Self::ModuleProxy => write!(f, "module-proxy"),
        }
    }
}

impl FromStr for SourceKind {
    type Err = SkmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vcs" => Ok(Self::Vcs),
            "module-proxy" => Ok(Self::ModuleProxy),
            other => Err(SkmError::UnsupportedSourceKind {
                kind: other.to_string(),
                supported: Self::supported_kinds(),
            }),
        }
    }
}

/// Ephemeral source descriptor built from a skill for a single adapter call.
///
/// Not persisted; `options` carries per-call adapter knobs such as a proxy
/// chain override (`"proxy"`) or external-lock delegation (`"external-lock"`).
#[derive(Debug, Clone)]
pub struct Source {
    /// Which adapter family handles this source
    pub kind: SourceKind,
    /// Repository URL (vcs) or module path (module-proxy)
    pub url: String,
    /// Per-call adapter options
    pub options: HashMap<String, String>,
}

impl Source {
    /// Creates a source with no options.
    pub fn new(kind: SourceKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            options: HashMap::new(),
        }
    }

    /// True when the source delegates version/integrity to an external lock
    /// mechanism.
    pub fn is_externally_locked(&self) -> bool {
        self.options.get("external-lock").is_some_and(|v| v == "true")
    }
}

/// Result of a successful adapter download.
#[derive(Debug)]
pub struct DownloadResult {
    /// Locally materialized directory holding the fetched tree
    pub path: PathBuf,
    /// The version that was actually fetched
    pub version: String,
    /// True when version/integrity is owned by an external lock mechanism;
    /// the orchestrator must then leave the manifest's version/hash empty
    /// rather than caching a point-in-time value
    pub from_external_lock: bool,
    /// Keeps the staging directory alive until the result is dropped
    pub staging: Option<tempfile::TempDir>,
}

/// Contract every source adapter implements.
///
/// Methods return boxed futures so adapters can live behind
/// `Arc<dyn SourceAdapter>` in the registry.
pub trait SourceAdapter: Send + Sync {
    /// The kind this adapter serves; used as the registry key.
    fn source_kind(&self) -> SourceKind;

    /// Fetches `version` of the source into a staging directory.
    ///
    /// An empty `version` means "latest": the adapter resolves it first and
    /// reports the resolved value in the returned [`DownloadResult`].
    fn download<'a>(
        &'a self,
        source: &'a Source,
        version: &'a str,
    ) -> BoxFuture<'a, Result<DownloadResult>>;

    /// Resolves the latest available version of the source.
    fn get_latest_version<'a>(&'a self, source: &'a Source) -> BoxFuture<'a, Result<String>>;
}

/// Registry mapping each [`SourceKind`] to its adapter instance.
pub struct AdapterRegistry {
    adapters: HashMap<SourceKind, Arc<dyn SourceAdapter>>,
}

impl AdapterRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// Creates a registry with the built-in vcs and module-proxy adapters.
    pub fn with_default_adapters() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(vcs::VcsAdapter::new()));
        registry.register(Arc::new(proxy::ModuleProxyAdapter::new()));
        registry
    }

    /// Registers an adapter under its own kind, replacing any previous one.
    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) {
        self.adapters.insert(adapter.source_kind(), adapter);
    }

    /// Selects the adapter for a kind string.
    ///
    /// Empty and unknown kinds fail with an error enumerating the supported
    /// kinds.
    pub fn get(&self, kind: &str) -> Result<Arc<dyn SourceAdapter>> {
        let parsed = SourceKind::from_str(kind)?;
        self.adapters.get(&parsed).cloned().ok_or_else(|| {
            SkmError::UnsupportedSourceKind {
                kind: kind.to_string(),
                supported: self
                    .adapters
                    .keys()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            }
            .into()
        })
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_default_adapters()
    }
}

/// Creates a staging directory for downloads.
///
/// Honors the `SKM_TMPDIR` working-directory override; otherwise the system
/// temp directory is used.
pub fn staging_dir() -> Result<tempfile::TempDir> {
    let builder = {
        let mut b = tempfile::Builder::new();
        b.prefix("skm-");
        b
    };

    let dir = match std::env::var(TMPDIR_ENV) {
        Ok(base) if !base.is_empty() => {
            crate::utils::ensure_dir(std::path::Path::new(&base))?;
            builder.tempdir_in(base)?
        }
        _ => builder.tempdir()?,
    };
    Ok(dir)
}
