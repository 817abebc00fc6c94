//! Core types and error handling for the skill manager.
//!
//! This module hosts the crate-wide error type ([`SkmError`]) and the small
//! shared constants every other module leans on (manifest filename, default
//! proxy chain, environment variable names).

pub mod error;

pub use error::{SkmError, display_error, is_network_error};

/// Name of the manifest file searched for in the working directory.
pub const MANIFEST_FILE: &str = "skm.toml";

/// Default module-proxy fallback chain used when [`PROXY_ENV`] is unset.
///
/// A single public proxy followed by `direct`, matching the conventional
/// module-proxy default.
pub const DEFAULT_SKILL_PROXY: &str = "https://proxy.golang.org,direct";

/// Environment variable holding the module-proxy fallback chain.
pub const PROXY_ENV: &str = "SKM_SKILL_PROXY";

/// Environment variable overriding the staging directory for downloads.
pub const TMPDIR_ENV: &str = "SKM_TMPDIR";
