//! Error handling for SKM
//!
//! This module provides the typed error enum used across the skill manager,
//! plus helpers for turning low-level failures into actionable CLI messages.
//! The error system is designed around two principles:
//! 1. **Strongly-typed errors** for precise handling in code
//! 2. **User-friendly messages** that name the resource involved and, where
//!    possible, the corrective action
//!
//! # Error Categories
//!
//! - **Not found**: [`SkmError::ManifestNotFound`], [`SkmError::SkillNotFound`]
//! - **Already exists**: [`SkmError::SkillAlreadyExists`], [`SkmError::TargetAlreadyExists`]
//! - **Invalid input**: [`SkmError::UnsupportedSourceKind`], [`SkmError::InvalidSkill`]
//! - **Network**: [`SkmError::NetworkError`] (detectable via [`is_network_error`])
//! - **Filesystem**: [`SkmError::FileSystemError`], [`SkmError::IoError`]
//! - **Integrity**: [`SkmError::ChecksumMismatch`] — reported as a warning or
//!   summary entry, never used to abort an operation
//!
//! Common standard library and parser errors are converted automatically:
//! [`std::io::Error`] → [`SkmError::IoError`], [`toml::de::Error`] →
//! [`SkmError::TomlError`], [`toml::ser::Error`] → [`SkmError::TomlSerError`].

use colored::Colorize;
use thiserror::Error;

/// The main error type for SKM operations.
///
/// Each variant represents a specific failure mode and carries the context
/// needed to report it: skill names, paths, source kinds, or subprocess
/// output. Batch operations aggregate missing names into a single
/// [`SkillNotFound`](Self::SkillNotFound) rather than reporting only the
/// first.
#[derive(Error, Debug)]
pub enum SkmError {
    /// Manifest file (skm.toml) not found
    #[error("manifest file skm.toml not found; run 'skm init' to create one")]
    ManifestNotFound,

    /// Manifest parsing error
    #[error("invalid manifest file syntax in {file}")]
    ManifestParseError {
        /// Path to the manifest file that failed to parse
        file: String,
        /// Specific reason for the parsing failure
        reason: String,
    },

    /// Manifest validation error
    #[error("manifest validation failed: {reason}")]
    ManifestValidationError {
        /// Reason why manifest validation failed
        reason: String,
    },

    /// One or more skills were not found in the manifest.
    ///
    /// Always carries *every* missing name from the requesting call, so a
    /// user learns about all problems at once.
    #[error("skill(s) not found: {}; add the skill first with 'skm add skill'", names.join(", "))]
    SkillNotFound {
        /// All names that could not be resolved
        names: Vec<String>,
    },

    /// A skill with this name already exists in the manifest
    #[error("skill '{name}' already exists in the manifest")]
    SkillAlreadyExists {
        /// The duplicate skill name
        name: String,
    },

    /// An install target with this path is already configured
    #[error("install target '{path}' is already configured")]
    TargetAlreadyExists {
        /// The duplicate target path
        path: String,
    },

    /// The skill names a source kind no adapter is registered for
    #[error("unsupported source kind '{kind}'; supported kinds are: {supported}")]
    UnsupportedSourceKind {
        /// The unrecognized (possibly empty) kind string
        kind: String,
        /// Comma-separated list of registered kinds
        supported: String,
    },

    /// A skill record is structurally invalid
    #[error("invalid skill '{name}': {reason}")]
    InvalidSkill {
        /// Name of the offending skill (may be empty when the name itself is missing)
        name: String,
        /// What is wrong with the record
        reason: String,
    },

    /// No install targets are configured
    #[error("no install targets configured; add one with 'skm add target'")]
    NoInstallTargets,

    /// A download or metadata request failed at the adapter level
    #[error("network failure during {operation} for '{resource}': {reason}")]
    NetworkError {
        /// The adapter operation that failed (e.g. "download", "latest-version")
        operation: String,
        /// The skill, module path, or URL the operation concerned
        resource: String,
        /// Underlying cause
        reason: String,
    },

    /// A filesystem operation failed
    #[error("filesystem failure during {operation} at {path}: {reason}")]
    FileSystemError {
        /// The operation that failed (e.g. "copy", "remove")
        operation: String,
        /// The offending path
        path: String,
        /// Underlying cause
        reason: String,
    },

    /// Git executable not found in PATH
    #[error("git is not installed or not found in PATH")]
    GitNotFound,

    /// Git command returned a non-zero exit code
    #[error("git operation failed: {operation}")]
    GitCommandError {
        /// The git operation that failed (e.g. "clone", "ls-remote")
        operation: String,
        /// The error output from the git command
        stderr: String,
    },

    /// Installed content does not match the stored hash.
    ///
    /// This category never aborts a call; it is surfaced as a warning during
    /// install and as structured data during verification sweeps.
    #[error("content hash mismatch for skill '{name}' at {path}")]
    ChecksumMismatch {
        /// The skill whose content failed verification
        name: String,
        /// The install directory that was verified
        path: String,
    },

    /// Configuration error
    #[error("configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// IO error wrapper
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error wrapper
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] Box<toml::de::Error>),

    /// TOML serialization error wrapper
    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] Box<toml::ser::Error>),

    /// Catch-all for errors that don't fit other categories
    #[error("{message}")]
    Other {
        /// The error description
        message: String,
    },
}

/// Returns true when the error chain bottoms out in a network failure.
///
/// Callers use this to offer network-specific remediation (retry, proxy
/// configuration) instead of a generic failure message. Both the typed
/// [`SkmError::NetworkError`] and raw [`reqwest::Error`]s anywhere in the
/// chain count.
pub fn is_network_error(error: &anyhow::Error) -> bool {
    for cause in error.chain() {
        if let Some(SkmError::NetworkError { .. }) = cause.downcast_ref::<SkmError>() {
            return true;
        }
        if cause.downcast_ref::<reqwest::Error>().is_some() {
            return true;
        }
    }
    false
}

/// Prints a top-level error with a suggestion line for well-known categories.
///
/// Used by `main` as the last stop before exiting non-zero. The primary
/// message comes from the error's `Display`; the suggestion is derived from
/// the typed variant when one is present in the chain.
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{} {error:#}", "error:".red().bold());

    if let Some(suggestion) = suggestion_for(error) {
        eprintln!("{} {suggestion}", "hint:".yellow().bold());
    }
}

fn suggestion_for(error: &anyhow::Error) -> Option<&'static str> {
    for cause in error.chain() {
        if let Some(skm_err) = cause.downcast_ref::<SkmError>() {
            return match skm_err {
                SkmError::ManifestNotFound => Some("run 'skm init' in your project directory"),
                SkmError::GitNotFound => {
                    Some("install git from https://git-scm.com/ and ensure it is in PATH")
                }
                SkmError::NetworkError { .. } => {
                    Some("check your network connection and proxy configuration (SKM_SKILL_PROXY)")
                }
                SkmError::NoInstallTargets => Some("run 'skm add target <dir>' first"),
                _ => None,
            };
        }
    }
    if is_network_error(error) {
        return Some("check your network connection and proxy configuration (SKM_SKILL_PROXY)");
    }
    None
}
