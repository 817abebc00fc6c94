//! SKM - SKill Manager
//!
//! A package manager for reusable instruction bundles ("skills") consumed by
//! multiple host tools. SKM resolves a skill's remote source, fetches a
//! specific or latest version, verifies content integrity, and materializes
//! the skill into one or more install-target directories, keeping a
//! declarative manifest (`skm.toml`) in sync.
//!
//! # Architecture Overview
//!
//! - `skm.toml` declares skills (name, source kind, URL, pinned version,
//!   content hash) and the install targets that should hold a copy of each
//! - Skills are fetched through pluggable source adapters: a
//!   version-control adapter (git) and a module-registry proxy adapter with
//!   a layered fallback chain
//! - Installed content is verified against a deterministic directory hash;
//!   updates can be previewed as per-file, line-level diffs before applying
//!
//! # Core Modules
//!
//! - [`source`] - Source resolution protocol, adapter registry, and the two
//!   built-in adapters (version-control clone, module-registry proxy)
//! - [`hash`] - Deterministic content hashing of directory trees
//! - [`installer`] - Install/update/uninstall orchestration with concurrent
//!   fan-out across skills and install targets
//! - [`diff`] - File-set and line-level diffing for update previews
//! - [`verify`] - Integrity verification of installed skills
//!
//! ## Supporting Modules
//!
//! - [`manifest`] - Manifest parsing, validation, and atomic persistence
//! - [`git`] - Git operations wrapper using the system git command
//! - [`cli`] - Command-line interface
//! - [`core`] - Error types and shared constants
//! - [`utils`] - Cross-platform filesystem utilities
//!
//! # Manifest Format (skm.toml)
//!
//! ```toml
//! install-targets = [".claude/skills"]
//!
//! [[skill]]
//! name = "code-review"
//! source-kind = "vcs"
//! url = "https://github.com/example/code-review-skill.git"
//! version = "v1.2.0"
//! hash = "3f2a9c…"
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! skm init
//! skm add target ~/.claude/skills
//! skm add skill code-review --url https://github.com/example/code-review-skill.git
//! skm install
//! skm update --dry-run
//! skm verify
//! ```

// Core functionality modules
pub mod core;
pub mod diff;
pub mod hash;
pub mod installer;
pub mod source;
pub mod verify;

// Git integration
pub mod git;

// Resource management
pub mod manifest;

// Supporting modules
pub mod cli;
pub mod utils;
