//! `skm verify` - check installed skills against stored hashes.

use crate::core::SkmError;
use crate::manifest::Manifest;
use crate::verify::verify_all;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::Path;

/// Verifies every skill in every install target.
#[derive(Args)]
pub struct VerifyCommand {}

impl VerifyCommand {
    /// Runs the sweep and exits non-zero when any pair fails.
    pub async fn execute(&self, manifest_path: &Path) -> Result<()> {
        let manifest = Manifest::load(manifest_path)?;

        let summary = tokio::task::spawn_blocking(move || verify_all(&manifest))
            .await
            .context("verification task panicked")??;

        for result in &summary.results {
            if result.matched {
                println!(
                    "{} {} at {}",
                    "ok      ".green(),
                    result.skill_name,
                    result.install_dir.display()
                );
            } else {
                println!(
                    "{} {} at {} (expected {}, got {})",
                    "mismatch".red().bold(),
                    result.skill_name,
                    result.install_dir.display(),
                    short_hash(&result.expected),
                    if result.actual.is_empty() { "<unreadable>" } else { &result.actual[..12.min(result.actual.len())] },
                );
            }
        }

        println!(
            "{}: {} skill(s), {} ok, {} failed",
            "Summary".bold(),
            summary.total_skills,
            summary.success_count,
            summary.failure_count
        );

        if summary.failure_count > 0 {
            return Err(SkmError::Other {
                message: format!("{} verification pair(s) failed", summary.failure_count),
            }
            .into());
        }
        Ok(())
    }
}

fn short_hash(hash: &str) -> &str {
    if hash.is_empty() { "<none>" } else { &hash[..12.min(hash.len())] }
}
