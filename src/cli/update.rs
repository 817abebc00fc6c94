//! `skm update` - update skills to their latest versions.
//!
//! `--dry-run` previews resolved versions and per-file diffs without
//! touching the manifest or any install target.

use crate::installer::{Installer, UpdateResult};
use crate::diff::DiffStatus;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::Path;

/// Updates the named skills, or every skill when none are given.
#[derive(Args)]
pub struct UpdateCommand {
    /// Skills to update; omit to update all
    names: Vec<String>,

    /// Preview changes without applying them
    #[arg(long)]
    dry_run: bool,

    /// Maximum number of skills processed concurrently
    #[arg(long)]
    max_parallel: Option<usize>,
}

impl UpdateCommand {
    /// Runs the update and prints per-skill results.
    pub async fn execute(&self, manifest_path: &Path) -> Result<()> {
        let mut installer = Installer::new(manifest_path);
        if let Some(max) = self.max_parallel {
            installer = installer.max_parallel(max);
        }

        let results = installer.update(&self.names, self.dry_run).await?;

        for result in &results {
            print_result(result, self.dry_run);
        }

        if self.dry_run {
            println!("{} dry run: nothing was changed", "Note:".yellow().bold());
        } else {
            println!("{} {} skill(s)", "Updated".green().bold(), results.len());
        }
        Ok(())
    }
}

fn print_result(result: &UpdateResult, show_diffs: bool) {
    let old = if result.old_version.is_empty() { "(none)" } else { &result.old_version };
    println!("{} {}: {} -> {}", "skill".bold(), result.skill_name, old, result.new_version);

    if !show_diffs {
        return;
    }

    for diff in &result.file_diffs {
        let status = match diff.status {
            DiffStatus::Added => "added".green(),
            DiffStatus::Removed => "removed".red(),
            DiffStatus::Modified => "modified".yellow(),
        };
        println!("  {status} {}", diff.path);
        for line in diff.patch.lines() {
            match line.chars().next() {
                Some('+') => println!("    {}", line.green()),
                Some('-') => println!("    {}", line.red()),
                _ => println!("    {line}"),
            }
        }
    }
}
