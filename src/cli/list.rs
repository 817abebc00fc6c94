//! `skm list` - show configured skills and install targets.

use crate::manifest::Manifest;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::Path;

/// Lists the manifest's skills and install targets.
#[derive(Args)]
pub struct ListCommand {}

impl ListCommand {
    /// Prints the manifest contents in a compact table.
    pub fn execute(&self, manifest_path: &Path) -> Result<()> {
        let manifest = Manifest::load(manifest_path)?;

        println!("{}", "Install targets:".bold());
        if manifest.install_targets.is_empty() {
            println!("  (none)");
        }
        for target in &manifest.install_targets {
            println!("  {target}");
        }

        println!();
        println!("{}", "Skills:".bold());
        if manifest.skills.is_empty() {
            println!("  (none)");
            return Ok(());
        }

        let name_width =
            manifest.skills.iter().map(|s| s.name.len()).max().unwrap_or(0).max("NAME".len());
        println!("  {:<name_width$}  {:<12}  {:<12}  URL", "NAME".dimmed(), "KIND".dimmed(), "VERSION".dimmed());
        for skill in &manifest.skills {
            let version = if skill.external_lock {
                "(external)".to_string()
            } else if skill.version.is_empty() {
                "(latest)".to_string()
            } else {
                skill.version.clone()
            };
            println!("  {:<name_width$}  {:<12}  {:<12}  {}", skill.name, skill.source_kind, version, skill.url);
        }

        Ok(())
    }
}
