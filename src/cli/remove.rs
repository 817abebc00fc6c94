//! `skm remove` - uninstall a skill.

use crate::installer::Installer;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::Path;

/// Removes a skill from every install target and from the manifest.
#[derive(Args)]
pub struct RemoveCommand {
    /// Skill to remove
    name: String,
}

impl RemoveCommand {
    /// Runs the uninstall.
    pub async fn execute(&self, manifest_path: &Path) -> Result<()> {
        Installer::new(manifest_path).uninstall(&self.name).await?;
        println!("{} skill '{}'", "Removed".green().bold(), self.name);
        Ok(())
    }
}
