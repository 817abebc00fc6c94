//! `skm install` - fetch skills and copy them into install targets.

use crate::installer::Installer;
use crate::manifest::Manifest;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Installs one skill, or every skill in the manifest.
#[derive(Args)]
pub struct InstallCommand {
    /// Skill to install; omit to install every manifest skill
    name: Option<String>,

    /// Maximum number of skills processed concurrently
    #[arg(long)]
    max_parallel: Option<usize>,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,
}

impl InstallCommand {
    /// Runs the installation.
    pub async fn execute(&self, manifest_path: &Path) -> Result<()> {
        // Load once up front for the skill count; the installer re-loads to
        // stay the single owner of manifest mutation.
        let manifest = Manifest::load(manifest_path)?;
        let total = match &self.name {
            Some(_) => 1,
            None => manifest.skills.len(),
        };
        drop(manifest);

        let mut installer = Installer::new(manifest_path);
        if let Some(max) = self.max_parallel {
            installer = installer.max_parallel(max);
        }

        let bar = if self.no_progress { None } else { Some(progress_bar(total as u64)) };
        if let Some(bar) = &bar {
            installer = installer.progress(bar.clone());
        }

        let result = installer.install(self.name.as_deref()).await;
        if let Some(bar) = &bar {
            bar.finish_and_clear();
        }
        result?;

        match &self.name {
            Some(name) => println!("{} skill '{name}'", "Installed".green().bold()),
            None => println!("{} {total} skill(s)", "Installed".green().bold()),
        }
        Ok(())
    }
}

fn progress_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.set_message("installing skills");
    bar
}
