//! `skm init` - create a new manifest.

use crate::core::SkmError;
use crate::manifest::Manifest;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::Path;

/// Default install target written into a fresh manifest.
const DEFAULT_TARGET: &str = ".claude/skills";

/// Creates an empty skm.toml with a default install target.
#[derive(Args)]
pub struct InitCommand {
    /// Skip the default install target
    #[arg(long)]
    bare: bool,
}

impl InitCommand {
    /// Writes the initial manifest, refusing to overwrite an existing one.
    pub fn execute(&self, manifest_path: &Path) -> Result<()> {
        if manifest_path.exists() {
            return Err(SkmError::ConfigError {
                message: format!("{} already exists", manifest_path.display()),
            }
            .into());
        }

        let mut manifest = Manifest::new();
        if !self.bare {
            manifest.add_target(DEFAULT_TARGET)?;
        }
        manifest.save(manifest_path)?;

        println!("{} {}", "Created".green().bold(), manifest_path.display());
        Ok(())
    }
}
