//! `skm add` - add skills and install targets to the manifest.

use crate::manifest::{Manifest, Skill};
use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::Path;

/// Adds a skill or an install target to the manifest.
#[derive(Args)]
pub struct AddCommand {
    #[command(subcommand)]
    command: AddSubcommand,
}

#[derive(Subcommand)]
enum AddSubcommand {
    /// Add a skill record
    Skill(AddSkillArgs),
    /// Add an install target directory
    Target {
        /// Directory that should receive a copy of every skill
        path: String,
    },
}

#[derive(Args)]
struct AddSkillArgs {
    /// Unique skill name; also the install directory name
    name: String,

    /// Source kind: vcs or module-proxy
    #[arg(long, default_value = "vcs")]
    kind: String,

    /// Repository URL (vcs) or module path (module-proxy)
    #[arg(long)]
    url: String,

    /// Version to pin; resolved to latest on first install when omitted
    #[arg(long, default_value = "")]
    version: String,

    /// Subdirectory within the fetched tree to treat as the skill root
    #[arg(long = "sub-dir")]
    sub_dir: Option<String>,

    /// Delegate version and integrity to an external lock mechanism
    #[arg(long = "external-lock")]
    external_lock: bool,
}

impl AddCommand {
    /// Applies the addition and persists the manifest.
    pub fn execute(&self, manifest_path: &Path) -> Result<()> {
        let mut manifest = Manifest::load(manifest_path)?;

        match &self.command {
            AddSubcommand::Skill(args) => {
                manifest.add_skill(Skill {
                    name: args.name.clone(),
                    source_kind: args.kind.clone(),
                    url: args.url.clone(),
                    version: args.version.clone(),
                    hash_value: String::new(),
                    sub_dir: args.sub_dir.clone(),
                    external_lock: args.external_lock,
                })?;
                manifest.save(manifest_path)?;
                println!("{} skill '{}'; run 'skm install {}' to fetch it", "Added".green().bold(), args.name, args.name);
            }
            AddSubcommand::Target { path } => {
                manifest.add_target(path)?;
                manifest.save(manifest_path)?;
                println!("{} install target '{path}'", "Added".green().bold());
            }
        }

        Ok(())
    }
}
