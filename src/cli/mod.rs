//! Command-line interface for SKM.
//!
//! The CLI layer is deliberately thin: each subcommand module owns its
//! argument struct and an `execute()` that delegates to the library
//! (`Installer`, `Manifest`, `verify`). Global flags control logging
//! verbosity and the manifest location.

pub mod add;
pub mod init;
pub mod install;
pub mod list;
pub mod remove;
pub mod update;
pub mod verify;

use crate::core::MANIFEST_FILE;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI structure for SKM.
#[derive(Parser)]
#[command(
    name = "skm",
    about = "SKill Manager - package manager for agent skill bundles",
    version,
    author
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (equivalent to RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the manifest file (defaults to skm.toml in the current directory)
    #[arg(long, global = true)]
    manifest_path: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize a new skm.toml manifest
    Init(init::InitCommand),

    /// Add a skill or install target to the manifest
    Add(add::AddCommand),

    /// List configured skills and install targets
    List(list::ListCommand),

    /// Install one skill, or every skill in the manifest
    Install(install::InstallCommand),

    /// Update skills to their latest versions, with an optional dry-run preview
    Update(update::UpdateCommand),

    /// Uninstall a skill from every install target and the manifest
    Remove(remove::RemoveCommand),

    /// Verify installed skills against their stored content hashes
    Verify(verify::VerifyCommand),
}

impl Cli {
    /// Executes the parsed command.
    pub async fn execute(self) -> Result<()> {
        self.init_logging();

        let manifest_path =
            self.manifest_path.clone().unwrap_or_else(|| PathBuf::from(MANIFEST_FILE));

        match self.command {
            Commands::Init(cmd) => cmd.execute(&manifest_path),
            Commands::Add(cmd) => cmd.execute(&manifest_path),
            Commands::List(cmd) => cmd.execute(&manifest_path),
            Commands::Install(cmd) => cmd.execute(&manifest_path).await,
            Commands::Update(cmd) => cmd.execute(&manifest_path).await,
            Commands::Remove(cmd) => cmd.execute(&manifest_path).await,
            Commands::Verify(cmd) => cmd.execute(&manifest_path).await,
        }
    }

    /// Sets up tracing output on stderr.
    ///
    /// `RUST_LOG` wins when set; otherwise verbosity flags choose the
    /// default filter level.
    fn init_logging(&self) {
        let default_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}
