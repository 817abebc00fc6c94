//! SKM CLI entry point
//!
//! Handles command-line argument parsing, error display, and command
//! execution. See [`skm_cli::cli`] for the available subcommands.

use anyhow::Result;
use clap::Parser;
use skm_cli::cli;
use skm_cli::core::display_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            display_error(&e);
            std::process::exit(1);
        }
    }
}
