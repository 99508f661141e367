//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `push`: Compute the rebuild order between two snapshots and publish it
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format
//! - `--config`: Path to a configuration file
//!
//! # Example
//!
//! ```bash
//! autobuild push repo:/srv/repo/eopkg-index.xml src:./packages
//! autobuild push bin:old/index.jsonl src:./packages --dry-run=false
//! ```

mod args;
mod execute;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use args::PushArgs;

/// Autobuild - incremental rebuild planner
///
/// Compares two package snapshots, works out which packages changed and
/// submits them to the build server in dependency order.
#[derive(Parser, Debug)]
#[command(name = "autobuild")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to `$AUTOBUILD_CONFIG`, then `./autobuild.yaml`)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build the packages that changed between two snapshots
    ///
    /// Packages with a new release (or new packages) are ordered so that
    /// build dependencies come first. Anomalies and nonexistent build
    /// dependencies stop the run unless `--force` is given; dependency
    /// cycles always do.
    Push(PushArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        use crate::config::Config;
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Push(args)) => {
                let config = Config::discover(self.config.as_deref(), &std::env::current_dir()?)?;
                execute::execute_push(args, &config, output_mode).await
            }
            None => {
                println!("Autobuild incremental rebuild planner");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}
