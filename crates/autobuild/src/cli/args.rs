//! CLI argument structs.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::snapshot::TPath;

/// Arguments for the `push` command
#[derive(Parser, Debug, Clone)]
pub struct PushArgs {
    /// Snapshot before the change, as `kind:path`
    ///
    /// `kind` is one of `src` (source tree of `package.yml` recipes),
    /// `bin` (`index.jsonl` binary index) or `repo` (`eopkg-index.xml`).
    #[arg(value_name = "OLD")]
    pub old: TPath,

    /// Snapshot after the change, as `kind:path`
    #[arg(value_name = "NEW")]
    pub new: TPath,

    /// Continue past anomalies and nonexistent build dependencies
    #[arg(short, long)]
    pub force: bool,

    /// Only print the build order (use `--dry-run=false` to publish)
    #[arg(
        short = 'n',
        long,
        default_value_t = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    pub dry_run: bool,

    /// Where to write the lifted graph if it contains cycles
    ///
    /// Overrides `dot-output` from the configuration file.
    #[arg(long, value_name = "FILE")]
    pub dot: Option<PathBuf>,
}
