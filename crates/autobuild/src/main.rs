//! Autobuild CLI binary.

use anyhow::Result;
use autobuild::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the autobuild CLI.
///
/// Uses tokio's current_thread runtime; packages are published one at a time.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Can be controlled via RUST_LOG environment variable
    // Example: RUST_LOG=autobuild=debug,autobuild_graph=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("autobuild=info,autobuild_graph=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting autobuild CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Autobuild CLI completed successfully");
    Ok(())
}
