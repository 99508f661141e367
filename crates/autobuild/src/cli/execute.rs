//! Command execution logic.

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::Path;

use super::args::PushArgs;
use crate::config::Config;
use crate::output::{self, OutputConfig, OutputMode, PlanReport};
use crate::plan::{PlanError, PlanFailure, PlanOptions, Planner};
use crate::publish::{publish_in_order, HttpPublisher};
use crate::snapshot::{load_snapshot, Snapshot};
use autobuild_graph::DepGraph;

/// Execute the push command
pub async fn execute_push(args: &PushArgs, config: &Config, output_mode: OutputMode) -> Result<()> {
    let old = load_snapshot(&args.old)
        .with_context(|| format!("Failed to load old state {}", args.old))?;
    let new = load_snapshot(&args.new)
        .with_context(|| format!("Failed to load new state {}", args.new))?;

    let style = OutputConfig::from_env();
    let options = PlanOptions { force: args.force };

    let plan = match Planner::new(old.as_ref(), new.as_ref()).plan(&options) {
        Ok(plan) => plan,
        Err(failure) => {
            if let PlanError::Cycles { lifted, .. } = &failure.error {
                let path = args.dot.as_deref().unwrap_or(config.dot_output.as_path());
                write_dot(lifted, new.as_ref(), path);
            }
            match output_mode {
                OutputMode::Json => output::print_json(&PlanReport::from_failure(&failure))?,
                OutputMode::Text => {
                    output::write_failure(&mut io::stderr().lock(), &failure, args.force, &style)?;
                }
            }
            return Err(failure.into());
        }
    };

    let mut report = PlanReport::from_plan(&plan, new.as_ref());

    if output_mode == OutputMode::Text {
        let mut stdout = io::stdout().lock();
        output::write_findings(&mut stdout, &plan.findings, args.force, &style)?;
        output::write_plan(&mut stdout, &plan, new.as_ref(), &style)?;
    }

    if plan.is_empty() || args.dry_run {
        if args.dry_run && !plan.is_empty() {
            tracing::info!("Dry run, nothing published (use --dry-run=false to publish)");
        }
        if output_mode == OutputMode::Json {
            output::print_json(&report)?;
        }
        return Ok(());
    }

    let publisher = HttpPublisher::from_config(&config.publisher)?;
    tracing::info!(url = publisher.jobs_url(), "Publishing to build server");

    let published = publish_in_order(&publisher, new.as_ref(), &plan.order()).await?;

    match output_mode {
        OutputMode::Json => {
            report.status = "published";
            report.published = published;
            output::print_json(&report)?;
        }
        OutputMode::Text => {
            let mut stdout = io::stdout().lock();
            for entry in &published {
                output::write_published(&mut stdout, entry, &style)?;
            }
            stdout.flush()?;
        }
    }

    Ok(())
}

/// Dump the lifted graph for inspection. Failure to write is not fatal.
fn write_dot(lifted: &DepGraph, snapshot: &dyn Snapshot, path: &Path) {
    let dot = autobuild_graph::to_dot(lifted, |position| {
        snapshot
            .name_at(position)
            .map_or_else(|| format!("#{position}"), str::to_string)
    });

    match std::fs::write(path, dot) {
        Ok(()) => tracing::info!(path = %path.display(), "Wrote lifted graph"),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "Failed to write lifted graph");
        }
    }
}
