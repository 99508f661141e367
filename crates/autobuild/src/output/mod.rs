//! Output formatting for CLI commands.
//!
//! Plans are rendered either as human-readable text or as a single JSON
//! document ([`PlanReport`]) for programmatic use.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers

pub mod color;

use crate::deps::Unresolved;
use crate::plan::{BuildPlan, Findings, PlanError, PlanFailure};
use crate::publish::Published;
use crate::snapshot::Snapshot;
use autobuild_graph::Position;
use color::{dimmed, error, info, success, warning};
use serde::Serialize;
use std::env;
use std::io::{self, Write};

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text
    Text,
    /// JSON for programmatic use
    Json,
}

/// Configuration for text output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create an `OutputConfig` by reading from environment variables.
    ///
    /// Reads:
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `AUTOBUILD_COLOR`: Set to "0" or "false" to disable colors (default: true)
    pub fn from_env() -> Self {
        // Respect NO_COLOR standard (https://no-color.org/)
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("AUTOBUILD_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self { use_colors }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { use_colors: true }
    }
}

/// JSON form of a planning run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlanReport {
    /// `"planned"`, `"nothing-to-do"`, `"published"` or `"failed"`
    pub status: &'static str,
    /// Packages selected for rebuild
    pub rebuild: Vec<String>,
    /// Build order, dependencies first
    pub order: Vec<String>,
    /// Build ranks
    pub ranks: Vec<Vec<String>>,
    /// Same release, different version
    pub anomalies: Vec<String>,
    /// Lower release than before
    pub downgrades: Vec<String>,
    /// Missing build dependencies
    pub unresolved: Vec<Unresolved>,
    /// Cyclic components
    pub cycles: Vec<Vec<String>>,
    /// Submitted jobs
    pub published: Vec<Published>,
    /// Failure description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PlanReport {
    /// Report a successful plan.
    pub fn from_plan(plan: &BuildPlan, snapshot: &dyn Snapshot) -> Self {
        let names = |positions: &[Position]| -> Vec<String> {
            positions.iter().map(|&p| name(snapshot, p)).collect()
        };

        let mut report = Self {
            status: if plan.is_empty() {
                "nothing-to-do"
            } else {
                "planned"
            },
            rebuild: names(plan.rebuild.as_slice()),
            order: names(plan.order().as_slice()),
            ranks: plan.ranks.iter().map(|rank| names(rank.as_slice())).collect(),
            ..Self::default()
        };
        report.set_findings(&plan.findings);
        report
    }

    /// Report a planning failure with the findings gathered before it.
    pub fn from_failure(failure: &PlanFailure) -> Self {
        let mut report = Self {
            status: "failed",
            error: Some(failure.error.to_string()),
            ..Self::default()
        };
        report.set_findings(&failure.findings);
        match &failure.error {
            PlanError::Anomalies(names) => report.anomalies.clone_from(names),
            PlanError::Unresolved(unresolved) => report.unresolved.clone_from(unresolved),
            PlanError::Cycles { cycles, .. } => report.cycles.clone_from(cycles),
            PlanError::Lift(_) => {}
        }
        report
    }

    fn set_findings(&mut self, findings: &Findings) {
        self.anomalies.clone_from(&findings.anomalies);
        self.downgrades.clone_from(&findings.downgrades);
        self.unresolved.clone_from(&findings.unresolved);
    }
}

/// Print any serializable value as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value)?;
    writeln!(handle)?;
    Ok(())
}

/// Write findings, noting when they were bypassed with `--force`.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_findings<W: Write>(
    out: &mut W,
    findings: &Findings,
    forced: bool,
    config: &OutputConfig,
) -> io::Result<()> {
    if !findings.anomalies.is_empty() {
        write_anomalies(out, &findings.anomalies, config)?;
        if forced {
            writeln!(out, "{}", warning("  (ignored because of --force)", config))?;
        }
    }

    if !findings.downgrades.is_empty() {
        writeln!(
            out,
            "{} {}",
            warning("The following packages have older release numbers:", config),
            findings.downgrades.join(" ")
        )?;
    }

    if !findings.unresolved.is_empty() {
        write_unresolved(out, &findings.unresolved, config)?;
        if forced {
            writeln!(out, "{}", warning("  (ignored because of --force)", config))?;
        }
    }

    Ok(())
}

/// Write the packages to update and their build order.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_plan<W: Write>(
    out: &mut W,
    plan: &BuildPlan,
    snapshot: &dyn Snapshot,
    config: &OutputConfig,
) -> io::Result<()> {
    if plan.is_empty() {
        writeln!(out, "No packages to update.")?;
        return Ok(());
    }

    let updated: Vec<String> = plan.rebuild.iter().map(|&p| name(snapshot, p)).collect();
    writeln!(
        out,
        "{} {}",
        success("The following packages will be updated:", config),
        updated.join(" ")
    )?;

    writeln!(out, "{}", success("Here's the build order:", config))?;
    for (rank, members) in plan.ranks.iter().enumerate() {
        for &position in members {
            writeln!(
                out,
                "{} {}",
                dimmed(&format!("[{}]", rank + 1), config),
                info(&name(snapshot, position), config)
            )?;
        }
    }

    Ok(())
}

/// Write the diagnostics of a planning failure.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_plan_error<W: Write>(
    out: &mut W,
    err: &PlanError,
    config: &OutputConfig,
) -> io::Result<()> {
    match err {
        PlanError::Anomalies(names) => write_anomalies(out, names, config),
        PlanError::Unresolved(unresolved) => write_unresolved(out, unresolved, config),
        PlanError::Cycles { cycles, .. } => {
            writeln!(out, "{}", error("Dependency cycles among packages to update:", config))?;
            for (i, members) in cycles.iter().enumerate() {
                writeln!(out, "Cycle {}: {}", i + 1, members.join(" "))?;
            }
            Ok(())
        }
        PlanError::Lift(_) => writeln!(out, "{}", error(&err.to_string(), config)),
    }
}

/// Write a planning failure: findings the error does not already cover,
/// then the error's own diagnostics.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_failure<W: Write>(
    out: &mut W,
    failure: &PlanFailure,
    forced: bool,
    config: &OutputConfig,
) -> io::Result<()> {
    write_findings(out, &failure.extra_findings(), forced, config)?;
    write_plan_error(out, &failure.error, config)
}

/// Write one published job.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_published<W: Write>(
    out: &mut W,
    published: &Published,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        out,
        "{} {} {}",
        success("Published package", config),
        info(&published.package, config),
        dimmed(&format!("(job {})", published.job.id), config)
    )
}

fn write_anomalies<W: Write>(out: &mut W, names: &[String], config: &OutputConfig) -> io::Result<()> {
    writeln!(
        out,
        "{} {}",
        error(
            "The following packages have the same release number but different version:",
            config
        ),
        names.join(" ")
    )
}

fn write_unresolved<W: Write>(
    out: &mut W,
    unresolved: &[Unresolved],
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        out,
        "{}",
        error("The following packages have nonexistent build dependencies:", config)
    )?;
    for entry in unresolved {
        writeln!(out, "  {}: {}", info(&entry.package, config), entry.missing.join(" "))?;
    }
    Ok(())
}

fn name(snapshot: &dyn Snapshot, position: Position) -> String {
    snapshot
        .name_at(position)
        .map_or_else(|| format!("#{position}"), str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Package;
    use crate::plan::{PlanOptions, Planner};
    use crate::publish::Job;
    use crate::snapshot::PackageSet;
    use autobuild_graph::DepGraph;

    const PLAIN: OutputConfig = OutputConfig { use_colors: false };

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn sample() -> (PackageSet, PackageSet) {
        let old = PackageSet::new(vec![Package::new("lib", "1", 1)]).unwrap();
        let new = PackageSet::new(vec![
            Package::new("app", "1", 1).with_build_deps(["lib"]),
            Package::new("lib", "2", 2),
        ])
        .unwrap();
        (old, new)
    }

    #[test]
    fn plan_lists_build_order_with_ranks() {
        let (old, new) = sample();
        let plan = Planner::new(&old, &new).plan(&PlanOptions::default()).unwrap();

        let text = render(|out| write_plan(out, &plan, &new, &PLAIN));
        assert!(text.contains("The following packages will be updated: app lib"));
        assert!(text.contains("[1] lib\n[2] app\n"));
    }

    #[test]
    fn empty_plan_says_nothing_to_do() {
        let text = render(|out| write_plan(out, &BuildPlan::default(), &PackageSet::default(), &PLAIN));
        assert_eq!(text, "No packages to update.\n");
    }

    #[test]
    fn forced_findings_are_still_shown() {
        let findings = Findings {
            anomalies: vec!["pkgB".to_string()],
            downgrades: vec![],
            unresolved: vec![Unresolved {
                package: "pkgC".to_string(),
                missing: vec!["pkgD".to_string()],
            }],
        };

        let text = render(|out| write_findings(out, &findings, true, &PLAIN));
        assert!(text.contains("same release number but different version: pkgB"));
        assert!(text.contains("  pkgC: pkgD"));
        assert_eq!(text.matches("ignored because of --force").count(), 2);
    }

    #[test]
    fn cycles_are_numbered() {
        let err = PlanError::Cycles {
            cycles: vec![vec!["pkgG".to_string(), "pkgH".to_string()]],
            lifted: DepGraph::new(),
        };
        let text = render(|out| write_plan_error(out, &err, &PLAIN));
        assert!(text.contains("Cycle 1: pkgG pkgH"));
    }

    #[test]
    fn report_from_plan_uses_names() {
        let (old, new) = sample();
        let plan = Planner::new(&old, &new).plan(&PlanOptions::default()).unwrap();

        let report = PlanReport::from_plan(&plan, &new);
        assert_eq!(report.status, "planned");
        assert_eq!(report.order, vec!["lib", "app"]);
        assert_eq!(report.ranks, vec![vec!["lib"], vec!["app"]]);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("error").is_none());
    }

    fn failure() -> PlanFailure {
        PlanFailure {
            error: PlanError::Anomalies(vec!["pkgB".to_string()]),
            findings: Findings {
                anomalies: vec!["pkgB".to_string()],
                downgrades: vec!["old".to_string()],
                unresolved: vec![],
            },
        }
    }

    #[test]
    fn report_from_failure_carries_details() {
        let report = PlanReport::from_failure(&failure());
        assert_eq!(report.status, "failed");
        assert_eq!(report.anomalies, vec!["pkgB"]);
        assert_eq!(report.downgrades, vec!["old"]);
        assert!(report.error.is_some());
    }

    #[test]
    fn failure_text_includes_earlier_findings_once() {
        let text = render(|out| write_failure(out, &failure(), false, &PLAIN));
        assert!(text.contains("The following packages have older release numbers: old"));
        assert_eq!(text.matches("same release number but different version: pkgB").count(), 1);
    }

    #[test]
    fn published_line_includes_job_id() {
        let published = Published {
            package: "lib".to_string(),
            job: Job { id: 42 },
        };
        let text = render(|out| write_published(out, &published, &PLAIN));
        assert_eq!(text, "Published package lib (job 42)\n");
    }
}
