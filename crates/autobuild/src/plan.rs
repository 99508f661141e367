//! Rebuild planning.
//!
//! The planner ties the pipeline together:
//!
//! 1. diff the snapshots and split the result into rebuild candidates,
//!    anomalies and downgrades
//! 2. stop on anomalies unless forced
//! 3. check that every candidate's build dependencies exist, stopping on
//!    failures unless forced
//! 4. lift the new snapshot's dependency graph to the candidates
//! 5. order the lifted graph, diagnosing cycles if that fails
//!
//! Findings that `force` bypasses are still logged and returned in the plan.
//! Cycles can never be bypassed. When planning stops, the findings gathered
//! up to that point travel with the error in a [`PlanFailure`].

use crate::deps::{find_unresolved, Unresolved};
use crate::diff::{changed, Change};
use crate::snapshot::Snapshot;
use autobuild_graph::{build_ranks, DepGraph, GraphError, Position};
use std::fmt;
use thiserror::Error;

/// Options controlling how strict planning is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanOptions {
    /// Proceed past anomalies and unresolved build dependencies.
    pub force: bool,
}

/// Non-fatal (or forced) findings from planning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Findings {
    /// Packages with the same release but a different version
    pub anomalies: Vec<String>,
    /// Packages whose release went backwards
    pub downgrades: Vec<String>,
    /// Rebuild candidates with missing build dependencies
    pub unresolved: Vec<Unresolved>,
}

impl Findings {
    /// Whether nothing was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anomalies.is_empty() && self.downgrades.is_empty() && self.unresolved.is_empty()
    }
}

/// A computed rebuild plan over the new snapshot.
#[derive(Debug, Clone, Default)]
pub struct BuildPlan {
    /// Rebuild candidates in new-snapshot order
    pub rebuild: Vec<Position>,
    /// Dependency graph restricted to the rebuild set
    pub lifted: DepGraph,
    /// Build ranks; each rank only depends on earlier ranks
    pub ranks: Vec<Vec<Position>>,
    /// Findings surfaced along the way
    pub findings: Findings,
}

impl BuildPlan {
    /// Whether nothing has to be rebuilt.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rebuild.is_empty()
    }

    /// Dependencies-first build order.
    #[must_use]
    pub fn order(&self) -> Vec<Position> {
        self.ranks.concat()
    }
}

/// Reasons planning stops.
#[derive(Debug, Error)]
pub enum PlanError {
    /// Packages have the same release number but a different version.
    #[error("{} package(s) have the same release number but a different version", .0.len())]
    Anomalies(Vec<String>),

    /// Rebuild candidates depend on packages that do not exist.
    #[error("{} package(s) have nonexistent build dependencies", .0.len())]
    Unresolved(Vec<Unresolved>),

    /// The rebuild set contains dependency cycles.
    #[error("failed to compute build order: {} dependency cycle(s)", cycles.len())]
    Cycles {
        /// Package names of each cyclic component
        cycles: Vec<Vec<String>>,
        /// The lifted graph that could not be ordered
        lifted: DepGraph,
    },

    /// The rebuild set could not be lifted from the dependency graph.
    #[error("failed to lift packages to update from dependency graph: {0}")]
    Lift(#[source] GraphError),
}

/// A planning error together with the findings gathered before it.
///
/// Displays as the inner [`PlanError`] and shares its source chain.
#[derive(Debug)]
pub struct PlanFailure {
    /// Why planning stopped
    pub error: PlanError,
    /// Findings up to the failure, including bypassed ones
    pub findings: Findings,
}

impl fmt::Display for PlanFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl std::error::Error for PlanFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.error)
    }
}

impl PlanFailure {
    /// Findings not already described by the error itself.
    #[must_use]
    pub fn extra_findings(&self) -> Findings {
        let mut findings = self.findings.clone();
        match &self.error {
            PlanError::Anomalies(_) => findings.anomalies.clear(),
            PlanError::Unresolved(_) => findings.unresolved.clear(),
            PlanError::Cycles { .. } | PlanError::Lift(_) => {}
        }
        findings
    }
}

/// Plans rebuilds between two snapshots.
#[derive(Debug, Clone, Copy)]
pub struct Planner<'a> {
    old: &'a dyn Snapshot,
    new: &'a dyn Snapshot,
}

impl<'a> Planner<'a> {
    /// Create a planner comparing `old` against `new`.
    #[must_use]
    pub fn new(old: &'a dyn Snapshot, new: &'a dyn Snapshot) -> Self {
        Self { old, new }
    }

    /// Compute the rebuild plan.
    ///
    /// # Errors
    ///
    /// Returns a [`PlanFailure`] carrying the findings so far and one of:
    ///
    /// - [`PlanError::Anomalies`] / [`PlanError::Unresolved`] unless
    ///   `options.force` is set
    /// - [`PlanError::Cycles`] whenever the rebuild set is cyclic
    /// - [`PlanError::Lift`] if the snapshot graph is inconsistent
    pub fn plan(&self, options: &PlanOptions) -> Result<BuildPlan, PlanFailure> {
        let mut findings = Findings::default();
        match self.run(options, &mut findings) {
            Ok(plan) => Ok(BuildPlan { findings, ..plan }),
            Err(error) => Err(PlanFailure { error, findings }),
        }
    }

    fn run(&self, options: &PlanOptions, findings: &mut Findings) -> Result<BuildPlan, PlanError> {
        let mut rebuild = Vec::new();

        for diff in changed(self.old, self.new) {
            let name = self.name(diff.position);
            match diff.kind() {
                None | Some(Change::NewRelease) => rebuild.push(diff.position),
                Some(Change::Anomaly) => findings.anomalies.push(name),
                Some(Change::Downgrade) => findings.downgrades.push(name),
                Some(Change::Unchanged) => {}
            }
        }

        if !findings.anomalies.is_empty() {
            tracing::warn!(
                packages = ?findings.anomalies,
                forced = options.force,
                "Packages have the same release number but a different version"
            );
            if !options.force {
                return Err(PlanError::Anomalies(findings.anomalies.clone()));
            }
        }

        if !findings.downgrades.is_empty() {
            tracing::warn!(packages = ?findings.downgrades, "Packages have older release numbers");
        }

        if rebuild.is_empty() {
            tracing::info!("No packages to update");
            return Ok(BuildPlan::default());
        }

        findings.unresolved = find_unresolved(self.new, &rebuild);
        if !findings.unresolved.is_empty() {
            for entry in &findings.unresolved {
                tracing::error!(
                    package = %entry.package,
                    missing = ?entry.missing,
                    forced = options.force,
                    "Nonexistent build dependencies"
                );
            }
            if !options.force {
                return Err(PlanError::Unresolved(findings.unresolved.clone()));
            }
        }

        let lifted = self
            .new
            .graph()
            .lift_positions(rebuild.iter().copied())
            .map_err(PlanError::Lift)?;
        tracing::info!(
            packages = lifted.node_count(),
            edges = lifted.edge_count(),
            "Isolated packages to update"
        );

        let ranks = match build_ranks(&lifted) {
            Ok(ranks) => ranks,
            Err(GraphError::Cycle { cycles }) => {
                let cycles: Vec<Vec<String>> = cycles
                    .into_iter()
                    .map(|members| members.into_iter().map(|p| self.name(p)).collect())
                    .collect();
                for (i, members) in cycles.iter().enumerate() {
                    tracing::error!(cycle = i + 1, packages = ?members, "Dependency cycle");
                }
                return Err(PlanError::Cycles { cycles, lifted });
            }
            Err(err) => return Err(PlanError::Lift(err)),
        };

        Ok(BuildPlan {
            rebuild,
            lifted,
            ranks,
            findings: Findings::default(),
        })
    }

    fn name(&self, position: Position) -> String {
        self.new
            .name_at(position)
            .map_or_else(|| format!("#{position}"), str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Package;
    use crate::snapshot::PackageSet;

    fn set(packages: Vec<Package>) -> PackageSet {
        PackageSet::new(packages).unwrap()
    }

    #[test]
    fn nothing_changed_is_an_empty_plan() {
        let old = set(vec![Package::new("a", "1", 1)]);
        let new = set(vec![Package::new("a", "1", 1)]);

        let plan = Planner::new(&old, &new).plan(&PlanOptions::default()).unwrap();
        assert!(plan.is_empty());
        assert!(plan.order().is_empty());
        assert!(plan.findings.is_empty());
    }

    #[test]
    fn downgrades_are_reported_but_not_fatal() {
        let old = set(vec![Package::new("old", "1", 5)]);
        let new = set(vec![Package::new("old", "1", 4)]);

        let plan = Planner::new(&old, &new).plan(&PlanOptions::default()).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.findings.downgrades, vec!["old".to_string()]);
    }

    #[test]
    fn anomalies_stop_planning_before_empty_rebuild_check() {
        let old = set(vec![Package::new("pkgB", "2.0", 3)]);
        let new = set(vec![Package::new("pkgB", "2.1", 3)]);

        let err = Planner::new(&old, &new)
            .plan(&PlanOptions::default())
            .unwrap_err();
        assert!(matches!(err.error, PlanError::Anomalies(names) if names == ["pkgB"]));
    }

    #[test]
    fn forced_anomalies_are_kept_in_findings() {
        let old = set(vec![Package::new("pkgB", "2.0", 3), Package::new("x", "1", 1)]);
        let new = set(vec![Package::new("pkgB", "2.1", 3), Package::new("x", "1", 2)]);

        let plan = Planner::new(&old, &new)
            .plan(&PlanOptions { force: true })
            .unwrap();
        assert_eq!(plan.findings.anomalies, vec!["pkgB".to_string()]);
        assert_eq!(plan.order(), vec![1]);
    }

    #[test]
    fn unresolved_dependencies_stop_planning() {
        let old = set(vec![]);
        let new = set(vec![Package::new("pkgC", "1", 1).with_build_deps(["pkgD"])]);

        let err = Planner::new(&old, &new)
            .plan(&PlanOptions::default())
            .unwrap_err();
        let PlanError::Unresolved(unresolved) = err.error else {
            panic!("expected unresolved dependencies, got {:?}", err.error);
        };
        assert_eq!(unresolved[0].package, "pkgC");
        assert_eq!(unresolved[0].missing, vec!["pkgD".to_string()]);
    }

    #[test]
    fn failure_keeps_findings_gathered_before_it() {
        let old = set(vec![
            Package::new("pkgB", "2.0", 3),
            Package::new("old", "1", 5),
        ]);
        let new = set(vec![
            Package::new("pkgB", "2.1", 3),
            Package::new("old", "1", 4),
            Package::new("pkgG", "1", 1).with_build_deps(["pkgH"]),
            Package::new("pkgH", "1", 1).with_build_deps(["pkgG"]),
        ]);

        let err = Planner::new(&old, &new)
            .plan(&PlanOptions::default())
            .unwrap_err();
        assert!(matches!(err.error, PlanError::Anomalies(_)));
        assert_eq!(err.findings.downgrades, vec!["old".to_string()]);
        let extra = err.extra_findings();
        assert!(extra.anomalies.is_empty());
        assert_eq!(extra.downgrades, vec!["old".to_string()]);

        let err = Planner::new(&old, &new)
            .plan(&PlanOptions { force: true })
            .unwrap_err();
        assert!(matches!(err.error, PlanError::Cycles { .. }));
        let extra = err.extra_findings();
        assert_eq!(extra.anomalies, vec!["pkgB".to_string()]);
        assert_eq!(extra.downgrades, vec!["old".to_string()]);
    }
}
