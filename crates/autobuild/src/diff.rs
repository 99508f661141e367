//! Snapshot comparison.
//!
//! [`changed`] walks the new snapshot in order and reports every package
//! whose `(release, version)` pair differs from the old snapshot, plus every
//! package the old snapshot does not have at all.
//!
//! # Classification
//!
//! | old → new release | version   | [`Change`]   |
//! |-------------------|-----------|--------------|
//! | increased         | any       | `NewRelease` |
//! | equal             | equal     | `Unchanged`  |
//! | equal             | different | `Anomaly`    |
//! | decreased         | any       | `Downgrade`  |

use crate::snapshot::Snapshot;
use autobuild_graph::Position;
use std::cmp::Ordering;
use std::fmt;

/// Relationship between two versions of the same package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Change {
    /// Release increased: the package was rebuilt.
    NewRelease,
    /// Release and version are identical.
    Unchanged,
    /// Release is the same but the version moved: inconsistent metadata.
    Anomaly,
    /// Release went backwards.
    Downgrade,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NewRelease => write!(f, "new release"),
            Self::Unchanged => write!(f, "unchanged"),
            Self::Anomaly => write!(f, "anomaly"),
            Self::Downgrade => write!(f, "downgrade"),
        }
    }
}

/// Classify a matched package. Versions are compared only for equality.
#[must_use]
pub fn classify(old_release: u64, old_version: &str, new_release: u64, new_version: &str) -> Change {
    match new_release.cmp(&old_release) {
        Ordering::Greater => Change::NewRelease,
        Ordering::Less => Change::Downgrade,
        Ordering::Equal if new_version == old_version => Change::Unchanged,
        Ordering::Equal => Change::Anomaly,
    }
}

/// The old side of a diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Previous {
    /// Position in the old snapshot
    pub position: Position,
    /// Old release
    pub release: u64,
    /// Old version
    pub version: String,
}

/// A changed package, keyed by its position in the new snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff {
    /// Position in the new snapshot
    pub position: Position,
    /// New release
    pub release: u64,
    /// New version
    pub version: String,
    /// Old side, absent for packages new to the snapshot
    pub previous: Option<Previous>,
}

impl Diff {
    /// Classify this diff against its old side. `None` means the package
    /// was added.
    #[must_use]
    pub fn kind(&self) -> Option<Change> {
        self.previous.as_ref().map(|previous| {
            classify(previous.release, &previous.version, self.release, &self.version)
        })
    }

    /// Whether the package is new to the snapshot.
    #[must_use]
    pub fn is_added(&self) -> bool {
        self.previous.is_none()
    }

    /// Whether a matched package has a higher release.
    #[must_use]
    pub fn is_new_release(&self) -> bool {
        self.kind() == Some(Change::NewRelease)
    }

    /// Whether a matched package kept its release but changed version.
    #[must_use]
    pub fn is_anomaly(&self) -> bool {
        self.kind() == Some(Change::Anomaly)
    }

    /// Whether a matched package has a lower release.
    #[must_use]
    pub fn is_downgrade(&self) -> bool {
        self.kind() == Some(Change::Downgrade)
    }

    /// Whether the package has to be rebuilt: added or new release.
    #[must_use]
    pub fn is_rebuild_candidate(&self) -> bool {
        matches!(self.kind(), None | Some(Change::NewRelease))
    }
}

/// Compare two snapshots.
///
/// Diffs come out in the new snapshot's package order. Pure function of its
/// inputs.
#[must_use]
pub fn changed(old: &dyn Snapshot, new: &dyn Snapshot) -> Vec<Diff> {
    let mut diffs = Vec::new();

    for (position, pkg) in new.packages().iter().enumerate() {
        let Some(old_position) = old.position(&pkg.name) else {
            diffs.push(Diff {
                position,
                release: pkg.release,
                version: pkg.version.clone(),
                previous: None,
            });
            continue;
        };

        let old_pkg = &old.packages()[old_position];
        if old_pkg.release == pkg.release && old_pkg.version == pkg.version {
            continue;
        }

        diffs.push(Diff {
            position,
            release: pkg.release,
            version: pkg.version.clone(),
            previous: Some(Previous {
                position: old_position,
                release: old_pkg.release,
                version: old_pkg.version.clone(),
            }),
        });
    }

    tracing::debug!(
        old = old.packages().len(),
        new = new.packages().len(),
        changed = diffs.len(),
        "Diffed snapshots"
    );
    diffs
}
