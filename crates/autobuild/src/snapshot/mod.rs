//! Package snapshots and their loaders.
//!
//! A snapshot is an immutable, ordered set of packages with a total
//! name → position index and a dependency graph over positions. All three
//! are computed once by [`PackageSet::new`] and never change afterwards.
//! Loaders that know extra names for a package (legacy binary names of a
//! source package) register them with [`PackageSet::with_aliases`].
//!
//! Snapshots come from one of three metadata sources, selected by a
//! [`TPath`] of the form `<kind>:<path>`:
//!
//! - `src`: a source tree of `package.yml` recipes ([`source`])
//! - `bin`: a JSON Lines binary repository index ([`binary`])
//! - `repo`: a legacy `eopkg-index.xml` repository index ([`legacy`])
//!
//! Callers never branch on the source; they work with `dyn Snapshot`.
//!
//! # Example
//!
//! ```no_run
//! use autobuild::snapshot::{load_snapshot, TPath};
//!
//! # fn main() -> anyhow::Result<()> {
//! let tpath: TPath = "src:/srv/packages".parse()?;
//! let snapshot = load_snapshot(&tpath)?;
//! println!("{} packages", snapshot.packages().len());
//! # Ok(())
//! # }
//! ```

pub mod binary;
pub mod legacy;
pub mod source;

use crate::deps::build_graph;
use crate::domain::Package;
use crate::error::{Error, LoadError, Result};
use autobuild_graph::{DepGraph, Position};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Read-only view of a package snapshot.
///
/// Implementors only provide [`Snapshot::package_set`]; everything else is
/// derived from the cached [`PackageSet`].
pub trait Snapshot: fmt::Debug + Send + Sync {
    /// The normalized packages, index and graph.
    fn package_set(&self) -> &PackageSet;

    /// Where the snapshot was loaded from, if anywhere.
    fn origin(&self) -> Option<&Path> {
        None
    }

    /// Packages in loader order. A package's index is its position.
    fn packages(&self) -> &[Package] {
        self.package_set().packages()
    }

    /// Position of the package called `name`.
    fn position(&self, name: &str) -> Option<Position> {
        self.package_set().position(name)
    }

    /// Package called `name`.
    fn package(&self, name: &str) -> Option<&Package> {
        self.position(name).map(|pos| &self.packages()[pos])
    }

    /// Package name at `position`, if the position exists.
    fn name_at(&self, position: Position) -> Option<&str> {
        self.packages().get(position).map(|pkg| pkg.name.as_str())
    }

    /// Dependency graph over positions. Edges point from a package to its
    /// build dependencies.
    fn graph(&self) -> &DepGraph {
        self.package_set().graph()
    }
}

/// Ordered packages with a cached name index and dependency graph.
#[derive(Debug, Clone, Default)]
pub struct PackageSet {
    packages: Vec<Package>,
    index: HashMap<String, Position>,
    graph: DepGraph,
}

impl PackageSet {
    /// Build a set from packages in loader order.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::DuplicatePackage`] if two packages share a name.
    pub fn new(packages: Vec<Package>) -> std::result::Result<Self, LoadError> {
        Self::with_aliases(packages, std::iter::empty())
    }

    /// Build a set where extra names resolve to existing positions.
    ///
    /// Aliases take part in name lookups and in dependency resolution, so a
    /// build dependency on an alias becomes an edge to the aliased package.
    /// A package name always wins over an alias of the same name. Aliases
    /// pointing past the last package are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::DuplicatePackage`] if two packages share a name.
    pub fn with_aliases<I>(packages: Vec<Package>, aliases: I) -> std::result::Result<Self, LoadError>
    where
        I: IntoIterator<Item = (String, Position)>,
    {
        let mut index = HashMap::with_capacity(packages.len());
        for (position, pkg) in packages.iter().enumerate() {
            if index.insert(pkg.name.clone(), position).is_some() {
                return Err(LoadError::DuplicatePackage(pkg.name.clone()));
            }
        }

        let mut aliased = 0;
        for (alias, position) in aliases {
            if position < packages.len() && !index.contains_key(&alias) {
                index.insert(alias, position);
                aliased += 1;
            }
        }

        let graph = build_graph(&packages, &index)?;

        tracing::debug!(
            packages = packages.len(),
            aliases = aliased,
            edges = graph.edge_count(),
            "Built package set"
        );

        Ok(Self {
            packages,
            index,
            graph,
        })
    }

    /// Packages in loader order.
    #[must_use]
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// Position of the package called `name`.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<Position> {
        self.index.get(name).copied()
    }

    /// Dependency graph over positions.
    #[must_use]
    pub fn graph(&self) -> &DepGraph {
        &self.graph
    }

    /// Number of packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether the set has no packages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl Snapshot for PackageSet {
    fn package_set(&self) -> &PackageSet {
        self
    }
}

/// Metadata source of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Source tree of `package.yml` recipes
    Source,
    /// Binary repository JSONL index
    Binary,
    /// Legacy `eopkg-index.xml` repository
    Repo,
}

impl SourceKind {
    /// The tpath prefix for this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Source => "src",
            Self::Binary => "bin",
            Self::Repo => "repo",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed snapshot path, `<kind>:<path>`.
///
/// The path part is passed to the loader unexamined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TPath {
    /// Which loader to use
    pub kind: SourceKind,
    /// Loader-specific path
    pub path: PathBuf,
}

impl FromStr for TPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidTPath(s.to_string());

        let mut parts = s.split(':');
        let (Some(kind), Some(path), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };

        let kind = match kind {
            "src" => SourceKind::Source,
            "bin" => SourceKind::Binary,
            "repo" => SourceKind::Repo,
            _ => return Err(invalid()),
        };

        Ok(Self {
            kind,
            path: PathBuf::from(path),
        })
    }
}

impl fmt::Display for TPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.path.display())
    }
}

/// Load a snapshot with the loader selected by `tpath`.
///
/// # Errors
///
/// Returns [`Error::Load`] wrapping the loader's [`LoadError`].
pub fn load_snapshot(tpath: &TPath) -> Result<Box<dyn Snapshot>> {
    tracing::debug!(%tpath, "Loading snapshot");

    let loaded: std::result::Result<Box<dyn Snapshot>, LoadError> = match tpath.kind {
        SourceKind::Source => source::load(&tpath.path).map(|s| Box::new(s) as Box<dyn Snapshot>),
        SourceKind::Binary => binary::load(&tpath.path).map(|s| Box::new(s) as Box<dyn Snapshot>),
        SourceKind::Repo => legacy::load(&tpath.path).map(|s| Box::new(s) as Box<dyn Snapshot>),
    };

    let snapshot = loaded.map_err(|source| Error::Load {
        tpath: tpath.to_string(),
        source,
    })?;

    tracing::info!(%tpath, packages = snapshot.packages().len(), "Loaded snapshot");
    Ok(snapshot)
}

/// Parse `tpath` and load the snapshot it names.
///
/// # Errors
///
/// Returns [`Error::InvalidTPath`] before touching the filesystem if the
/// reference is malformed, or [`Error::Load`] if loading fails.
pub fn load(tpath: &str) -> Result<Box<dyn Snapshot>> {
    load_snapshot(&tpath.parse()?)
}
