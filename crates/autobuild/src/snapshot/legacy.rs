//! Legacy repository snapshots read from `eopkg-index.xml`.
//!
//! The legacy index lists binary packages. Several binary packages share one
//! source package (`foo`, `foo-devel`, ...), and rebuilds happen per source,
//! so entries are folded into one package per source name:
//!
//! - the first binary package seen fixes the source's position, release
//!   and version (taken from its newest `<Update>`)
//! - build dependencies are the union over all its binary packages, in
//!   first-seen order
//! - every binary name stays resolvable as an alias of its source, so a
//!   dependency on `ncurses-devel` points at `ncurses`
//!
//! ```xml
//! <PISI>
//!   <Package>
//!     <Name>nano</Name>
//!     <Source><Name>nano</Name></Source>
//!     <BuildDependencies><Dependency>ncurses-devel</Dependency></BuildDependencies>
//!     <History><Update release="169"><Version>8.2</Version></Update></History>
//!   </Package>
//! </PISI>
//! ```

use super::{PackageSet, Snapshot};
use crate::domain::Package;
use crate::error::LoadError;
use autobuild_graph::Position;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Index file looked up when the snapshot path is a directory.
pub const INDEX_FILE_NAME: &str = "eopkg-index.xml";

/// Snapshot loaded from a legacy repository index.
#[derive(Debug, Clone)]
pub struct RepoSnapshot {
    index_file: PathBuf,
    binary_packages: usize,
    set: PackageSet,
}

impl RepoSnapshot {
    /// The index file the snapshot was read from.
    #[must_use]
    pub fn index_file(&self) -> &Path {
        &self.index_file
    }

    /// Number of binary package entries folded into source packages.
    #[must_use]
    pub fn binary_packages(&self) -> usize {
        self.binary_packages
    }
}

impl Snapshot for RepoSnapshot {
    fn package_set(&self) -> &PackageSet {
        &self.set
    }

    fn origin(&self) -> Option<&Path> {
        Some(&self.index_file)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename = "PISI")]
struct Index {
    #[serde(rename = "Package", default)]
    packages: Vec<IndexPackage>,
}

#[derive(Debug, Deserialize)]
struct IndexPackage {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Source")]
    source: Option<IndexSource>,
    #[serde(rename = "BuildDependencies")]
    build_deps: Option<IndexDependencies>,
    #[serde(rename = "History")]
    history: Option<IndexHistory>,
}

#[derive(Debug, Deserialize)]
struct IndexSource {
    #[serde(rename = "Name")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct IndexDependencies {
    #[serde(rename = "Dependency", default)]
    deps: Vec<IndexDependency>,
}

#[derive(Debug, Deserialize)]
struct IndexDependency {
    #[serde(rename = "$text")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct IndexHistory {
    #[serde(rename = "Update", default)]
    updates: Vec<IndexUpdate>,
}

#[derive(Debug, Deserialize)]
struct IndexUpdate {
    #[serde(rename = "@release")]
    release: u64,
    #[serde(rename = "Version")]
    version: String,
}

/// Load a legacy repository index.
///
/// # Errors
///
/// Fails if the index is missing, unreadable or malformed, or if a package
/// has no history to take its release from.
pub fn load(path: &Path) -> Result<RepoSnapshot, LoadError> {
    let index_file = if path.is_dir() {
        path.join(INDEX_FILE_NAME)
    } else {
        path.to_path_buf()
    };

    if !index_file.exists() {
        return Err(LoadError::NotFound(index_file));
    }

    let content = fs::read_to_string(&index_file).map_err(|source| LoadError::Io {
        path: index_file.clone(),
        source,
    })?;

    let index: Index = quick_xml::de::from_str(&content).map_err(|source| LoadError::Xml {
        path: index_file.clone(),
        source,
    })?;

    let binary_packages = index.packages.len();
    let (packages, aliases) = fold_by_source(index.packages, &index_file)?;

    tracing::debug!(
        index = %index_file.display(),
        binary_packages,
        sources = packages.len(),
        "Parsed legacy repository index"
    );

    Ok(RepoSnapshot {
        set: PackageSet::with_aliases(packages, aliases)?,
        index_file,
        binary_packages,
    })
}

/// Fold binary entries into source packages. Also returns every binary
/// name that differs from its source, mapped to the source's position.
fn fold_by_source(
    entries: Vec<IndexPackage>,
    path: &Path,
) -> Result<(Vec<Package>, Vec<(String, Position)>), LoadError> {
    let mut packages: Vec<Package> = Vec::new();
    let mut aliases: Vec<(String, Position)> = Vec::new();
    let mut by_source: HashMap<String, Position> = HashMap::new();

    for entry in entries {
        let source = entry
            .source
            .map_or_else(|| entry.name.clone(), |source| source.name);
        let deps = entry
            .build_deps
            .map(|deps| deps.deps.into_iter().map(|dep| dep.name.trim().to_string()))
            .into_iter()
            .flatten();

        if let Some(&position) = by_source.get(&source) {
            if entry.name != source {
                aliases.push((entry.name, position));
            }
            let pkg = &mut packages[position];
            for dep in deps {
                if !pkg.build_deps.contains(&dep) {
                    pkg.build_deps.push(dep);
                }
            }
            continue;
        }

        let Some(newest) = entry.history.and_then(|h| h.updates.into_iter().next()) else {
            return Err(LoadError::Invalid {
                path: path.to_path_buf(),
                reason: format!("package {} has no release history", entry.name),
            });
        };

        let mut build_deps: Vec<String> = Vec::new();
        for dep in deps {
            if !build_deps.contains(&dep) {
                build_deps.push(dep);
            }
        }

        let position = packages.len();
        if entry.name != source {
            aliases.push((entry.name, position));
        }
        by_source.insert(source.clone(), position);
        packages.push(Package {
            name: source,
            version: newest.version,
            release: newest.release,
            build_deps,
        });
    }

    Ok((packages, aliases))
}
