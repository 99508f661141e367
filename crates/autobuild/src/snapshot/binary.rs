//! Binary repository snapshots.
//!
//! A binary repository publishes a JSON Lines index with one package record
//! per line:
//!
//! ```text
//! {"name":"nano","version":"8.2","release":169,"build_deps":["ncurses-devel"]}
//! {"name":"ncurses-devel","version":"6.5","release":40}
//! ```
//!
//! The snapshot path may name the index file directly or a directory
//! containing [`INDEX_FILE_NAME`]. Blank lines are ignored; any other line
//! that fails to parse fails the whole load with its line number.

use super::{PackageSet, Snapshot};
use crate::domain::Package;
use crate::error::LoadError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Index file looked up when the snapshot path is a directory.
pub const INDEX_FILE_NAME: &str = "index.jsonl";

/// Snapshot loaded from a binary repository index.
#[derive(Debug, Clone)]
pub struct BinarySnapshot {
    index_file: PathBuf,
    set: PackageSet,
}

impl BinarySnapshot {
    /// The index file the snapshot was read from.
    #[must_use]
    pub fn index_file(&self) -> &Path {
        &self.index_file
    }
}

impl Snapshot for BinarySnapshot {
    fn package_set(&self) -> &PackageSet {
        &self.set
    }

    fn origin(&self) -> Option<&Path> {
        Some(&self.index_file)
    }
}

#[derive(Debug, Deserialize)]
struct IndexRecord {
    name: String,
    version: String,
    release: u64,
    #[serde(default, alias = "builddeps")]
    build_deps: Vec<String>,
}

impl From<IndexRecord> for Package {
    fn from(record: IndexRecord) -> Self {
        Package {
            name: record.name,
            version: record.version,
            release: record.release,
            build_deps: record.build_deps,
        }
    }
}

/// Load a binary repository index.
///
/// # Errors
///
/// Fails if the index is missing or unreadable, a line is malformed, or a
/// name appears twice.
pub fn load(path: &Path) -> Result<BinarySnapshot, LoadError> {
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

    let packages = parse_index(&content, &index_file)?;
    tracing::debug!(index = %index_file.display(), packages = packages.len(), "Parsed binary index");

    Ok(BinarySnapshot {
        set: PackageSet::new(packages)?,
        index_file,
    })
}

fn parse_index(content: &str, path: &Path) -> Result<Vec<Package>, LoadError> {
    let mut packages = Vec::new();

    for (offset, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let record: IndexRecord = serde_json::from_str(line).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            line: offset + 1,
            source,
        })?;
        packages.push(record.into());
    }

    Ok(packages)
}
