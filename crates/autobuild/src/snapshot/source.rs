//! Source tree snapshots.
//!
//! A source tree is a directory hierarchy in which every directory holding a
//! `package.yml` recipe is one package:
//!
//! ```yaml
//! name: nano
//! version: 8.2
//! release: 169
//! builddeps:
//!   - ncurses-devel
//! ```
//!
//! Hidden directories are skipped. Packages are ordered by recipe path so the
//! snapshot order is stable across runs.

use super::{PackageSet, Snapshot};
use crate::domain::Package;
use crate::error::LoadError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Name of the recipe file that marks a package directory.
pub const RECIPE_FILE_NAME: &str = "package.yml";

/// Snapshot loaded from a source tree.
#[derive(Debug, Clone)]
pub struct SourceSnapshot {
    root: PathBuf,
    recipes: Vec<PathBuf>,
    set: PackageSet,
}

impl SourceSnapshot {
    /// Recipe file for the package at `position`.
    #[must_use]
    pub fn recipe(&self, position: usize) -> Option<&Path> {
        self.recipes.get(position).map(PathBuf::as_path)
    }
}

impl Snapshot for SourceSnapshot {
    fn package_set(&self) -> &PackageSet {
        &self.set
    }

    fn origin(&self) -> Option<&Path> {
        Some(&self.root)
    }
}

#[derive(Debug, Deserialize)]
struct Recipe {
    name: String,
    version: serde_yaml::Value,
    release: u64,
    #[serde(default)]
    builddeps: Vec<String>,
}

/// Load every recipe under `root`.
///
/// # Errors
///
/// Fails if `root` does not exist, a directory cannot be walked, or any
/// recipe is unreadable or malformed.
pub fn load(root: &Path) -> Result<SourceSnapshot, LoadError> {
    if !root.exists() {
        return Err(LoadError::NotFound(root.to_path_buf()));
    }

    let mut packages = Vec::new();
    let mut recipes = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || entry.file_name() != RECIPE_FILE_NAME {
            continue;
        }

        let path = entry.into_path();
        packages.push(parse_recipe(&path)?);
        recipes.push(path);
    }

    tracing::debug!(root = %root.display(), recipes = recipes.len(), "Parsed source tree");

    Ok(SourceSnapshot {
        root: root.to_path_buf(),
        recipes,
        set: PackageSet::new(packages)?,
    })
}

fn parse_recipe(path: &Path) -> Result<Package, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let recipe: Recipe = serde_yaml::from_str(&content).map_err(|source| LoadError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;

    // YAML reads `version: 8.2` as a number, and `1.10` would come back as
    // "1.1". Keep the text as written in the recipe instead.
    let version = match recipe.version {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Number(n) => match number_as_written(&content, "version", &n) {
            Some(text) => text.to_string(),
            None => {
                return Err(LoadError::Invalid {
                    path: path.to_path_buf(),
                    reason: format!("cannot recover numeric version {n} as written, quote it"),
                });
            }
        },
        other => {
            return Err(LoadError::Invalid {
                path: path.to_path_buf(),
                reason: format!("version must be a string or number, got {other:?}"),
            });
        }
    };

    Ok(Package {
        name: recipe.name,
        version,
        release: recipe.release,
        build_deps: recipe.builddeps,
    })
}

/// The unquoted text of a top-level `key: <number>` line, if it reads back
/// as `number`.
fn number_as_written<'a>(content: &'a str, key: &str, number: &serde_yaml::Number) -> Option<&'a str> {
    let text = content.lines().find_map(|line| {
        let value = line.strip_prefix(key)?.strip_prefix(':')?;
        let value = value.split(" #").next().unwrap_or(value).trim();
        (!value.is_empty()).then_some(value)
    })?;

    match serde_yaml::from_str::<serde_yaml::Value>(text) {
        Ok(serde_yaml::Value::Number(parsed)) if parsed == *number => Some(text),
        _ => None,
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}
