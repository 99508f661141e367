//! Domain types for package metadata.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A build unit as described by package metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Package name, unique within a snapshot
    pub name: String,

    /// Upstream version. Opaque: only ever compared for equality.
    pub version: String,

    /// Release counter, bumped by the packaging system on every rebuild
    pub release: u64,

    /// Names of build dependencies, in declaration order
    #[serde(default)]
    pub build_deps: Vec<String>,
}

impl Package {
    /// Create a package with no build dependencies.
    pub fn new(name: impl Into<String>, version: impl Into<String>, release: u64) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            release,
            build_deps: Vec::new(),
        }
    }

    /// Set the build dependencies.
    #[must_use]
    pub fn with_build_deps<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.build_deps = deps.into_iter().map(Into::into).collect();
        self
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.name, self.version, self.release)
    }
}
