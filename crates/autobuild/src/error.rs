//! Error types for autobuild operations.

use autobuild_graph::GraphError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The error type for autobuild operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A snapshot reference was not of the form `<kind>:<path>`.
    #[error("invalid tpath '{0}': must be in the form \"[src|bin|repo]:path\"")]
    InvalidTPath(String),

    /// A snapshot could not be loaded.
    #[error("failed to load snapshot {tpath}: {source}")]
    Load {
        /// The snapshot reference that failed.
        tpath: String,
        /// Why loading failed.
        #[source]
        source: LoadError,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Publishing a package failed. Later packages were not published.
    #[error("publishing package {package} failed: {source}")]
    Publish {
        /// Name of the package whose publish failed.
        package: String,
        /// Why publishing failed.
        #[source]
        source: PublishError,
    },

    /// Graph operation failed.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised while turning on-disk metadata into a snapshot.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The snapshot path does not exist.
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Directory traversal failed.
    #[error("cannot walk source tree: {0}")]
    Walk(#[from] walkdir::Error),

    /// A `package.yml` was malformed.
    #[error("malformed {}: {source}", path.display())]
    Yaml {
        /// The offending file.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: serde_yaml::Error,
    },

    /// A line of a JSONL index was malformed.
    #[error("malformed {} at line {line}: {source}", path.display())]
    Json {
        /// The index file.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// An XML index was malformed.
    #[error("malformed {}: {source}", path.display())]
    Xml {
        /// The index file.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: quick_xml::DeError,
    },

    /// Metadata parsed but is semantically invalid.
    #[error("invalid metadata in {}: {reason}", path.display())]
    Invalid {
        /// The offending file.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// Two packages in one snapshot share a name.
    #[error("duplicate package name: {0}")]
    DuplicatePackage(String),

    /// The dependency graph could not be built.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Errors reported by a publisher.
#[derive(Debug, Error)]
pub enum PublishError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The build server refused the job.
    #[error("build server rejected the job ({status}): {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        body: String,
    },

    /// Any other publisher failure.
    #[error("{0}")]
    Other(String),
}

/// A specialized Result type for autobuild operations.
pub type Result<T> = std::result::Result<T, Error>;
