//! Handing planned packages to the build server.
//!
//! A [`Publisher`] submits one package and returns the build server's job
//! handle. [`publish_in_order`] drives a publisher over a computed build
//! order: strictly sequential, stopping at the first failure. Packages
//! published before the failure stay published; the build server is
//! expected to treat resubmission idempotently.
//!
//! # Test Utilities
//!
//! [`MockPublisher`] records submissions and can be told to fail on a
//! package. It is available in unit tests and behind the `test-util`
//! feature.

mod http;
#[cfg(any(test, feature = "test-util"))]
mod mock;

pub use http::HttpPublisher;
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockPublisher;

use crate::domain::Package;
use crate::error::{Error, PublishError, Result};
use crate::snapshot::Snapshot;
use async_trait::async_trait;
use autobuild_graph::{GraphError, Position};
use serde::{Deserialize, Serialize};

/// Build server job handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Job ID assigned by the build server
    pub id: u64,
}

/// Submits packages for building.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Submit `package` and return its job handle.
    ///
    /// # Errors
    ///
    /// Returns a [`PublishError`] if the submission is not accepted.
    async fn publish(&self, package: &Package) -> std::result::Result<Job, PublishError>;
}

/// A package that was submitted successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Published {
    /// Package name
    pub package: String,
    /// Job handle returned by the build server
    pub job: Job,
}

/// Publish the packages at `order` one at a time, in order.
///
/// # Errors
///
/// Returns [`Error::Publish`] for the first package that fails; nothing after
/// it is submitted. Returns [`Error::Graph`] if `order` holds a position the
/// snapshot does not have.
pub async fn publish_in_order(
    publisher: &dyn Publisher,
    snapshot: &dyn Snapshot,
    order: &[Position],
) -> Result<Vec<Published>> {
    let mut published = Vec::with_capacity(order.len());

    for &position in order {
        let package = snapshot
            .packages()
            .get(position)
            .ok_or(GraphError::UnknownPosition(position))?;

        tracing::info!(package = %package.name, "Publishing");
        let job = publisher
            .publish(package)
            .await
            .map_err(|source| Error::Publish {
                package: package.name.clone(),
                source,
            })?;
        tracing::info!(package = %package.name, job = job.id, "Published package");

        published.push(Published {
            package: package.name.clone(),
            job,
        });
    }

    Ok(published)
}
