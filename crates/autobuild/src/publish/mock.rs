//! In-memory publisher for tests.

use super::{Job, Publisher};
use crate::domain::Package;
use crate::error::PublishError;
use async_trait::async_trait;
use std::sync::Mutex;

/// Publisher that records submissions instead of contacting a server.
///
/// Job IDs are assigned sequentially from 1. A publisher built with
/// [`MockPublisher::failing_on`] rejects that package and everything is
/// still recorded as an attempt.
#[derive(Debug, Default)]
pub struct MockPublisher {
    fail_on: Option<String>,
    state: Mutex<MockState>,
}

#[derive(Debug, Default)]
struct MockState {
    attempts: usize,
    published: Vec<String>,
}

impl MockPublisher {
    /// Publisher that accepts every package.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publisher that rejects the package called `name`.
    #[must_use]
    pub fn failing_on(name: impl Into<String>) -> Self {
        Self {
            fail_on: Some(name.into()),
            state: Mutex::default(),
        }
    }

    /// Names of successfully published packages, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn published(&self) -> Vec<String> {
        self.state.lock().unwrap().published.clone()
    }

    /// Number of publish calls, including failed ones.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.state.lock().unwrap().attempts
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn publish(&self, package: &Package) -> Result<Job, PublishError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| PublishError::Other("mock publisher lock poisoned".to_string()))?;
        state.attempts += 1;

        if self.fail_on.as_deref() == Some(package.name.as_str()) {
            return Err(PublishError::Other(format!(
                "mock rejection of {}",
                package.name
            )));
        }

        state.published.push(package.name.clone());
        Ok(Job {
            id: state.published.len() as u64,
        })
    }
}
