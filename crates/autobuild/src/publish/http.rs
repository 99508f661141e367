//! HTTP client for the build server.

use super::{Job, Publisher};
use crate::config::PublisherConfig;
use crate::domain::Package;
use crate::error::{Error, PublishError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Path of the job submission endpoint, relative to the server URL.
pub const JOBS_PATH: &str = "api/v1/jobs";

/// Publisher that submits jobs to a build server over HTTP.
///
/// Each package is POSTed as JSON to `<endpoint>/api/v1/jobs`; the server
/// answers with `{"id": <job id>}`.
#[derive(Debug, Clone)]
pub struct HttpPublisher {
    client: Client,
    jobs_url: String,
    token: Option<String>,
}

#[derive(Debug, Serialize)]
struct JobRequest<'a> {
    name: &'a str,
    version: &'a str,
    release: u64,
}

impl HttpPublisher {
    /// Create a publisher from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no endpoint is configured or the HTTP
    /// client cannot be built.
    pub fn from_config(config: &PublisherConfig) -> Result<Self> {
        let endpoint = config.endpoint.as_deref().ok_or_else(|| {
            Error::Config("publisher endpoint is not configured".to_string())
        })?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            jobs_url: jobs_url(endpoint),
            token: config.token.clone(),
        })
    }

    /// URL jobs are submitted to.
    #[must_use]
    pub fn jobs_url(&self) -> &str {
        &self.jobs_url
    }
}

fn jobs_url(endpoint: &str) -> String {
    format!("{}/{JOBS_PATH}", endpoint.trim_end_matches('/'))
}

#[async_trait]
impl Publisher for HttpPublisher {
    async fn publish(&self, package: &Package) -> std::result::Result<Job, PublishError> {
        let body = JobRequest {
            name: &package.name,
            version: &package.version,
            release: package.release,
        };

        let mut request = self.client.post(&self.jobs_url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<Job>().await?)
    }
}
