//! HTTP client for the media processing service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, header};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::dto::JobRequest;
use super::error::{JobError, JobResult};
use super::model::{JobHandle, JobProgress, SubmitResponse};
use super::payload::strip_unset;
use super::poller::ProgressSource;
use crate::config::credentials::{ApiKey, CredentialStore};

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone)]
pub struct JobClientConfig {
    /// Base URL of the processing service, without trailing slash.
    pub base_url: String,
    pub timeout: Duration,
}

impl JobClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Submits jobs and reads their progress. One network call per method
/// invocation; retries are the poller's business.
#[derive(Clone)]
pub struct JobClient {
    http: Client,
    config: JobClientConfig,
    base: Url,
    credentials: CredentialStore,
}

impl JobClient {
    pub fn new(config: JobClientConfig, credentials: CredentialStore) -> JobResult<Self> {
        let base = Url::parse(&config.base_url).map_err(|e| JobError::InvalidBaseUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(JobError::InvalidBaseUrl(config.base_url.clone()));
        }

        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            config,
            base,
            credentials,
        })
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// `{base}/v1/jobs/{id}/progress` with the id escaped as one segment.
    fn progress_url(&self, job: &JobHandle) -> JobResult<Url> {
        job.validate()?;

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| JobError::InvalidBaseUrl(self.config.base_url.clone()))?
            .pop_if_empty()
            .extend(["v1", "jobs", job.job_id.as_str(), "progress"]);
        Ok(url)
    }

    fn api_key(&self) -> JobResult<ApiKey> {
        self.credentials.current().ok_or(JobError::Unauthenticated)
    }

    /// Builds the JSON body actually sent for `request`.
    pub fn payload(request: &JobRequest) -> JobResult<serde_json::Value> {
        let mut body = request
            .to_json()
            .map_err(|e| JobError::Validation(e.to_string()))?;
        strip_unset(&mut body);
        Ok(body)
    }

    pub async fn submit(&self, request: &JobRequest) -> JobResult<JobHandle> {
        let key = self.api_key()?;
        request.validate()?;
        let body = Self::payload(request)?;

        let url = self.url(request.endpoint());
        debug!("Submitting {} job to {}", request.kind(), url);

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, key.expose())
            .header(header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let submitted: SubmitResponse = Self::read_json(response).await?;
        if submitted.job_id.trim().is_empty() {
            return Err(JobError::InvalidResponse("empty job_id".to_string()));
        }

        debug!(
            job_id = %submitted.job_id,
            code = ?submitted.code,
            queue_length = ?submitted.queue_length,
            "Job accepted"
        );
        Ok(JobHandle::new(submitted.job_id))
    }

    pub async fn fetch_progress(&self, job: &JobHandle) -> JobResult<JobProgress> {
        let key = self.api_key()?;
        let url = self.progress_url(job)?;

        let response = self
            .http
            .get(url)
            .header(API_KEY_HEADER, key.expose())
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        Self::read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> JobResult<T> {
        let status = response.status();

        if status == StatusCode::FORBIDDEN {
            warn!("Processing service rejected the request as cross-origin");
            return Err(JobError::ForbiddenCrossOrigin);
        }

        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
            return Err(JobError::RequestFailed {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| JobError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl ProgressSource for JobClient {
    async fn fetch_progress(&self, job: &JobHandle) -> JobResult<JobProgress> {
        JobClient::fetch_progress(self, job).await
    }
}
