use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::{JobError, JobResult};

/// Identifier returned by the processing service for a submitted job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct JobHandle {
    pub job_id: String,
}

impl JobHandle {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self { job_id: job_id.into() }
    }

    /// Rejects ids that would not stay a single path segment.
    pub fn validate(&self) -> JobResult<()> {
        let id = self.job_id.as_str();
        let malformed = id.trim().is_empty()
            || id == "."
            || id == ".."
            || id.chars().any(|c| matches!(c, '/' | '\\' | '?' | '#') || c.is_control());

        if malformed {
            return Err(JobError::Validation(format!("invalid job id {:?}", id)));
        }
        Ok(())
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.job_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct JobProgress {
    pub progress: f64,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Default for JobProgress {
    fn default() -> Self {
        Self {
            progress: 0.0,
            status: JobStatus::Queued,
            preview_url: None,
            output_url: None,
            message: None,
        }
    }
}

impl JobProgress {
    /// A job is done when the server says so or the percentage tops out.
    pub fn is_complete(&self) -> bool {
        self.status == JobStatus::Completed || self.progress >= 100.0
    }

    pub fn is_failed(&self) -> bool {
        self.status == JobStatus::Failed
    }
}

/// Body returned by the submission endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub code: Option<i64>,
    pub job_id: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub queue_length: Option<i64>,
}
