use axum::http::StatusCode;
use thiserror::Error;

pub type JobResult<T> = Result<T, JobError>;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("API key is required")]
    Unauthenticated,

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Request failed with status {status}: {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Unable to access the API due to CORS restrictions. Please check the API configuration.")]
    ForbiddenCrossOrigin,

    #[error("Polling aborted after {attempts} consecutive failures: {last_error}")]
    PollingAborted { attempts: u32, last_error: String },

    #[error("Job failed: {0}")]
    ServerReportedFailure(String),

    #[error("Polling cancelled")]
    Cancelled,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl JobError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            JobError::Unauthenticated => StatusCode::UNAUTHORIZED,
            JobError::Validation(_) => StatusCode::BAD_REQUEST,
            JobError::ForbiddenCrossOrigin => StatusCode::FORBIDDEN,
            JobError::RequestFailed { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            JobError::Cancelled => StatusCode::CONFLICT,
            JobError::InvalidBaseUrl(_) => StatusCode::INTERNAL_SERVER_ERROR,
            JobError::PollingAborted { .. }
            | JobError::ServerReportedFailure(_)
            | JobError::InvalidResponse(_)
            | JobError::Network(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<validator::ValidationErrors> for JobError {
    fn from(errors: validator::ValidationErrors) -> Self {
        JobError::Validation(errors.to_string())
    }
}
