use tracing::info;

use super::dto::{JobRequest, ProgressResponse, SubmitJobResponse};
use super::error::JobResult;
use super::model::JobHandle;
use crate::state::AppState;

pub struct JobService;

impl JobService {
    pub async fn submit(state: AppState, request: JobRequest) -> JobResult<SubmitJobResponse> {
        let kind = request.kind();
        let handle = state.jobs.submit(&request).await?;

        info!(job_id = %handle, kind, "Job submitted");
        Ok(SubmitJobResponse::new(handle, kind))
    }

    pub async fn progress(state: AppState, job_id: String) -> JobResult<ProgressResponse> {
        let handle = JobHandle::new(job_id);
        let progress = state.jobs.fetch_progress(&handle).await?;

        Ok(ProgressResponse {
            job_id: handle.job_id,
            progress,
        })
    }
}
