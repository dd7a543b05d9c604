use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::dto::*;
use super::service::JobService;
use crate::common::response::{ApiError, ApiResponse, ApiSuccess};
use crate::state::AppState;

async fn submit(state: AppState, request: JobRequest) -> Response {
    match JobService::submit(state, request).await {
        Ok(res) => ApiSuccess(
            ApiResponse::success(res, "Job submitted successfully"),
            StatusCode::CREATED,
        )
        .into_response(),
        Err(e) => {
            warn!("Job submission failed: {}", e);
            ApiError(e.to_string(), e.status_code()).into_response()
        }
    }
}

/// Submit a captioning job
#[utoipa::path(
    post,
    path = "/api/v1/jobs/caption",
    request_body = CaptionRequest,
    responses(
        (status = 201, description = "Job accepted", body = ApiResponse<SubmitJobResponse>),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "API key not configured"),
        (status = 403, description = "Rejected by the processing service"),
        (status = 502, description = "Processing service unavailable")
    ),
    tag = "Jobs"
)]
pub async fn submit_caption(
    State(state): State<AppState>,
    Json(req): Json<CaptionRequest>,
) -> impl IntoResponse {
    submit(state, req.into()).await
}

/// Submit a video concatenation job
#[utoipa::path(
    post,
    path = "/api/v1/jobs/concatenate",
    request_body = ConcatenateRequest,
    responses(
        (status = 201, description = "Job accepted", body = ApiResponse<SubmitJobResponse>),
        (status = 400, description = "Fewer than two videos or invalid URL"),
        (status = 401, description = "API key not configured"),
        (status = 502, description = "Processing service unavailable")
    ),
    tag = "Jobs"
)]
pub async fn submit_concatenate(
    State(state): State<AppState>,
    Json(req): Json<ConcatenateRequest>,
) -> impl IntoResponse {
    submit(state, req.into()).await
}

/// Submit an image-to-video job
#[utoipa::path(
    post,
    path = "/api/v1/jobs/image-to-video",
    request_body = ImageToVideoRequest,
    responses(
        (status = 201, description = "Job accepted", body = ApiResponse<SubmitJobResponse>),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "API key not configured"),
        (status = 502, description = "Processing service unavailable")
    ),
    tag = "Jobs"
)]
pub async fn submit_image_to_video(
    State(state): State<AppState>,
    Json(req): Json<ImageToVideoRequest>,
) -> impl IntoResponse {
    submit(state, req.into()).await
}

/// Read a job's current progress once
#[utoipa::path(
    get,
    path = "/api/v1/jobs/{job_id}/progress",
    params(
        ("job_id" = String, Path, description = "Job ID returned on submission")
    ),
    responses(
        (status = 200, description = "Current progress", body = ApiResponse<ProgressResponse>),
        (status = 401, description = "API key not configured"),
        (status = 404, description = "Unknown job"),
        (status = 502, description = "Processing service unavailable")
    ),
    tag = "Jobs"
)]
pub async fn get_progress(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    match JobService::progress(state, job_id).await {
        Ok(res) => ApiSuccess(
            ApiResponse::success(res, "Progress retrieved successfully"),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => ApiError(e.to_string(), e.status_code()).into_response(),
    }
}
