use utoipa::OpenApi;

use crate::common::response::ErrorBody;
use crate::modules::jobs::dto::*;
use crate::modules::jobs::model::{JobProgress, JobStatus};
use crate::modules::settings::dto::{ApiKeyStatus, UpdateApiKeyRequest};
use crate::modules::upload::dto::UploadResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::jobs::handler::submit_caption,
        crate::modules::jobs::handler::submit_concatenate,
        crate::modules::jobs::handler::submit_image_to_video,
        crate::modules::jobs::handler::get_progress,
        crate::modules::jobs::ws_handler::watch_jobs,
        crate::modules::settings::handler::get_api_key_status,
        crate::modules::settings::handler::update_api_key,
        crate::modules::settings::handler::clear_api_key,
        crate::modules::upload::handler::upload_file,
    ),
    components(
        schemas(
            CaptionRequest, CaptionSettings, TextReplacement, VideoPosition, CaptionStyle,
            TextAlignment, ConcatenateRequest, VideoSource, ImageToVideoRequest,
            SubmitJobResponse, ProgressResponse, JobProgress, JobStatus,
            UpdateApiKeyRequest, ApiKeyStatus, UploadResponse, ErrorBody,
        )
    ),
    tags(
        (name = "Jobs", description = "Media processing job submission and progress"),
        (name = "Settings", description = "Processing service credentials"),
        (name = "Upload", description = "File relay into object storage")
    )
)]
pub struct ApiDoc;
