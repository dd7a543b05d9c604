use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{error, warn};

use super::dto::UploadResponse;
use super::service::UploadService;
use crate::common::response::RelayError;
use crate::infrastructure::storage::error::StorageError;
use crate::state::AppState;

const FILE_FIELD: &str = "file";

/// Upload a media file
/// Streams the `file` part into object storage and returns a signed link.
#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "No file uploaded", body = crate::common::response::ErrorBody),
        (status = 415, description = "Not a video, audio or image file", body = crate::common::response::ErrorBody),
        (status = 500, description = "Storage failure", body = crate::common::response::ErrorBody)
    ),
    tag = "Upload"
)]
pub async fn upload_file(State(state): State<AppState>, mut multipart: Multipart) -> impl IntoResponse {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Malformed multipart body: {}", e);
                return RelayError("Invalid multipart body", e.status()).into_response();
            }
        };

        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        return match UploadService::relay(state, field).await {
            Ok(res) => (StatusCode::OK, Json(res)).into_response(),
            Err(StorageError::UnsupportedContentType(ct)) => {
                warn!("Rejected upload with content type {}", ct);
                RelayError("Unsupported file type", StatusCode::UNSUPPORTED_MEDIA_TYPE).into_response()
            }
            Err(e) => {
                error!("Error uploading file: {}", e);
                RelayError("Failed to upload file", StatusCode::INTERNAL_SERVER_ERROR).into_response()
            }
        };
    }

    RelayError("No file uploaded", StatusCode::BAD_REQUEST).into_response()
}
