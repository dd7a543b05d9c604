use axum::extract::multipart::Field;
use time::OffsetDateTime;
use tracing::info;

use super::dto::UploadResponse;
use crate::common::upload::{is_allowed_media, resolve_content_type, stream_field_to_s3};
use crate::infrastructure::storage::error::{StorageError, StorageResult};
use crate::state::AppState;

const FALLBACK_NAME: &str = "upload";

pub struct UploadService;

impl UploadService {
    /// Keeps only the last path segment and replaces anything outside
    /// `[A-Za-z0-9._-]` so the name is safe as an object key.
    pub fn sanitize_file_name(name: &str) -> String {
        let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
        let cleaned: String = base
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        if cleaned.trim_matches(['.', '_']).is_empty() {
            FALLBACK_NAME.to_string()
        } else {
            cleaned
        }
    }

    pub fn object_key(file_name: &str, now: OffsetDateTime) -> String {
        let millis = now.unix_timestamp_nanos() / 1_000_000;
        format!("{}-{}", millis, Self::sanitize_file_name(file_name))
    }

    pub async fn relay(state: AppState, field: Field<'_>) -> StorageResult<UploadResponse> {
        let file_name = field.file_name().unwrap_or(FALLBACK_NAME).to_string();
        let content_type = resolve_content_type(field.content_type(), &file_name);
        if !is_allowed_media(&content_type) {
            return Err(StorageError::UnsupportedContentType(content_type));
        }

        state.storage.ensure_bucket().await?;

        let key = Self::object_key(&file_name, OffsetDateTime::now_utc());
        info!("Relaying {} ({}) to {}", file_name, content_type, key);

        let written = stream_field_to_s3(&state.storage, field, &key, &content_type).await?;
        let url = state
            .storage
            .presign_get(&key, state.config.upload_url_ttl())
            .await?;

        info!(key = %key, bytes = written, "Upload stored");
        Ok(UploadResponse { url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_object_key_is_millis_prefixed() {
        let now = datetime!(2024-01-01 00:00:00.123 UTC);
        assert_eq!(
            UploadService::object_key("clip.mp4", now),
            "1704067200123-clip.mp4"
        );
    }

    #[test]
    fn test_sanitize_strips_directories_and_odd_chars() {
        assert_eq!(UploadService::sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(UploadService::sanitize_file_name("C:\\videos\\my clip (1).mov"), "my_clip__1_.mov");
        assert_eq!(UploadService::sanitize_file_name("..."), "upload");
        assert_eq!(UploadService::sanitize_file_name(""), "upload");
    }
}
