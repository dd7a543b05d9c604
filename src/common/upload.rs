use axum::{body::Bytes, extract::multipart::Field};
use futures_util::{Stream, StreamExt};
use tracing::{error, warn};

use crate::infrastructure::storage::error::{StorageError, StorageResult};
use crate::infrastructure::storage::s3::StorageService;

// S3 rejects non-final parts under 5 MiB.
const MIN_PART_SIZE: usize = 6 * 1024 * 1024;

/// Media families the relay accepts.
const ALLOWED_TYPES: [mime::Name<'static>; 3] = [mime::VIDEO, mime::AUDIO, mime::IMAGE];

pub fn is_allowed_media(content_type: &str) -> bool {
    content_type
        .parse::<mime::Mime>()
        .is_ok_and(|m| ALLOWED_TYPES.iter().any(|t| t.as_str() == m.type_().as_str()))
}

/// Content type declared on the part, else guessed from the file name.
pub fn resolve_content_type(declared: Option<&str>, file_name: &str) -> String {
    match declared {
        Some(ct) if !ct.is_empty() && ct != mime::APPLICATION_OCTET_STREAM.as_ref() => ct.to_string(),
        _ => mime_guess::from_path(file_name)
            .first_or_octet_stream()
            .to_string(),
    }
}

pub struct MultipartUploader<'a> {
    storage: &'a StorageService,
    key: String,
    upload_id: String,
    parts: Vec<aws_sdk_s3::types::CompletedPart>,
    part_number: i32,
    buffer: Vec<u8>,
    written: u64,
}

impl<'a> MultipartUploader<'a> {
    pub async fn new(storage: &'a StorageService, key: String, content_type: &str) -> StorageResult<Self> {
        let upload_id = storage.create_multipart_upload(&key, content_type).await?;

        Ok(Self {
            storage,
            key,
            upload_id,
            parts: Vec::new(),
            part_number: 1,
            buffer: Vec::with_capacity(MIN_PART_SIZE),
            written: 0,
        })
    }

    pub async fn write_chunk(&mut self, chunk: Bytes) -> StorageResult<()> {
        self.written += chunk.len() as u64;
        self.buffer.extend_from_slice(&chunk);

        if self.buffer.len() >= MIN_PART_SIZE {
            self.flush_part().await?;
        }

        Ok(())
    }

    async fn flush_part(&mut self) -> StorageResult<()> {
        let body = Bytes::from(std::mem::replace(
            &mut self.buffer,
            Vec::with_capacity(MIN_PART_SIZE),
        ));

        let part = self
            .storage
            .upload_part(&self.key, &self.upload_id, self.part_number, body)
            .await?;

        self.parts.push(part);
        self.part_number += 1;

        Ok(())
    }

    /// Uploads what is left and completes the object. Returns bytes written.
    pub async fn finish(&mut self) -> StorageResult<u64> {
        // A multipart upload needs at least one part, even for an empty file.
        if !self.buffer.is_empty() || self.parts.is_empty() {
            self.flush_part().await?;
        }

        self.storage
            .complete_multipart_upload(&self.key, &self.upload_id, std::mem::take(&mut self.parts))
            .await?;

        Ok(self.written)
    }

    pub async fn abort(&self) {
        if let Err(e) = self.storage.abort_multipart_upload(&self.key, &self.upload_id).await {
            warn!("Failed to abort upload of {}: {}", self.key, e);
        }
    }
}

/// Streams `chunks` into `key`, aborting the multipart upload on any error.
/// The content type is expected to be checked by the caller.
pub async fn stream_to_s3<S, E>(
    storage: &StorageService,
    chunks: S,
    key: &str,
    content_type: &str,
) -> StorageResult<u64>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
{
    let mut chunks = std::pin::pin!(chunks);
    let mut uploader = MultipartUploader::new(storage, key.to_string(), content_type).await?;

    while let Some(chunk) = chunks.next().await {
        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => {
                error!("Upload stream error for {}: {}", key, e);
                uploader.abort().await;
                return Err(StorageError::StreamInterrupted(e.to_string()));
            }
        };

        if let Err(e) = uploader.write_chunk(chunk).await {
            error!("Part upload error for {}: {}", key, e);
            uploader.abort().await;
            return Err(e);
        }
    }

    match uploader.finish().await {
        Ok(written) => Ok(written),
        Err(e) => {
            error!("Completing upload of {} failed: {}", key, e);
            uploader.abort().await;
            Err(e)
        }
    }
}

/// Convenience wrapper for a multipart form field.
pub async fn stream_field_to_s3(
    storage: &StorageService,
    field: Field<'_>,
    key: &str,
    content_type: &str,
) -> StorageResult<u64> {
    stream_to_s3(storage, field, key, content_type).await
}
