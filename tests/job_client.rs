use media_relay::config::credentials::CredentialStore;
use media_relay::modules::jobs::client::{JobClient, JobClientConfig};
use media_relay::modules::jobs::dto::{
    CaptionRequest, CaptionSettings, ConcatenateRequest, JobRequest, TextReplacement, VideoSource,
};
use media_relay::modules::jobs::error::JobError;
use media_relay::modules::jobs::model::{JobHandle, JobStatus};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "test-key-0123456789";

fn client(server: &MockServer, key: Option<&str>) -> JobClient {
    JobClient::new(
        JobClientConfig::new(server.uri()),
        CredentialStore::new(key.map(str::to_string)),
    )
    .unwrap()
}

fn caption(settings: Option<CaptionSettings>) -> JobRequest {
    JobRequest::from(CaptionRequest {
        video_url: "https://cdn.example.com/clip.mp4".to_string(),
        captions: Some(String::new()),
        settings,
        replace: None,
        language: None,
        webhook_url: None,
        id: Some("my-ref".to_string()),
    })
}

fn concatenate(urls: &[&str]) -> JobRequest {
    JobRequest::from(ConcatenateRequest {
        video_urls: urls
            .iter()
            .map(|u| VideoSource {
                video_url: u.to_string(),
            })
            .collect(),
        webhook_url: None,
        id: None,
    })
}

#[tokio::test]
async fn submit_without_key_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server, None).submit(&caption(None)).await.unwrap_err();
    assert!(matches!(err, JobError::Unauthenticated));
    assert_eq!(err.status_code().as_u16(), 401);
}

#[tokio::test]
async fn concatenate_needs_two_sources() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server, Some(KEY))
        .submit(&concatenate(&["https://cdn.example.com/a.mp4"]))
        .await
        .unwrap_err();
    assert!(matches!(err, JobError::Validation(_)));
    assert_eq!(err.status_code().as_u16(), 400);
}

#[tokio::test]
async fn submit_returns_job_handle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/video/concatenate"))
        .and(header("x-api-key", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 202,
            "job_id": "job-42",
            "message": "processing",
            "queue_length": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let handle = client(&server, Some(KEY))
        .submit(&concatenate(&[
            "https://cdn.example.com/a.mp4",
            "https://cdn.example.com/b.mp4",
        ]))
        .await
        .unwrap();
    assert_eq!(handle, JobHandle::new("job-42"));
}

#[tokio::test]
async fn unset_fields_are_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/video/caption"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "job_id": "job-1" })))
        .mount(&server)
        .await;

    let settings = CaptionSettings {
        word_color: Some("#FFAA00".to_string()),
        font_size: Some(24),
        font_family: Some(String::new()),
        ..CaptionSettings::default()
    };
    client(&server, Some(KEY))
        .submit(&caption(Some(settings)))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(
        body,
        json!({
            "video_url": "https://cdn.example.com/clip.mp4",
            "settings": { "word_color": "#FFAA00", "font_size": 24 },
            "id": "my-ref"
        })
    );
}

#[tokio::test]
async fn forbidden_maps_to_cross_origin_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = client(&server, Some(KEY)).submit(&caption(None)).await.unwrap_err();
    assert!(matches!(err, JobError::ForbiddenCrossOrigin));
    assert_eq!(err.status_code().as_u16(), 403);
}

#[tokio::test]
async fn server_error_keeps_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "queue is full" })),
        )
        .mount(&server)
        .await;

    let err = client(&server, Some(KEY)).submit(&caption(None)).await.unwrap_err();
    match &err {
        JobError::RequestFailed { status, message } => {
            assert_eq!(*status, 500);
            assert_eq!(message, "queue is full");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.status_code().as_u16(), 502);
}

#[tokio::test]
async fn error_without_body_uses_status_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(422))
        .mount(&server)
        .await;

    let err = client(&server, Some(KEY)).submit(&caption(None)).await.unwrap_err();
    match &err {
        JobError::RequestFailed { status, message } => {
            assert_eq!(*status, 422);
            assert_eq!(message, "HTTP error! status: 422");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.status_code().as_u16(), 422);
}

#[tokio::test]
async fn fetch_progress_parses_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/jobs/job-7/progress"))
        .and(header("x-api-key", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "progress": 55.5,
            "status": "processing",
            "preview_url": "https://cdn.example.com/preview.jpg"
        })))
        .mount(&server)
        .await;

    let progress = client(&server, Some(KEY))
        .fetch_progress(&JobHandle::new("job-7"))
        .await
        .unwrap();
    assert_eq!(progress.status, JobStatus::Processing);
    assert_eq!(progress.progress, 55.5);
    assert!(!progress.is_complete());
    assert_eq!(
        progress.preview_url.as_deref(),
        Some("https://cdn.example.com/preview.jpg")
    );
}

#[tokio::test]
async fn replaced_key_is_used_for_next_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("x-api-key", "rotated-key-abcdef"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "progress": 0, "status": "queued" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, Some(KEY));
    client.credentials().replace("rotated-key-abcdef").unwrap();
    client.fetch_progress(&JobHandle::new("job-1")).await.unwrap();
}

#[tokio::test]
async fn empty_replacement_reaches_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/video/caption"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "job_id": "job-2" })))
        .mount(&server)
        .await;

    let request = JobRequest::from(CaptionRequest {
        video_url: "https://cdn.example.com/clip.mp4".to_string(),
        captions: None,
        settings: None,
        replace: Some(vec![TextReplacement {
            find: "um".to_string(),
            replace: String::new(),
        }]),
        language: None,
        webhook_url: None,
        id: None,
    });
    client(&server, Some(KEY)).submit(&request).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["replace"], json!([{ "find": "um", "replace": "" }]));
}

#[tokio::test]
async fn job_id_cannot_leave_the_progress_route() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "progress": 0, "status": "queued" })),
        )
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server, Some(KEY))
        .fetch_progress(&JobHandle::new("../health#"))
        .await
        .unwrap_err();
    assert!(matches!(err, JobError::Validation(_)));
    assert_eq!(err.status_code().as_u16(), 400);
}

#[tokio::test]
async fn job_id_is_escaped_as_one_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/jobs/job%201%25/progress"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "progress": 5, "status": "queued" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let progress = client(&server, Some(KEY))
        .fetch_progress(&JobHandle::new("job 1%"))
        .await
        .unwrap();
    assert_eq!(progress.progress, 5.0);
}
