use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::model::{JobHandle, JobProgress};

// --- CAPTION ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VideoPosition {
    BottomLeft,
    BottomCenter,
    BottomRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    TopLeft,
    TopCenter,
    TopRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CaptionStyle {
    Classic,
    Karaoke,
    Highlight,
    Underline,
    WordByWord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TextAlignment {
    Left,
    Center,
    Right,
}

/// Caption styling. `None` leaves the server default in place and is
/// stripped from the outbound payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct CaptionSettings {
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(custom(function = "validate_hex_color"))]
    pub line_color: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(custom(function = "validate_hex_color"))]
    pub word_color: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(custom(function = "validate_hex_color"))]
    pub outline_color: Option<String>,
    pub all_caps: Option<bool>,
    #[validate(range(min = 1, max = 20))]
    pub max_words_per_line: Option<u32>,
    #[validate(range(min = 0, max = 100))]
    pub x: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub y: Option<i32>,
    pub position: Option<VideoPosition>,
    pub alignment: Option<TextAlignment>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub font_family: Option<String>,
    #[validate(range(min = 12, max = 72))]
    pub font_size: Option<u32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub strikeout: Option<bool>,
    pub style: Option<CaptionStyle>,
    #[validate(range(min = 0, max = 10))]
    pub outline_width: Option<u32>,
    #[validate(range(min = 0, max = 20))]
    pub spacing: Option<u32>,
    #[validate(range(min = -180, max = 180))]
    pub angle: Option<i32>,
    #[validate(range(min = 0, max = 20))]
    pub shadow_offset: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct TextReplacement {
    #[validate(length(min = 1, message = "find text must not be empty"))]
    pub find: String,
    pub replace: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct CaptionRequest {
    #[validate(url(message = "video_url must be a valid URL"))]
    pub video_url: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub captions: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub settings: Option<CaptionSettings>,
    #[serde(default)]
    #[validate(nested)]
    pub replace: Option<Vec<TextReplacement>>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(url(message = "webhook_url must be a valid URL"))]
    pub webhook_url: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub id: Option<String>,
}

// --- CONCATENATE ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct VideoSource {
    #[validate(url(message = "video_url must be a valid URL"))]
    pub video_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct ConcatenateRequest {
    #[validate(length(min = 2, message = "at least two videos are required"), nested)]
    pub video_urls: Vec<VideoSource>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(url(message = "webhook_url must be a valid URL"))]
    pub webhook_url: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub id: Option<String>,
}

// --- IMAGE TO VIDEO ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct ImageToVideoRequest {
    #[validate(url(message = "image_url must be a valid URL"))]
    pub image_url: String,
    /// Output length in seconds.
    #[serde(default)]
    #[validate(range(exclusive_min = 0.0))]
    pub length: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 1, max = 120))]
    pub frame_rate: Option<u32>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub zoom_speed: Option<f64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(url(message = "webhook_url must be a valid URL"))]
    pub webhook_url: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub id: Option<String>,
}

/// One submission to the processing service.
#[derive(Debug, Clone, PartialEq)]
pub enum JobRequest {
    Caption(CaptionRequest),
    Concatenate(ConcatenateRequest),
    ImageToVideo(ImageToVideoRequest),
}

impl JobRequest {
    pub fn endpoint(&self) -> &'static str {
        match self {
            JobRequest::Caption(_) => "/v1/video/caption",
            JobRequest::Concatenate(_) => "/v1/video/concatenate",
            JobRequest::ImageToVideo(_) => "/v1/image/transform/video",
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            JobRequest::Caption(_) => "caption",
            JobRequest::Concatenate(_) => "concatenate",
            JobRequest::ImageToVideo(_) => "image_to_video",
        }
    }

    pub fn validate(&self) -> Result<(), validator::ValidationErrors> {
        match self {
            JobRequest::Caption(req) => req.validate(),
            JobRequest::Concatenate(req) => req.validate(),
            JobRequest::ImageToVideo(req) => req.validate(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            JobRequest::Caption(req) => serde_json::to_value(req),
            JobRequest::Concatenate(req) => serde_json::to_value(req),
            JobRequest::ImageToVideo(req) => serde_json::to_value(req),
        }
    }
}

impl From<CaptionRequest> for JobRequest {
    fn from(req: CaptionRequest) -> Self {
        JobRequest::Caption(req)
    }
}

impl From<ConcatenateRequest> for JobRequest {
    fn from(req: ConcatenateRequest) -> Self {
        JobRequest::Concatenate(req)
    }
}

impl From<ImageToVideoRequest> for JobRequest {
    fn from(req: ImageToVideoRequest) -> Self {
        JobRequest::ImageToVideo(req)
    }
}

/// Blank strings mean "unset", same as a missing or null field.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

fn validate_hex_color(value: &str) -> Result<(), ValidationError> {
    let digits = value.strip_prefix('#').unwrap_or("");
    if digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ValidationError::new("hex_color"))
    }
}

// --- RESPONSES ---

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitJobResponse {
    pub job_id: String,
    pub kind: String,
}

impl SubmitJobResponse {
    pub fn new(handle: JobHandle, kind: &str) -> Self {
        Self {
            job_id: handle.job_id,
            kind: kind.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProgressResponse {
    pub job_id: String,
    #[serde(flatten)]
    pub progress: JobProgress,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caption(video_url: &str) -> CaptionRequest {
        CaptionRequest {
            video_url: video_url.to_string(),
            captions: None,
            settings: None,
            replace: None,
            language: None,
            webhook_url: None,
            id: None,
        }
    }

    #[test]
    fn test_endpoints_per_kind() {
        let req = JobRequest::from(caption("https://cdn.example.com/a.mp4"));
        assert_eq!(req.endpoint(), "/v1/video/caption");

        let req = JobRequest::from(ImageToVideoRequest {
            image_url: "https://cdn.example.com/a.png".to_string(),
            length: Some(10.0),
            frame_rate: None,
            zoom_speed: None,
            webhook_url: None,
            id: None,
        });
        assert_eq!(req.endpoint(), "/v1/image/transform/video");
        assert_eq!(req.kind(), "image_to_video");
    }

    #[test]
    fn test_missing_source_fails_validation() {
        let req = JobRequest::from(caption(""));
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_caption_settings_ranges() {
        let mut req = caption("https://cdn.example.com/a.mp4");
        req.settings = Some(CaptionSettings {
            font_size: Some(8),
            ..CaptionSettings::default()
        });
        assert!(req.validate().is_err());

        req.settings = Some(CaptionSettings {
            font_size: Some(24),
            angle: Some(-90),
            line_color: Some("#FFFFFF".to_string()),
            ..CaptionSettings::default()
        });
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_hex_color_rule() {
        assert!(validate_hex_color("#00ff7A").is_ok());
        assert!(validate_hex_color("00ff7A").is_err());
        assert!(validate_hex_color("#fff").is_err());
    }

    #[test]
    fn test_concatenate_needs_two_sources() {
        let one = ConcatenateRequest {
            video_urls: vec![VideoSource {
                video_url: "https://cdn.example.com/a.mp4".to_string(),
            }],
            webhook_url: None,
            id: None,
        };
        let errors = one.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("video_urls"));
    }

    #[test]
    fn test_blank_strings_deserialize_as_unset() {
        let req: CaptionRequest = serde_json::from_value(serde_json::json!({
            "video_url": "https://cdn.example.com/a.mp4",
            "captions": "",
            "webhook_url": "",
            "language": "  ",
            "id": null,
            "settings": { "line_color": "", "font_family": "", "font_size": 30 }
        }))
        .unwrap();

        assert_eq!(req.webhook_url, None);
        assert_eq!(req.captions, None);
        assert_eq!(req.language, None);
        assert_eq!(req.id, None);
        let settings = req.settings.as_ref().unwrap();
        assert_eq!(settings.line_color, None);
        assert_eq!(settings.font_family, None);
        assert_eq!(settings.font_size, Some(30));
        assert!(req.validate().is_ok());

        let concat: ConcatenateRequest = serde_json::from_value(serde_json::json!({
            "video_urls": [
                { "video_url": "https://cdn.example.com/a.mp4" },
                { "video_url": "https://cdn.example.com/b.mp4" }
            ],
            "webhook_url": ""
        }))
        .unwrap();
        assert_eq!(concat.webhook_url, None);
        assert!(concat.validate().is_ok());
    }

    #[test]
    fn test_style_enums_use_wire_names() {
        let settings = CaptionSettings {
            position: Some(VideoPosition::BottomCenter),
            style: Some(CaptionStyle::WordByWord),
            ..CaptionSettings::default()
        };
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["position"], "bottom_center");
        assert_eq!(json["style"], "word_by_word");
    }
}
