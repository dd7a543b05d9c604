use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateApiKeyRequest {
    #[validate(length(min = 1, message = "API Key is required"))]
    pub api_key: String,
}

/// Whether a key is present and passes validation. The key itself is never returned.
#[derive(Debug, Serialize, PartialEq, Eq, ToSchema)]
pub struct ApiKeyStatus {
    pub configured: bool,
    pub authenticated: bool,
}
