use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use super::dto::{ApiKeyStatus, UpdateApiKeyRequest};
use crate::common::response::{ApiError, ApiResponse, ApiSuccess};
use crate::config::credentials::CredentialStore;
use crate::state::AppState;

fn status_of(store: &CredentialStore) -> ApiKeyStatus {
    ApiKeyStatus {
        configured: store.is_configured(),
        authenticated: store.is_authenticated(),
    }
}

/// Report whether an API key is configured
#[utoipa::path(
    get,
    path = "/api/v1/settings/api-key",
    responses(
        (status = 200, description = "Key status", body = ApiResponse<ApiKeyStatus>)
    ),
    tag = "Settings"
)]
pub async fn get_api_key_status(State(state): State<AppState>) -> impl IntoResponse {
    ApiSuccess(
        ApiResponse::success(status_of(&state.credentials), "API key status retrieved"),
        StatusCode::OK,
    )
}

/// Replace the API key used for the processing service
#[utoipa::path(
    put,
    path = "/api/v1/settings/api-key",
    request_body = UpdateApiKeyRequest,
    responses(
        (status = 200, description = "Key saved", body = ApiResponse<ApiKeyStatus>),
        (status = 400, description = "Empty key"),
        (status = 401, description = "Admin token or current key missing")
    ),
    tag = "Settings"
)]
pub async fn update_api_key(
    State(state): State<AppState>,
    Json(payload): Json<UpdateApiKeyRequest>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return ApiError(e.to_string(), StatusCode::BAD_REQUEST).into_response();
    }

    match state.credentials.replace(payload.api_key) {
        Ok(()) => ApiSuccess(
            ApiResponse::success(status_of(&state.credentials), "API Key saved successfully"),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => ApiError(e.to_string(), StatusCode::BAD_REQUEST).into_response(),
    }
}

/// Remove the configured API key
#[utoipa::path(
    delete,
    path = "/api/v1/settings/api-key",
    responses(
        (status = 200, description = "Key removed", body = ApiResponse<ApiKeyStatus>),
        (status = 401, description = "Admin token or current key missing")
    ),
    tag = "Settings"
)]
pub async fn clear_api_key(State(state): State<AppState>) -> impl IntoResponse {
    state.credentials.clear();
    ApiSuccess(
        ApiResponse::success(status_of(&state.credentials), "API Key removed"),
        StatusCode::OK,
    )
}
