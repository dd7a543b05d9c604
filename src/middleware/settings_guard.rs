use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::common::response::ApiError;
use crate::state::AppState;

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";
pub const API_KEY_HEADER: &str = "x-api-key";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim)
}

/// Guards writes to the stored API key.
///
/// With `SETTINGS_ADMIN_TOKEN` configured the caller must send it in
/// `x-admin-token`. Without it, replacing or clearing an existing key
/// requires that key in `x-api-key`; the first key may be set freely.
pub async fn settings_guard(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let headers = req.headers();

    match state.config.settings_admin_token.as_deref() {
        Some(token) => {
            if header(headers, ADMIN_TOKEN_HEADER) != Some(token) {
                warn!("Rejected API key change without a valid admin token");
                return Err(ApiError(
                    "Unauthorized: Missing or invalid admin token".to_string(),
                    StatusCode::UNAUTHORIZED,
                ));
            }
        }
        None => {
            if let Some(current) = state.credentials.current() {
                if header(headers, API_KEY_HEADER) != Some(current.expose()) {
                    warn!("Rejected API key change without the current key");
                    return Err(ApiError(
                        "Unauthorized: The current API key is required".to_string(),
                        StatusCode::UNAUTHORIZED,
                    ));
                }
            }
        }
    }

    Ok(next.run(req).await)
}
