use axum::Router;
use axum::middleware;
use axum::routing::get;

use crate::state::AppState;

pub mod dto;
pub mod handler;

pub fn router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new().route("/api-key", get(handler::get_api_key_status));

    let protected_routes = Router::new()
        .route(
            "/api-key",
            axum::routing::put(handler::update_api_key).delete(handler::clear_api_key),
        )
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::middleware::settings_guard::settings_guard,
        ));

    public_routes.merge(protected_routes)
}
