use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;

pub mod client;
pub mod dto;
pub mod error;
pub mod handler;
pub mod model;
pub mod payload;
pub mod poller;
pub mod service;
pub mod ws_handler;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/caption", post(handler::submit_caption))
        .route("/concatenate", post(handler::submit_concatenate))
        .route("/image-to-video", post(handler::submit_image_to_video))
        .route("/watch", get(ws_handler::watch_jobs))
        .route("/{job_id}/progress", get(handler::get_progress))
}
