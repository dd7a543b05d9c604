//! WebSocket session that watches one job at a time.
//!
//! Client frames: `{"action":"watch","job_id":"..."}` or `{"action":"stop"}`.
//! Server frames: serialized [`PollEvent`]s, or `{"event":"error",...}`.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::model::JobHandle;
use super::poller::{JobWatch, PollEvent};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum WatchCommand {
    Watch { job_id: String },
    Stop,
}

/// Stream job progress over a WebSocket
#[utoipa::path(
    get,
    path = "/api/v1/jobs/watch",
    responses(
        (status = 101, description = "Switching to WebSocket")
    ),
    tag = "Jobs"
)]
pub async fn watch_jobs(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| watch_session(socket, state))
}

#[instrument(skip_all, fields(session_id = %Uuid::new_v4()))]
async fn watch_session(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (events_tx, mut events_rx) = mpsc::unbounded_channel::<PollEvent>();
    let mut watch = JobWatch::new(state.poller.clone());

    info!("Watch session opened");

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                let text = match incoming {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        warn!("WebSocket receive error: {}", e);
                        break;
                    }
                };

                let reply = match serde_json::from_str::<WatchCommand>(text.as_str()) {
                    Ok(WatchCommand::Watch { job_id }) => {
                        let job = JobHandle::new(job_id.trim());
                        match job.validate() {
                            Ok(()) => {
                                watch.start(job, events_tx.clone());
                                None
                            }
                            Err(e) => Some(e.to_string()),
                        }
                    }
                    Ok(WatchCommand::Stop) => {
                        watch.stop();
                        None
                    }
                    Err(e) => Some(format!("Invalid command: {}", e)),
                };

                if let Some(message) = reply {
                    let frame = json!({ "event": "error", "message": message });
                    if send_json(&mut sender, &frame).await.is_err() {
                        break;
                    }
                }
            }
            Some(event) = events_rx.recv() => {
                // Events queued by a job we have since switched away from.
                if !watch.is_watching(event.job_id()) {
                    continue;
                }
                if send_json(&mut sender, &event).await.is_err() {
                    break;
                }
            }
        }
    }

    watch.stop();
    info!("Watch session closed");
}

async fn send_json<T: Serialize>(
    sender: &mut SplitSink<WebSocket, Message>,
    value: &T,
) -> Result<(), axum::Error> {
    let text = serde_json::to_string(value).map_err(axum::Error::new)?;
    sender.send(Message::Text(text.into())).await
}
