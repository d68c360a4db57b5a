//! Server-Sent Events (SSE) stream of one session's watch events

use crate::api::handlers::ApiError;
use crate::api::server::AppContext;
use crate::error::Error;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use toy_common::api::ErrorResponse;
use tracing::{debug, warn};
use uuid::Uuid;

/// GET /sessions/{id}/events - SSE event stream
pub async fn event_stream(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    if ctx.state.get_session(id).await.is_none() {
        let err = Error::SessionNotFound(id);
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("session_not_found", err.to_string())),
        ));
    }

    debug!(session_id = %id, "New SSE client connected");

    // Subscribe before returning so no event after this point is missed
    let rx = ctx.state.subscribe_events();

    let stream = BroadcastStream::new(rx).filter_map(move |result| async move {
        match result {
            Ok(event) if event.session_id() == id => match serde_json::to_string(&event) {
                Ok(json) => Some(Ok(Event::default().event(event.event_type()).data(json))),
                Err(e) => {
                    warn!("Failed to serialize event: {}", e);
                    None
                }
            },
            Ok(_) => None,
            Err(e) => {
                // Lagged receiver: events were dropped, keep streaming
                warn!("SSE stream error: {:?}", e);
                None
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}
