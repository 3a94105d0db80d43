//! GET /events - session event stream

use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;

use crate::AppState;

/// GET /events
///
/// Streams session events to the UI until the session completes.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    svgb_common::sse::session_event_stream(state.event_bus.subscribe())
}
