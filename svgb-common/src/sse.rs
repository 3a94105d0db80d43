//! Server-Sent Events (SSE) utilities

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::events::SessionEvent;

/// Turn an event bus subscription into an SSE response
///
/// Sends a `ConnectionStatus` event first, then one SSE event per session
/// event with the JSON payload as data. Lagged receivers skip the missed
/// events. The stream ends after `SessionCompleted` or when the bus is
/// dropped.
pub fn session_event_stream(
    mut rx: broadcast::Receiver<SessionEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to session events");

    let stream = async_stream::stream! {
        yield Ok(Event::default()
            .event("ConnectionStatus")
            .data("connected"));

        loop {
            match rx.recv().await {
                Ok(event) => {
                    match serde_json::to_string(&event) {
                        Ok(json) => {
                            debug!("SSE: sending {}", event.event_type());
                            yield Ok(Event::default().event(event.event_type()).data(json));
                        }
                        Err(e) => warn!("Failed to serialize event: {}", e),
                    }
                    // Graceful shutdown waits for this stream to end
                    if matches!(event, SessionEvent::SessionCompleted { .. }) {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("SSE client lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => {
                    debug!("SSE: event bus closed");
                    break;
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    )
}
