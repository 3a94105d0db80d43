//! Event types for the cropping session
//!
//! Provides the shared event definitions and the EventBus used by the
//! session to announce progress, and by the process layer to learn that the
//! session has completed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Cropping session events
///
/// Events are broadcast via EventBus and can be serialized for SSE transmission.
/// Positions are 1-based, matching the status line shown to the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// Asset list (re)scanned and cursor reset
    SessionStarted {
        /// Number of assets in the new queue
        total: usize,
        timestamp: DateTime<Utc>,
    },

    /// Asset handed to the operator for cropping
    AssetServed {
        position: usize,
        total: usize,
        name: String,
        timestamp: DateTime<Utc>,
    },

    /// Processed asset persisted to the output directory
    AssetSaved {
        position: usize,
        total: usize,
        /// Name the client submitted
        name: String,
        /// Normalized filename written to disk
        output_name: String,
        timestamp: DateTime<Utc>,
    },

    /// Cursor reached the end of the queue
    ///
    /// Emitted exactly once per process. The process layer shuts the server
    /// down after observing it.
    SessionCompleted {
        /// Number of assets written during this process
        saved: usize,
        output_directory: String,
        timestamp: DateTime<Utc>,
    },
}

impl SessionEvent {
    /// Event name used for the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::SessionStarted { .. } => "SessionStarted",
            SessionEvent::AssetServed { .. } => "AssetServed",
            SessionEvent::AssetSaved { .. } => "AssetSaved",
            SessionEvent::SessionCompleted { .. } => "SessionCompleted",
        }
    }

    pub fn session_started(total: usize) -> Self {
        SessionEvent::SessionStarted {
            total,
            timestamp: Utc::now(),
        }
    }

    pub fn asset_served(position: usize, total: usize, name: impl Into<String>) -> Self {
        SessionEvent::AssetServed {
            position,
            total,
            name: name.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn asset_saved(
        position: usize,
        total: usize,
        name: impl Into<String>,
        output_name: impl Into<String>,
    ) -> Self {
        SessionEvent::AssetSaved {
            position,
            total,
            name: name.into(),
            output_name: output_name.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn session_completed(saved: usize, output_directory: impl Into<String>) -> Self {
        SessionEvent::SessionCompleted {
            saved,
            output_directory: output_directory.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Broadcast bus for session events
///
/// Cloning is cheap; all clones share one channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity
    ///
    /// `capacity` is the number of events buffered before slow receivers
    /// start lagging.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    pub fn emit(
        &self,
        event: SessionEvent,
    ) -> Result<usize, broadcast::error::SendError<SessionEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring the no-subscriber case
    pub fn emit_lossy(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
