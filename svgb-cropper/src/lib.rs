//! svgb-cropper library
//!
//! Browser-assisted batch cropping of SVG icons. The core (scanner, asset
//! store, name normalizer, session state machine) is transport-agnostic; the
//! `api` module exposes it over HTTP for the bundled web UI.

pub mod api;
pub mod config;
pub mod error;
pub mod naming;
pub mod scanner;
pub mod session;
pub mod status;
pub mod store;

pub use crate::error::{ApiError, ApiResult, Error, Result};

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use svgb_common::events::EventBus;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use crate::session::CropSession;

/// Largest accepted request body (processed SVG content is base64 encoded)
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// The single session; every step runs while holding this lock
    pub session: Arc<Mutex<CropSession>>,
    /// Event bus for SSE broadcasting and completion
    pub event_bus: EventBus,
}

impl AppState {
    pub fn new(session: CropSession, event_bus: EventBus) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            event_bus,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        // UI routes (HTML page and static assets)
        .merge(api::ui_routes())
        // Session routes
        .merge(api::crop_routes())
        .route("/events", get(api::event_stream))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
