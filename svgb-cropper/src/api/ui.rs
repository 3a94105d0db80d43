//! UI serving routes
//!
//! Serves the static HTML/JS/CSS cropping UI

use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};

use crate::AppState;

const INDEX_HTML: &str = include_str!("../../ui/index.html");
const APP_JS: &str = include_str!("../../ui/app.js");
const APP_CSS: &str = include_str!("../../ui/app.css");

/// GET /
pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /static/app.js
pub async fn serve_app_js() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/javascript")],
        APP_JS,
    )
        .into_response()
}

/// GET /static/app.css
pub async fn serve_app_css() -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/css")], APP_CSS).into_response()
}

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(serve_index))
        .route("/static/app.js", get(serve_app_js))
        .route("/static/app.css", get(serve_app_css))
}
