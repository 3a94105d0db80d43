//! HTTP API handlers for svgb-cropper

pub mod buildinfo;
pub mod crop;
pub mod health;
pub mod sse;
pub mod ui;

pub use buildinfo::get_build_info;
pub use crop::crop_routes;
pub use health::health_routes;
pub use sse::event_stream;
pub use ui::ui_routes;
