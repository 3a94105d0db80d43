//! Session endpoints
//!
//! - `GET /api/session`: landing metadata
//! - `POST /crop`: one protocol step
//!
//! Step bodies are JSON `{name?, content?, start?}`. `content` is the cropped
//! SVG, base64 encoded by the browser; `start` only needs to be present.

use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};
use tracing::{debug, error};

use crate::error::{ApiError, ApiResult};
use crate::session::{SessionSummary, StepOutcome, StepRequest, Submission};
use crate::AppState;

/// Raw step payload as sent by the UI
#[derive(Debug, Default, Deserialize)]
pub struct StepPayload {
    #[serde(default)]
    pub name: Option<String>,

    /// Base64 encoded processed content
    #[serde(default)]
    pub content: Option<String>,

    /// Restart flag; any value (even `null`) counts as present
    #[serde(default, deserialize_with = "deserialize_present")]
    pub start: bool,
}

fn deserialize_present<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    IgnoredAny::deserialize(deserializer)?;
    Ok(true)
}

/// Step response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepResponse {
    /// Next asset to crop; `content` is base64 encoded
    Cropping {
        name: String,
        content: String,
        position: usize,
        total: usize,
    },
    /// Queue exhausted; the server shuts down after this response
    Done {
        output_directory: String,
        saved: usize,
    },
}

impl From<StepOutcome> for StepResponse {
    fn from(outcome: StepOutcome) -> Self {
        match outcome {
            StepOutcome::Serve(asset) => StepResponse::Cropping {
                name: asset.name,
                content: STANDARD.encode(&asset.content),
                position: asset.position,
                total: asset.total,
            },
            StepOutcome::Done(completion) => StepResponse::Done {
                output_directory: completion.output_directory.display().to_string(),
                saved: completion.saved,
            },
        }
    }
}

/// Parse a step body; an empty body is a plain "serve current" step
pub fn parse_step_request(body: &[u8]) -> ApiResult<StepRequest> {
    let payload: StepPayload = if body.iter().all(u8::is_ascii_whitespace) {
        StepPayload::default()
    } else {
        serde_json::from_slice(body)
            .map_err(|e| ApiError::BadRequest(format!("Malformed step payload: {}", e)))?
    };

    let submission = match (payload.name, payload.content) {
        (Some(name), Some(content)) if !name.is_empty() && !content.is_empty() => {
            Some(Submission {
                content: decode_content(&content)?,
                name,
            })
        }
        (name, content) => {
            if name.is_some() || content.is_some() {
                debug!("Partial submission ignored (name and content are both required)");
            }
            None
        }
    };

    Ok(StepRequest {
        start: payload.start,
        submission,
    })
}

/// Decode submitted content to the bytes that get persisted
///
/// After base64 decoding, HTML-escaped `&lt;` / `&gt;` are turned back into
/// `<` / `>`. It is unclear whether this undoes entities introduced by the
/// editor or works around a specific client; review before relying on it for
/// content that legitimately contains escaped angle brackets.
pub fn decode_content(encoded: &str) -> ApiResult<Vec<u8>> {
    let raw = STANDARD
        .decode(encoded.trim())
        .map_err(|e| ApiError::BadRequest(format!("Content is not valid base64: {}", e)))?;

    let text = String::from_utf8_lossy(&raw);
    Ok(text.replace("&lt;", "<").replace("&gt;", ">").into_bytes())
}

/// GET /api/session
pub async fn session_summary(State(state): State<AppState>) -> Json<SessionSummary> {
    let session = state.session.lock().await;
    Json(session.summary())
}

/// POST /crop
///
/// Runs one step under the session lock: optional restart, optional save,
/// then serves the next asset or reports completion.
pub async fn crop_step(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<StepResponse>> {
    let request = parse_step_request(&body)?;

    let outcome = {
        let mut session = state.session.lock().await;
        session.step(request).await.map_err(|e| {
            error!("Step failed: {}", e);
            ApiError::from(e)
        })?
    };

    Ok(Json(outcome.into()))
}

/// Build session routes
pub fn crop_routes() -> Router<AppState> {
    Router::new()
        .route("/api/session", get(session_summary))
        .route("/crop", post(crop_step))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_is_plain_step() {
        assert_eq!(parse_step_request(b"").unwrap(), StepRequest::default());
        assert_eq!(parse_step_request(b" \n").unwrap(), StepRequest::default());
        assert_eq!(parse_step_request(b"{}").unwrap(), StepRequest::default());
    }

    #[test]
    fn test_start_flag_presence() {
        assert!(parse_step_request(br#"{"start": true}"#).unwrap().start);
        assert!(parse_step_request(br#"{"start": null}"#).unwrap().start);
        assert!(parse_step_request(br#"{"start": ""}"#).unwrap().start);
    }

    #[test]
    fn test_submission_requires_name_and_content() {
        let encoded = STANDARD.encode("<svg/>");
        let only_name = r#"{"name": "a.svg"}"#.to_string();
        let only_content = format!(r#"{{"content": "{}"}}"#, encoded);
        let empty_name = format!(r#"{{"name": "", "content": "{}"}}"#, encoded);

        for body in [only_name, only_content, empty_name] {
            assert!(parse_step_request(body.as_bytes()).unwrap().submission.is_none());
        }

        let full = format!(r#"{{"name": "a.svg", "content": "{}"}}"#, encoded);
        let submission = parse_step_request(full.as_bytes()).unwrap().submission.unwrap();
        assert_eq!(submission.name, "a.svg");
        assert_eq!(submission.content, b"<svg/>");
    }

    #[test]
    fn test_decode_unescapes_angle_brackets() {
        let encoded = STANDARD.encode("&lt;svg&gt;&lt;/svg&gt; &amp;");
        assert_eq!(decode_content(&encoded).unwrap(), b"<svg></svg> &amp;");
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        assert!(matches!(
            decode_content("not base64!"),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            parse_step_request(b"{not json"),
            Err(ApiError::BadRequest(_))
        ));
    }
}
