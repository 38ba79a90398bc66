//! Automation endpoints — POST /api/automation/{start,stop},
//! GET /api/automation/status.
//!
//! All structural validation happens here, before the dispatch core is
//! touched: the core's contract is that it never re-validates.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use volley_dispatch::{JobParams, LogEntry};

use crate::app::AppState;

/// Interval bounds enforced at the HTTP boundary. The core only requires
/// the interval to be >= 1; the upper bound keeps the dashboard honest.
const MIN_DELAY_SECS: u64 = 1;
const MAX_DELAY_SECS: u64 = 3600;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub token: String,
    pub message: String,
    pub channel_ids: Vec<String>,
    pub delay_seconds: u64,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub is_running: bool,
    pub logs: Vec<LogEntry>,
}

type ApiError = (StatusCode, Json<Value>);

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "message": message })),
    )
}

/// POST /api/automation/start — validate, then hand off to the controller.
/// Replaces any job already running.
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartRequest>,
) -> Result<Json<Value>, ApiError> {
    validate(&req)?;

    state.dispatch.start(JobParams {
        token: req.token,
        message: req.message,
        channel_ids: req.channel_ids,
        delay_secs: req.delay_seconds,
        image_refs: req.image_urls,
    });

    Ok(Json(json!({ "message": "Started" })))
}

/// POST /api/automation/stop.
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    state.dispatch.stop();
    Json(json!({ "message": "Stopped" }))
}

/// GET /api/automation/status — pure read, never blocks on a cycle.
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let status = state.dispatch.status();
    Json(StatusResponse {
        is_running: status.running,
        logs: status.logs,
    })
}

fn validate(req: &StartRequest) -> Result<(), ApiError> {
    if req.token.trim().is_empty() {
        return Err(bad_request("Token is required"));
    }
    if req.message.trim().is_empty() {
        return Err(bad_request("Message is required"));
    }
    if req.channel_ids.iter().all(|c| c.trim().is_empty()) {
        return Err(bad_request("At least one channel ID is required"));
    }
    if req.delay_seconds < MIN_DELAY_SECS {
        return Err(bad_request("Delay must be at least 1 second"));
    }
    if req.delay_seconds > MAX_DELAY_SECS {
        return Err(bad_request("Delay must be at most 3600 seconds"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> StartRequest {
        StartRequest {
            token: "tok".into(),
            message: "hi".into(),
            channel_ids: vec!["111".into()],
            delay_seconds: 60,
            image_urls: vec![],
        }
    }

    #[test]
    fn accepts_a_well_formed_request() {
        assert!(validate(&request()).is_ok());
    }

    #[test]
    fn rejects_blank_fields() {
        let mut req = request();
        req.token = "  ".into();
        assert!(validate(&req).is_err());

        let mut req = request();
        req.message = String::new();
        assert!(validate(&req).is_err());

        let mut req = request();
        req.channel_ids = vec![String::new()];
        assert!(validate(&req).is_err());
    }

    #[test]
    fn rejects_out_of_range_delays() {
        let mut req = request();
        req.delay_seconds = 0;
        assert!(validate(&req).is_err());

        req.delay_seconds = 3601;
        assert!(validate(&req).is_err());

        req.delay_seconds = 3600;
        assert!(validate(&req).is_ok());
    }

    #[test]
    fn image_urls_default_to_empty() {
        let req: StartRequest = serde_json::from_value(json!({
            "token": "t",
            "message": "m",
            "channelIds": ["111"],
            "delaySeconds": 5
        }))
        .unwrap();
        assert!(req.image_urls.is_empty());
    }
}
