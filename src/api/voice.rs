//! Voice API endpoints
//!
//! Recognition and synthesis run in the browser. The server reports what the
//! client should do and classifies the recognizer's result or error events.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use super::command::run_command;
use super::{ApiError, ApiState};
use crate::agent::AgentReply;
use crate::voice::{CaptureError, VoiceParams};

/// Build voice router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/voice/capabilities", get(capabilities))
        .route("/recognition", post(recognition))
        .with_state(state)
}

/// Voice capabilities response
#[derive(Debug, Serialize)]
pub struct VoiceCapabilities {
    pub recognition: bool,
    pub synthesis: bool,
    pub lang: String,
    pub params: VoiceParams,
}

async fn capabilities(State(state): State<Arc<ApiState>>) -> Json<VoiceCapabilities> {
    Json(VoiceCapabilities {
        recognition: true,
        synthesis: state.voice.enabled,
        lang: state.voice.lang.clone(),
        params: state.voice.params,
    })
}

/// Event reported by a client-side recognizer
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientRecognitionEvent {
    Result { transcript: String },
    Error { error: String },
}

#[derive(Debug, Deserialize)]
pub struct RecognitionRequest {
    pub session_id: Option<String>,
    pub location: Option<String>,
    pub event: ClientRecognitionEvent,
}

async fn recognition(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<RecognitionRequest>,
) -> Result<Json<AgentReply>, ApiError> {
    let transcript = match request.event {
        ClientRecognitionEvent::Error { error } => {
            let e = CaptureError::from_platform_code(&error);
            tracing::info!(platform_code = %error, code = e.code(), "client recognition failed");
            return Err(ApiError::Recognition(e));
        }
        ClientRecognitionEvent::Result { transcript } if transcript.trim().is_empty() => {
            return Err(ApiError::Recognition(CaptureError::NoSpeechDetected));
        }
        ClientRecognitionEvent::Result { transcript } => transcript,
    };

    run_command(
        &state,
        request.session_id,
        &transcript,
        request.location.as_deref(),
    )
    .await
    .map(Json)
}
