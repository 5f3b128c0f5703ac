//! Command endpoints
//!
//! A command for a session begins a new cycle on that session's tracker, so a
//! second command arriving while the first is still looking up places wins
//! and the first request answers `409 superseded`.

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;

use super::{ApiError, ApiState};
use crate::agent::{AgentOutcome, AgentReply};
use crate::intent::IntentResult;

/// Build command router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/command", post(command))
        .route("/intent", post(intent))
        .with_state(state)
}

/// Typed or recognized command
#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub session_id: Option<String>,
    pub transcript: String,
    pub location: Option<String>,
}

async fn command(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<CommandRequest>,
) -> Result<Json<AgentReply>, ApiError> {
    run_command(
        &state,
        request.session_id,
        &request.transcript,
        request.location.as_deref(),
    )
    .await
    .map(Json)
}

/// Run one command for a session, superseding any command still in flight
pub(super) async fn run_command(
    state: &ApiState,
    session_id: Option<String>,
    transcript: &str,
    location: Option<&str>,
) -> Result<AgentReply, ApiError> {
    let transcript = transcript.trim();
    if transcript.is_empty() {
        return Err(ApiError::BadRequest("transcript is empty"));
    }

    let session_id = session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let location = location.map(str::trim).filter(|l| !l.is_empty());

    let tracker = state.cycles.tracker(&session_id);
    let cycle = tracker.begin();

    let outcome = state
        .agent
        .handle(&session_id, transcript, location, cycle.token())
        .await;
    let current = tracker.finish(cycle.id());
    drop(tracker);
    state.cycles.release(&session_id);

    match outcome? {
        AgentOutcome::Reply(reply) if current => Ok(reply),
        AgentOutcome::Reply(_) | AgentOutcome::Superseded => {
            tracing::info!(session_id, cycle = cycle.id(), "command superseded");
            Err(ApiError::Superseded)
        }
    }
}

/// Classification-only request
#[derive(Debug, Deserialize)]
pub struct IntentRequest {
    pub transcript: String,
}

async fn intent(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<IntentRequest>,
) -> Result<Json<IntentResult>, ApiError> {
    let transcript = request.transcript.trim();
    if transcript.is_empty() {
        return Err(ApiError::BadRequest("transcript is empty"));
    }
    Ok(Json(state.agent.classify(transcript)))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::VoiceConfig;
    use crate::conversation::ConversationLog;
    use crate::cycle::CycleRegistry;
    use crate::places::MockPlaceLookup;

    fn state(delay: Duration) -> Arc<ApiState> {
        Arc::new(ApiState {
            agent: Arc::new(crate::agent::MapsAgent::new(
                Arc::new(MockPlaceLookup::new(delay)),
                Arc::new(ConversationLog::new()),
                "San Francisco, CA",
            )),
            cycles: CycleRegistry::new(),
            voice: VoiceConfig::default(),
        })
    }

    #[tokio::test]
    async fn test_sessionless_commands_leave_no_trackers() {
        let state = state(Duration::ZERO);

        for _ in 0..100 {
            let reply = run_command(&state, None, "coffee", None).await.unwrap();
            assert_eq!(reply.intent, crate::Intent::FindCoffee);
        }

        assert!(state.cycles.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_command_releases_tracker() {
        let state = state(Duration::from_millis(1500));

        let first_state = Arc::clone(&state);
        let first = tokio::spawn(async move {
            run_command(&first_state, Some("s1".to_string()), "coffee", None).await
        });
        tokio::time::sleep(Duration::from_millis(10)).await;

        let second = run_command(&state, Some("s1".to_string()), "I need gas", None).await;
        assert!(second.is_ok());
        assert!(matches!(first.await.unwrap(), Err(ApiError::Superseded)));
        assert!(state.cycles.is_empty());
    }
}
