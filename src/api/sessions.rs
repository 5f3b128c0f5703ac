//! Conversation history endpoints

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Serialize;

use super::ApiState;

/// Build sessions router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/sessions/{id}/history", get(history))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub messages: Vec<String>,
}

/// Unknown sessions have an empty history
async fn history(
    State(state): State<Arc<ApiState>>,
    Path(session_id): Path<String>,
) -> Json<HistoryResponse> {
    let messages = state.agent.history(&session_id);
    Json(HistoryResponse {
        session_id,
        messages,
    })
}
