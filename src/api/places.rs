//! Direct place search

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiState};
use crate::places::PlaceRecord;

/// Build places router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/places", get(search))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct PlacesQuery {
    #[serde(default)]
    pub query: String,
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlacesResponse {
    pub query: String,
    pub location: String,
    pub places: Vec<PlaceRecord>,
}

async fn search(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<PlacesQuery>,
) -> Result<Json<PlacesResponse>, ApiError> {
    let query = params.query.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("query is empty"));
    }

    let location = params
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| state.agent.default_location())
        .to_string();

    let places = state.agent.lookup(query, &location).await?;

    Ok(Json(PlacesResponse {
        query: query.to_string(),
        location,
        places,
    }))
}
