//! Latest Reading Route
//!
//! - GET /data - Most recent reading, or a zeroed record before the first one

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::LatestResponse;
use crate::api::state::AppState;

/// GET /data
///
/// Served from the in-memory register; never touches the history store.
pub async fn latest_reading(State(state): State<Arc<AppState>>) -> Json<LatestResponse> {
    Json(LatestResponse::from(state.storage.latest()))
}
