//! Stats Route
//!
//! - GET /api/stats - Record count and first/last timestamps

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::StatsResponse;
use crate::api::error::ApiResult;
use crate::api::state::AppState;

/// GET /api/stats
pub async fn history_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<StatsResponse>> {
    let stats = state.storage.stats().await?;
    Ok(Json(StatsResponse::from(stats)))
}
