//! Clear Route
//!
//! - POST /api/clear - Delete the whole history

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::ClearResponse;
use crate::api::error::ApiResult;
use crate::api::state::AppState;

/// POST /api/clear
///
/// The latest-reading register is left untouched.
pub async fn clear_history(State(state): State<Arc<AppState>>) -> ApiResult<Json<ClearResponse>> {
    state.storage.clear().await?;
    tracing::info!(backend = %state.storage.backend(), "History cleared");

    Ok(Json(ClearResponse {
        success: true,
        message: "All data cleared successfully".to_string(),
    }))
}
