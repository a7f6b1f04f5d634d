//! Filter Route
//!
//! - GET /api/filter?start=..&end=.. - Readings inside an inclusive range

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::RangeParams;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::query::RangeResult;

/// GET /api/filter
///
/// Both bounds are required. Responds with `{total, data}`.
pub async fn filter_range(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RangeParams>,
) -> ApiResult<Json<RangeResult>> {
    let result = state
        .executor
        .execute(params.start.as_deref(), params.end.as_deref())
        .await?;
    Ok(Json(result))
}
