//! Export Routes
//!
//! CSV downloads for backup and analysis.
//!
//! - GET /api/download?start=..&end=.. - Readings inside a range
//! - GET /api/download/all - Whole history

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::api::dto::RangeParams;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::export::ExportFile;

/// GET /api/download
pub async fn download_range(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RangeParams>,
) -> ApiResult<Response> {
    let file = state
        .executor
        .export_range(params.start.as_deref(), params.end.as_deref())
        .await?;
    Ok(attachment(file))
}

/// GET /api/download/all
pub async fn download_all(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let file = state.executor.export_all().await?;
    Ok(attachment(file))
}

fn attachment(file: ExportFile) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.filename),
            ),
        ],
        Body::from(file.bytes),
    )
        .into_response()
}
