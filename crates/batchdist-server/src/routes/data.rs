//! Batch serving endpoints

use crate::{state::AppState, Result};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

/// Query parameters shared by the batch endpoints
#[derive(Debug, Deserialize)]
pub struct GroupQuery {
    /// Consumer group number, 1 through 10
    pub group_number: i64,
}

/// Create data routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/data", get(read_data))
        .route("/restart_data_generation", get(restart_data))
}

/// Serve a random batch from the group's current block
///
/// GET /data?group_number=3
async fn read_data(
    State(state): State<AppState>,
    Query(query): Query<GroupQuery>,
) -> Result<impl IntoResponse> {
    let batch = state.distributor.get_batch(query.group_number)?;
    Ok(Json(batch))
}

/// Rewind a group's progress to the never-served state
///
/// GET /restart_data_generation?group_number=3
async fn restart_data(
    State(state): State<AppState>,
    Query(query): Query<GroupQuery>,
) -> Result<impl IntoResponse> {
    state.distributor.reset_group(query.group_number)?;
    Ok(Json(json!({ "ok": true })))
}
