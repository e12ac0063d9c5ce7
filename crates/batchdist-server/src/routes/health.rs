//! Health check and service description endpoints

use crate::Result;
use axum::{response::IntoResponse, Json};
use serde::Serialize;
use serde_json::json;

/// Health status response
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// Server status
    pub status: String,
}

/// Health check endpoint. Container orchestration gates deploys on a 200
/// from this route; it always succeeds once the process is up.
///
/// GET /health
pub async fn health_check() -> Result<impl IntoResponse> {
    Ok(Json(HealthStatus {
        status: "OK".to_string(),
    }))
}

/// Service description
///
/// GET /
pub async fn service_info() -> Result<impl IntoResponse> {
    Ok(Json(json!({
        "project": "Batch distribution of training data to consumer groups"
    })))
}
