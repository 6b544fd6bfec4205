//! Performance endpoints

use axum::{extract::State, Json};

use crate::models::PerformanceResponse;
use crate::AppState;

/// GET /api/performance
pub async fn performance(State(state): State<AppState>) -> Json<PerformanceResponse> {
    Json(PerformanceResponse {
        operations: state.perf.snapshot(),
    })
}
