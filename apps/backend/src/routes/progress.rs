//! Progress endpoints

use axum::{extract::State, Json};

use crate::cache_keys;
use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::run_blocking;
use crate::AppState;

/// GET /api/progress
pub async fn stats(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let today = state.today();
    let value = run_blocking(&state, move |state| {
        let ttl = Some(state.config.stats_cache_ttl);
        state
            .perf
            .track("progress_stats", || {
                state
                    .cache
                    .get_or_try_insert_with(cache_keys::progress_stats(today), ttl, || {
                        serde_json::to_value(state.stats.progress_stats(today))
                    })
            })
            .map_err(|e| ApiError::Internal(e.to_string()))
    })
    .await?;
    Ok(Json(value))
}

/// POST /api/progress/clear
pub async fn clear(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    let removed = run_blocking(&state, |state| {
        let removed = state
            .perf
            .track("clear_progress", || state.scheduler.clear_progress())?;
        state.invalidate_stats();
        Ok(removed)
    })
    .await?;
    Ok(Json(ClearResponse { removed }))
}

/// POST /api/progress/mark-studied
pub async fn mark_studied(
    State(state): State<AppState>,
    Json(payload): Json<MarkStudiedRequest>,
) -> Result<Json<ProgressResponse>> {
    let today = state.today();
    let progress = run_blocking(&state, move |state| {
        let progress = state.perf.track("mark_studied", || {
            state.scheduler.mark_studied(payload.word_id, today)
        })?;
        state.invalidate_stats();
        Ok(progress)
    })
    .await?;
    Ok(Json(progress.into()))
}

/// POST /api/progress/batch-update
pub async fn batch_update(
    State(state): State<AppState>,
    Json(payload): Json<BatchUpdateRequest>,
) -> Result<Json<BatchUpdateResponse>> {
    let today = state.today();
    let requested = payload.word_ids.len();
    let updated = run_blocking(&state, move |state| {
        let updated = state.perf.track("mark_studied_batch", || {
            state.scheduler.mark_studied_batch(&payload.word_ids, today)
        })?;
        state.invalidate_stats();
        Ok(updated)
    })
    .await?;
    Ok(Json(BatchUpdateResponse { requested, updated }))
}

/// GET /api/progress/review-count
pub async fn review_count(State(state): State<AppState>) -> Result<Json<ReviewCountResponse>> {
    let today = state.today();
    let count = run_blocking(&state, move |state| {
        Ok(state
            .perf
            .track("count_due", || state.scheduler.count_due(today))?)
    })
    .await?;
    Ok(Json(ReviewCountResponse { count }))
}
