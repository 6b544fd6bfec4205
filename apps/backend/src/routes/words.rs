//! Word endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use wordeasy_core::{ingest, Word};

use crate::cache_keys;
use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::{clamp_limit, run_blocking};
use crate::AppState;

/// GET /api/words
pub async fn practice(
    State(state): State<AppState>,
    Query(query): Query<PracticeQuery>,
) -> Result<Json<WordListResponse>> {
    let difficulty = Difficulty::from_value(query.difficulty).ok_or_else(|| {
        ApiError::BadRequest(format!("difficulty must be 1, 2 or 3, got {}", query.difficulty))
    })?;
    let today = state.today();
    let limit = clamp_limit(query.limit);

    let rows = run_blocking(&state, move |state| {
        let rows = state.perf.track("practice_words", || {
            state.scheduler.practice_words(difficulty, limit, today)
        })?;
        // First access creates progress rows.
        state.invalidate_stats();
        Ok(rows)
    })
    .await?;

    Ok(Json(WordListResponse::new(rows)))
}

/// POST /api/words
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateWordRequest>,
) -> Result<(StatusCode, Json<Word>)> {
    let word = run_blocking(&state, move |state| {
        let report = state.perf.track("create_word", || {
            ingest(state.repository.as_ref(), payload.deck_id, std::slice::from_ref(&payload.entry))
        })?;

        if report.invalid > 0 {
            return Err(ApiError::Validation(
                "word and translation are required (max 50 and 200 characters)".to_string(),
            ));
        }
        let word = report.inserted.into_iter().next().ok_or_else(|| {
            ApiError::Conflict(format!(
                "word {:?} already exists in deck {}",
                payload.entry.text.trim().to_lowercase(),
                payload.deck_id
            ))
        })?;
        state.invalidate_stats();
        Ok(word)
    })
    .await?;

    tracing::info!(word_id = word.id, difficulty = word.difficulty.to_value(), "Created word");
    Ok((StatusCode::CREATED, Json(word)))
}

/// POST /api/words/batch
pub async fn batch(
    State(state): State<AppState>,
    Json(payload): Json<BatchIngestRequest>,
) -> Result<Json<IngestResponse>> {
    if payload.words.is_empty() {
        return Err(ApiError::BadRequest("no words supplied".to_string()));
    }

    let report = run_blocking(&state, move |state| {
        let report = state.perf.track("ingest_words", || {
            ingest(state.repository.as_ref(), payload.deck_id, &payload.words)
        })?;
        state.invalidate_stats();
        Ok(report)
    })
    .await?;

    Ok(Json(report.into()))
}

/// GET /api/words/review
pub async fn review(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<WordListResponse>> {
    let today = state.today();
    let limit = clamp_limit(query.limit);
    let rows = run_blocking(&state, move |state| {
        Ok(state
            .perf
            .track("due_words", || state.scheduler.due_words(today, limit))?)
    })
    .await?;
    Ok(Json(WordListResponse::new(rows)))
}

/// GET /api/words/errors
pub async fn errors(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<WordListResponse>> {
    let limit = clamp_limit(query.limit);
    let rows = run_blocking(&state, move |state| {
        Ok(state
            .perf
            .track("error_words", || state.scheduler.error_words(limit))?)
    })
    .await?;
    Ok(Json(WordListResponse::new(rows)))
}

/// GET /api/words/stats
pub async fn stats(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let value = run_blocking(&state, |state| {
        let ttl = Some(state.config.stats_cache_ttl);
        state
            .perf
            .track("catalog_stats", || {
                state
                    .cache
                    .get_or_try_insert_with(cache_keys::CATALOG_STATS.to_string(), ttl, || {
                        serde_json::to_value(state.stats.catalog_stats())
                    })
            })
            .map_err(|e| ApiError::Internal(e.to_string()))
    })
    .await?;
    Ok(Json(value))
}

/// POST /api/words/clear
pub async fn clear(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    let removed = run_blocking(&state, |state| {
        let removed = state
            .perf
            .track("clear_words", || state.repository.clear_words())?;
        state.invalidate_stats();
        Ok(removed)
    })
    .await?;

    tracing::info!(removed, "Cleared word catalog");
    Ok(Json(ClearResponse { removed }))
}
