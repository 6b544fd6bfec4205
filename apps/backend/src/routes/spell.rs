//! Spelling endpoints

use axum::{extract::State, Json};

use crate::error::Result;
use crate::models::*;
use crate::routes::run_blocking;
use crate::AppState;

/// POST /api/spell/check
pub async fn check(
    State(state): State<AppState>,
    Json(payload): Json<SpellCheckRequest>,
) -> Result<Json<SpellCheckResponse>> {
    let today = state.today();
    let result = run_blocking(&state, move |state| {
        let result = state.perf.track("submit_spelling", || {
            state
                .scheduler
                .submit_spelling(payload.word_id, &payload.input, today)
        })?;
        state.invalidate_stats();
        Ok(result)
    })
    .await?;

    Ok(Json(SpellCheckResponse {
        is_correct: result.matched.is_correct,
        correct_spelling: result.word.text,
        translation: result.word.translation,
        similarity: result.matched.similarity,
        diff: result.matched.diff,
        mastery_level: result.progress.mastery_level.to_value(),
        next_review: result.progress.next_review,
        error_count: result.progress.error_count,
        review_count: result.progress.review_count,
    }))
}
