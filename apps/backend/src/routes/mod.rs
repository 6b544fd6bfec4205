//! HTTP handlers.
//!
//! The core and the SQLite store are synchronous, so every handler runs its
//! store work through [`run_blocking`] to keep it off the async workers.

pub mod metrics;
pub mod progress;
pub mod spell;
pub mod words;

use crate::error::{ApiError, Result};
use crate::models::MAX_LIMIT;
use crate::AppState;

/// Cap a client-supplied page size. Zero stays zero.
pub(crate) fn clamp_limit(limit: usize) -> usize {
    limit.min(MAX_LIMIT)
}

/// Run `op` on the blocking thread pool with its own handle to the state.
pub(crate) async fn run_blocking<T, F>(state: &AppState, op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(AppState) -> Result<T> + Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || op(state))
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
}
