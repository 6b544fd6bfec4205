//! Common test utilities and fixtures for integration tests.
//!
//! Every context gets its own in-memory SQLite database, so tests run in
//! parallel without external services.

pub mod fixtures;

use axum::Router;
use chrono::NaiveDate;

use wordeasy_backend::config::Config;
use wordeasy_backend::db::SqliteRepository;
use wordeasy_backend::{app, AppState};
use wordeasy_core::{ingest, Word, WordEntry};

/// Test context holding the application state and router.
pub struct TestContext {
    pub state: AppState,
    app: Router,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let repository =
            SqliteRepository::open_in_memory().expect("Failed to open in-memory database");
        let state = AppState::new(repository, config);
        let app = app(state.clone());
        Self { state, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Study day the handlers will use.
    pub fn today(&self) -> NaiveDate {
        self.state.today()
    }

    /// Insert words directly, bypassing HTTP.
    pub fn seed(&self, deck_id: i64, entries: &[WordEntry]) -> Vec<Word> {
        ingest(self.state.repository.as_ref(), deck_id, entries)
            .expect("Failed to seed words")
            .inserted
    }
}
