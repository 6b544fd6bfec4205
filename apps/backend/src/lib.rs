pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wordeasy_core::{PerfStats, Scheduler, StatsAggregator, TtlCache};

use crate::config::Config;
use crate::db::SqliteRepository;

/// Cache keys for the statistics views.
pub mod cache_keys {
    use chrono::NaiveDate;

    pub const CATALOG_STATS: &str = "catalog_stats";

    /// Progress statistics depend on the study day.
    pub fn progress_stats(today: NaiveDate) -> String {
        format!("progress_stats:{today}")
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<SqliteRepository>,
    pub scheduler: Arc<Scheduler<SqliteRepository>>,
    pub stats: Arc<StatsAggregator<SqliteRepository>>,
    pub cache: Arc<TtlCache<String, serde_json::Value>>,
    pub perf: Arc<PerfStats>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(repository: SqliteRepository, config: Config) -> Self {
        let repository = Arc::new(repository);
        let scheduler =
            Scheduler::new(repository.clone()).with_max_retries(config.max_write_retries);

        Self {
            scheduler: Arc::new(scheduler),
            stats: Arc::new(StatsAggregator::new(repository.clone())),
            cache: Arc::new(TtlCache::new()),
            perf: Arc::new(PerfStats::new(config.slow_call_threshold)),
            config: Arc::new(config),
            repository,
        }
    }

    /// Current study day, honoring the configured reset hour.
    pub fn today(&self) -> NaiveDate {
        db::date_utils::today(self.config.daily_reset_hour)
    }

    /// Drop cached statistics after a catalog or progress mutation.
    pub fn invalidate_stats(&self) {
        self.cache.clear();
    }
}

/// Build the router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Word routes
        .route(
            "/api/words",
            get(routes::words::practice).post(routes::words::create),
        )
        .route("/api/words/batch", post(routes::words::batch))
        .route("/api/words/review", get(routes::words::review))
        .route("/api/words/errors", get(routes::words::errors))
        .route("/api/words/stats", get(routes::words::stats))
        .route("/api/words/clear", post(routes::words::clear))
        // Spelling routes
        .route("/api/spell/check", post(routes::spell::check))
        // Progress routes
        .route("/api/progress", get(routes::progress::stats))
        .route("/api/progress/clear", post(routes::progress::clear))
        .route("/api/progress/mark-studied", post(routes::progress::mark_studied))
        .route("/api/progress/batch-update", post(routes::progress::batch_update))
        .route("/api/progress/review-count", get(routes::progress::review_count))
        // Metrics
        .route("/api/performance", get(routes::metrics::performance))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!("Opening database at {}", config.database_path.display());
    let repository = SqliteRepository::open(&config.database_path)?;

    let addr = config.addr();
    let state = AppState::new(repository, config);
    let app = app(state);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
