mod auth;
mod config;
mod db;
mod errors;
mod extract;
mod generation;
mod llm_client;
mod models;
mod quota;
mod routes;
mod sources;
mod state;
mod study;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::generation::flashcards::FlashcardGenerator;
use crate::generation::notes::NoteGenerator;
use crate::generation::pipeline::GenerationPipeline;
use crate::generation::size_guard::SizeLimits;
use crate::generation::store::PgGenerationStore;
use crate::llm_client::LlmClient;
use crate::quota::rate_limit::RedisRateLimiter;
use crate::quota::QuotaGate;
use crate::routes::build_router;
use crate::sources::HttpSourceExtractor;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting GStudy API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize Redis rate limiter
    let redis = redis::Client::open(config.redis_url.clone())?;
    let rate_limiter = Arc::new(RedisRateLimiter::new(
        redis,
        config.rate_limit_capacity,
        config.rate_limit_window_secs,
    ));
    info!(
        "Rate limiter initialized ({} per {}s)",
        config.rate_limit_capacity, config.rate_limit_window_secs
    );

    // Initialize LLM client
    let llm = Arc::new(LlmClient::new(config.anthropic_api_key.clone())?);
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let limits = SizeLimits::default();
    let extractor = Arc::new(HttpSourceExtractor::new(limits.max_video_seconds)?);
    let store = Arc::new(PgGenerationStore::new(db.clone()));

    let pipeline = GenerationPipeline {
        llm,
        extractor,
        store: store.clone(),
        quota: QuotaGate::new(rate_limiter, store),
        limits,
    };

    if config.chunk_notes {
        info!("Chunked note generation enabled");
    }

    // Build app state
    let state = AppState {
        db,
        config: config.clone(),
        pipeline: Arc::new(pipeline),
        flashcards: Arc::new(FlashcardGenerator::default()),
        notes: Arc::new(NoteGenerator::new(config.chunk_notes)),
    };

    // Build router
    let app = build_router(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the web app's domain

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
