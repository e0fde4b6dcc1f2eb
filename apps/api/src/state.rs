use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::generation::flashcards::FlashcardGenerator;
use crate::generation::notes::NoteGenerator;
use crate::generation::pipeline::GenerationPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Quota gate, extractor, model and store behind trait objects. See generation::pipeline.
    pub pipeline: Arc<GenerationPipeline>,
    pub flashcards: Arc<FlashcardGenerator>,
    /// Chunked or whole-source note generation, chosen by `CHUNK_NOTES`.
    pub notes: Arc<NoteGenerator>,
}
