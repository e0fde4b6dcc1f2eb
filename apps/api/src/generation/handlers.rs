//! Axum route handlers for the generation endpoints.
//!
//! Four sources × two artifacts, all funnelled into `GenerationPipeline::run`.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::ApiJson;
use crate::generation::flashcards::Flashcard;
use crate::generation::pipeline::GenerationOutcome;
use crate::generation::{Artifact, ArtifactGenerator};
use crate::sources::Source;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct DeckPayload {
    pub title: String,
    pub cards: Vec<Flashcard>,
}

#[derive(Debug, Serialize)]
pub struct NotePayload {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum GenerationResponse {
    #[serde(rename_all = "camelCase")]
    Deck {
        message: String,
        deck_id: Uuid,
        flashcards: DeckPayload,
    },
    #[serde(rename_all = "camelCase")]
    Note {
        message: String,
        note_id: Uuid,
        notes: NotePayload,
    },
}

impl From<GenerationOutcome> for GenerationResponse {
    fn from(outcome: GenerationOutcome) -> Self {
        match outcome.artifact {
            Artifact::Deck { title, cards } => GenerationResponse::Deck {
                message: format!("Generated {} flashcards", cards.len()),
                deck_id: outcome.id,
                flashcards: DeckPayload { title, cards },
            },
            Artifact::Note { title, content, .. } => GenerationResponse::Note {
                message: "Notes generated successfully".to_string(),
                note_id: outcome.id,
                notes: NotePayload { title, content },
            },
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/flashcards/pdf (multipart `file`)
pub async fn handle_flashcards_pdf(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<GenerationResponse>, AppError> {
    let source = read_pdf_upload(multipart?).await?;
    generate(&state, user_id, source, state.flashcards.as_ref()).await
}

/// POST /api/v1/flashcards/youtube
pub async fn handle_flashcards_youtube(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(request): ApiJson<UrlRequest>,
) -> Result<Json<GenerationResponse>, AppError> {
    let source = Source::YouTube {
        url: require_url(request)?,
    };
    generate(&state, user_id, source, state.flashcards.as_ref()).await
}

/// POST /api/v1/flashcards/web
pub async fn handle_flashcards_web(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(request): ApiJson<UrlRequest>,
) -> Result<Json<GenerationResponse>, AppError> {
    let source = Source::Web {
        url: require_url(request)?,
    };
    generate(&state, user_id, source, state.flashcards.as_ref()).await
}

/// POST /api/v1/flashcards/text
pub async fn handle_flashcards_text(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(request): ApiJson<TextRequest>,
) -> Result<Json<GenerationResponse>, AppError> {
    let source = Source::Text {
        content: request.content,
    };
    generate(&state, user_id, source, state.flashcards.as_ref()).await
}

/// POST /api/v1/notes/pdf (multipart `file`)
pub async fn handle_notes_pdf(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<GenerationResponse>, AppError> {
    let source = read_pdf_upload(multipart?).await?;
    generate(&state, user_id, source, state.notes.as_ref()).await
}

/// POST /api/v1/notes/youtube
pub async fn handle_notes_youtube(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(request): ApiJson<UrlRequest>,
) -> Result<Json<GenerationResponse>, AppError> {
    let source = Source::YouTube {
        url: require_url(request)?,
    };
    generate(&state, user_id, source, state.notes.as_ref()).await
}

/// POST /api/v1/notes/web
pub async fn handle_notes_web(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(request): ApiJson<UrlRequest>,
) -> Result<Json<GenerationResponse>, AppError> {
    let source = Source::Web {
        url: require_url(request)?,
    };
    generate(&state, user_id, source, state.notes.as_ref()).await
}

/// POST /api/v1/notes/text
pub async fn handle_notes_text(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(request): ApiJson<TextRequest>,
) -> Result<Json<GenerationResponse>, AppError> {
    let source = Source::Text {
        content: request.content,
    };
    generate(&state, user_id, source, state.notes.as_ref()).await
}

async fn generate(
    state: &AppState,
    user_id: Uuid,
    source: Source,
    generator: &dyn ArtifactGenerator,
) -> Result<Json<GenerationResponse>, AppError> {
    let outcome = state.pipeline.run(user_id, source, generator).await?;
    Ok(Json(outcome.into()))
}

fn require_url(request: UrlRequest) -> Result<String, AppError> {
    let url = request.url.trim();
    if url.is_empty() {
        return Err(AppError::Validation("url cannot be empty".to_string()));
    }
    Ok(url.to_string())
}

async fn read_pdf_upload(mut multipart: Multipart) -> Result<Source, AppError> {
    let invalid = |e: axum::extract::multipart::MultipartError| {
        AppError::Validation(format!("Invalid multipart body: {e}"))
    };

    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        if field.name() != Some("file") {
            continue;
        }
        let bytes = field.bytes().await.map_err(invalid)?;
        if bytes.is_empty() {
            return Err(AppError::Validation("The uploaded file is empty".to_string()));
        }
        return Ok(Source::Pdf(bytes));
    }

    Err(AppError::Validation(
        "Missing 'file' field in multipart body".to_string(),
    ))
}
