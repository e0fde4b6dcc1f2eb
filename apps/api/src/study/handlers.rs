use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::{ApiJson, ApiPath};
use crate::models::deck::{DeckRow, DeckWithCards, FlashcardRow};
use crate::models::note::NoteRow;
use crate::models::user::Usage;
use crate::state::AppState;
use crate::study::library;
use crate::study::practice::order_for_practice;

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub correct: bool,
}

#[derive(Debug, Deserialize)]
pub struct NoteUpdate {
    pub content: String,
    pub title: Option<String>,
}

/// GET /api/v1/usage
pub async fn handle_usage(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Usage>, AppError> {
    let row = library::usage(&state.db, user_id).await?;
    Ok(Json(row.into()))
}

/// GET /api/v1/decks/:id
pub async fn handle_get_deck(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<DeckWithCards>, AppError> {
    let deck = library::readable_deck(&state.db, id, user_id).await?;
    let cards = library::deck_cards(&state.db, deck.id).await?;
    Ok(Json(DeckWithCards { deck, cards }))
}

/// GET /api/v1/decks/:id/practice
pub async fn handle_practice_deck(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<DeckWithCards>, AppError> {
    let deck = library::readable_deck(&state.db, id, user_id).await?;
    let mut cards = library::deck_cards(&state.db, deck.id).await?;
    order_for_practice(&mut cards);
    Ok(Json(DeckWithCards { deck, cards }))
}

/// POST /api/v1/decks/:id/publish
pub async fn handle_publish_deck(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<DeckRow>, AppError> {
    let deck = library::publish_deck(&state.db, id, user_id).await?;
    tracing::info!(deck_id = %id, "Deck published");
    Ok(Json(deck))
}

/// DELETE /api/v1/decks/:id
pub async fn handle_delete_deck(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    library::delete_deck(&state.db, id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/cards/:id/review
pub async fn handle_review_card(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<ReviewRequest>,
) -> Result<Json<FlashcardRow>, AppError> {
    let card = library::review_card(&state.db, id, user_id, req.correct).await?;
    Ok(Json(card))
}

/// GET /api/v1/notes/:id
pub async fn handle_get_note(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<NoteRow>, AppError> {
    let note = library::readable_note(&state.db, id, user_id).await?;
    Ok(Json(note))
}

/// PATCH /api/v1/notes/:id
pub async fn handle_update_note(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<NoteUpdate>,
) -> Result<Json<NoteRow>, AppError> {
    let (content, title) = validate_note_update(&req)?;
    let note = library::update_note(&state.db, id, user_id, content, title).await?;
    Ok(Json(note))
}

/// POST /api/v1/notes/:id/publish
pub async fn handle_publish_note(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<NoteRow>, AppError> {
    let note = library::publish_note(&state.db, id, user_id).await?;
    tracing::info!(note_id = %id, "Note published");
    Ok(Json(note))
}

/// DELETE /api/v1/notes/:id
pub async fn handle_delete_note(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    library::delete_note(&state.db, id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn validate_note_update(req: &NoteUpdate) -> Result<(&str, Option<&str>), AppError> {
    if req.content.trim().is_empty() {
        return Err(AppError::Validation("content cannot be empty".to_string()));
    }
    let title = match req.title.as_deref().map(str::trim) {
        Some("") => return Err(AppError::Validation("title cannot be empty".to_string())),
        other => other,
    };
    Ok((req.content.as_str(), title))
}
