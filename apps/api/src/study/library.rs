//! Database access for the library endpoints. Every lookup takes the caller's
//! id so visibility is decided in one place.

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::deck::{DeckRow, FlashcardRow};
use crate::models::note::NoteRow;
use crate::models::user::UsageRow;
use crate::study::practice::next_score;

/// Owners always see their own items; everyone else only sees published ones.
pub fn visible_to(owner_id: Uuid, is_public: bool, caller: Uuid) -> bool {
    owner_id == caller || is_public
}

fn deck_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Deck {id} not found"))
}

fn note_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Note {id} not found"))
}

pub async fn usage(pool: &PgPool, user_id: Uuid) -> Result<UsageRow, AppError> {
    let row: Option<UsageRow> = sqlx::query_as(
        "SELECT generations, generations_used_this_month FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    row.ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

pub async fn readable_deck(pool: &PgPool, id: Uuid, caller: Uuid) -> Result<DeckRow, AppError> {
    let deck: Option<DeckRow> = sqlx::query_as("SELECT * FROM decks WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    deck.filter(|d| visible_to(d.owner_id, d.is_public, caller))
        .ok_or_else(|| deck_not_found(id))
}

pub async fn deck_cards(pool: &PgPool, deck_id: Uuid) -> Result<Vec<FlashcardRow>, AppError> {
    let cards = sqlx::query_as(
        "SELECT * FROM flashcards WHERE deck_id = $1 ORDER BY position ASC",
    )
    .bind(deck_id)
    .fetch_all(pool)
    .await?;
    Ok(cards)
}

/// One-way: there is no unpublish.
pub async fn publish_deck(pool: &PgPool, id: Uuid, owner: Uuid) -> Result<DeckRow, AppError> {
    let deck: Option<DeckRow> = sqlx::query_as(
        "UPDATE decks SET is_public = TRUE WHERE id = $1 AND owner_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(owner)
    .fetch_optional(pool)
    .await?;

    deck.ok_or_else(|| deck_not_found(id))
}

pub async fn delete_deck(pool: &PgPool, id: Uuid, owner: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM decks WHERE id = $1 AND owner_id = $2")
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(deck_not_found(id));
    }
    Ok(())
}

/// Applies one practice answer to a card in a deck the caller owns.
pub async fn review_card(
    pool: &PgPool,
    card_id: Uuid,
    owner: Uuid,
    correct: bool,
) -> Result<FlashcardRow, AppError> {
    let mut tx = pool.begin().await?;

    let card: Option<FlashcardRow> = sqlx::query_as(
        r#"
        SELECT f.* FROM flashcards f
        JOIN decks d ON d.id = f.deck_id
        WHERE f.id = $1 AND d.owner_id = $2
        FOR UPDATE OF f
        "#,
    )
    .bind(card_id)
    .bind(owner)
    .fetch_optional(&mut *tx)
    .await?;

    let card = card.ok_or_else(|| AppError::NotFound(format!("Card {card_id} not found")))?;

    let updated: FlashcardRow =
        sqlx::query_as("UPDATE flashcards SET score = $1 WHERE id = $2 RETURNING *")
            .bind(next_score(card.score, correct))
            .bind(card_id)
            .fetch_one(&mut *tx)
            .await?;

    tx.commit().await?;
    Ok(updated)
}

pub async fn readable_note(pool: &PgPool, id: Uuid, caller: Uuid) -> Result<NoteRow, AppError> {
    let note: Option<NoteRow> = sqlx::query_as("SELECT * FROM notes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    note.filter(|n| visible_to(n.owner_id, n.is_public, caller))
        .ok_or_else(|| note_not_found(id))
}

/// Replaces the note body (and the title when given). `source` is never touched.
pub async fn update_note(
    pool: &PgPool,
    id: Uuid,
    owner: Uuid,
    content: &str,
    title: Option<&str>,
) -> Result<NoteRow, AppError> {
    let note: Option<NoteRow> = sqlx::query_as(
        r#"
        UPDATE notes
        SET content = $1, title = COALESCE($2, title), updated_at = now()
        WHERE id = $3 AND owner_id = $4
        RETURNING *
        "#,
    )
    .bind(content)
    .bind(title)
    .bind(id)
    .bind(owner)
    .fetch_optional(pool)
    .await?;

    note.ok_or_else(|| note_not_found(id))
}

pub async fn publish_note(pool: &PgPool, id: Uuid, owner: Uuid) -> Result<NoteRow, AppError> {
    let note: Option<NoteRow> = sqlx::query_as(
        "UPDATE notes SET is_public = TRUE WHERE id = $1 AND owner_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(owner)
    .fetch_optional(pool)
    .await?;

    note.ok_or_else(|| note_not_found(id))
}

pub async fn delete_note(pool: &PgPool, id: Uuid, owner: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND owner_id = $2")
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(note_not_found(id));
    }
    Ok(())
}
