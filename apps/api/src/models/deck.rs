use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DeckRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardRow {
    pub id: Uuid,
    pub deck_id: Uuid,
    pub position: i32,
    pub question: String,
    pub answer: String,
    pub score: i32,
}

/// A deck with its cards, as returned by the library endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckWithCards {
    #[serde(flatten)]
    pub deck: DeckRow,
    pub cards: Vec<FlashcardRow>,
}
