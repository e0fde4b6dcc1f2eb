//! Persistence & usage accounting for generated artifacts.
//!
//! The monthly allowance is charged with reserve-then-commit: `reserve_generation`
//! is one conditional UPDATE (so concurrent requests cannot both pass the check),
//! and `release_generation` refunds the reservation when a later step fails.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::flashcards::Flashcard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    /// One generation is now charged; `used` includes it.
    Reserved { used: i32, allowance: i32 },
    Exhausted { used: i32, allowance: i32 },
    UnknownUser,
}

#[async_trait]
pub trait GenerationStore: Send + Sync {
    async fn reserve_generation(&self, user_id: Uuid) -> Result<Reservation, AppError>;

    async fn release_generation(&self, user_id: Uuid) -> Result<(), AppError>;

    /// Creates the deck and all of its cards as one unit.
    async fn create_deck(
        &self,
        owner_id: Uuid,
        title: &str,
        cards: &[Flashcard],
    ) -> Result<Uuid, AppError>;

    async fn create_note(
        &self,
        owner_id: Uuid,
        title: &str,
        content: &str,
        source: &str,
    ) -> Result<Uuid, AppError>;
}

#[derive(Clone)]
pub struct PgGenerationStore {
    pool: PgPool,
}

impl PgGenerationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GenerationStore for PgGenerationStore {
    async fn reserve_generation(&self, user_id: Uuid) -> Result<Reservation, AppError> {
        let reserved: Option<(i32, i32)> = sqlx::query_as(
            r#"
            UPDATE users
            SET generations_used_this_month = generations_used_this_month + 1
            WHERE id = $1 AND generations_used_this_month < generations
            RETURNING generations_used_this_month, generations
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some((used, allowance)) = reserved {
            return Ok(Reservation::Reserved { used, allowance });
        }

        let current: Option<(i32, i32)> = sqlx::query_as(
            "SELECT generations_used_this_month, generations FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match current {
            Some((used, allowance)) => Reservation::Exhausted { used, allowance },
            None => Reservation::UnknownUser,
        })
    }

    async fn release_generation(&self, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET generations_used_this_month = GREATEST(generations_used_this_month - 1, 0)
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn create_deck(
        &self,
        owner_id: Uuid,
        title: &str,
        cards: &[Flashcard],
    ) -> Result<Uuid, AppError> {
        let deck_id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO decks (id, owner_id, title, is_public) VALUES ($1, $2, $3, FALSE)")
            .bind(deck_id)
            .bind(owner_id)
            .bind(title)
            .execute(&mut *tx)
            .await?;

        for (position, card) in cards.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO flashcards (id, deck_id, position, question, answer, score)
                VALUES ($1, $2, $3, $4, $5, 0)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(deck_id)
            .bind(position as i32)
            .bind(&card.question)
            .bind(&card.answer)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(deck_id)
    }

    async fn create_note(
        &self,
        owner_id: Uuid,
        title: &str,
        content: &str,
        source: &str,
    ) -> Result<Uuid, AppError> {
        let note_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO notes (id, owner_id, title, content, source, is_public)
            VALUES ($1, $2, $3, $4, $5, FALSE)
            "#,
        )
        .bind(note_id)
        .bind(owner_id)
        .bind(title)
        .bind(content)
        .bind(source)
        .execute(&self.pool)
        .await?;
        Ok(note_id)
    }
}
