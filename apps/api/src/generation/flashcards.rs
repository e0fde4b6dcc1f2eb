//! Flashcard Generator: fans out one structured call per chunk, then
//! aggregates the results in chunk order and truncates to the target count.

use async_trait::async_trait;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::generation::chunker::{chunk_text, Chunk, ChunkPolicy};
use crate::generation::prompts::{FLASHCARD_PROMPT_TEMPLATE, FLASHCARD_SYSTEM};
use crate::generation::title::{generate_title, DEFAULT_DECK_TITLE};
use crate::generation::{Artifact, ArtifactGenerator, ArtifactKind};
use crate::llm_client::prompts::{NO_ELLIPSIS_INSTRUCTION, SOURCE_LANGUAGE_INSTRUCTION};
use crate::llm_client::{call_json, LanguageModel};
use crate::sources::{CleanedText, ExtractError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

/// Structured output schema for one chunk call.
#[derive(Debug, Deserialize)]
struct FlashcardBatch {
    flashcards: Vec<Flashcard>,
}

/// Deck sizing: one card per `words_per_card` words, clamped to
/// `[min_cards, max_cards]`, with at most `per_chunk_cap` requested per call.
#[derive(Debug, Clone)]
pub struct FlashcardPolicy {
    pub min_cards: usize,
    pub max_cards: usize,
    pub words_per_card: usize,
    pub per_chunk_cap: usize,
}

impl Default for FlashcardPolicy {
    fn default() -> Self {
        Self {
            min_cards: 10,
            max_cards: 50,
            words_per_card: 100,
            per_chunk_cap: 10,
        }
    }
}

impl FlashcardPolicy {
    pub fn target_count(&self, word_count: usize) -> usize {
        (word_count / self.words_per_card.max(1)).clamp(self.min_cards, self.max_cards)
    }

    pub fn per_chunk_hint(&self, target: usize) -> usize {
        target.min(self.per_chunk_cap)
    }
}

/// Concatenates per-chunk batches in chunk order and keeps the first `target`
/// cards. Truncation is positional: later chunks are dropped first.
pub fn aggregate_flashcards(batches: Vec<Vec<Flashcard>>, target: usize) -> Vec<Flashcard> {
    batches.into_iter().flatten().take(target).collect()
}

#[derive(Debug, Clone, Default)]
pub struct FlashcardGenerator {
    pub policy: FlashcardPolicy,
    pub chunking: ChunkPolicy,
}

#[async_trait]
impl ArtifactGenerator for FlashcardGenerator {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Flashcards
    }

    async fn generate(
        &self,
        llm: &dyn LanguageModel,
        text: &CleanedText,
    ) -> Result<Artifact, AppError> {
        let chunks = chunk_text(&text.text, &self.chunking);
        if chunks.is_empty() {
            return Err(ExtractError::EmptyContent("source").into());
        }

        let target = self.policy.target_count(text.word_count);
        let per_chunk = self.policy.per_chunk_hint(target);
        info!(
            "Generating flashcards: words={} target={} chunks={} per_chunk={}",
            text.word_count,
            target,
            chunks.len(),
            per_chunk
        );

        // Title and every chunk run concurrently; the first failure fails the request.
        let title = generate_title(llm, &text.text, DEFAULT_DECK_TITLE);
        let batches = try_join_all(
            chunks
                .iter()
                .map(|chunk| generate_chunk_flashcards(llm, chunk, per_chunk)),
        );
        let (title, batches) = tokio::try_join!(title, batches)?;

        let cards = aggregate_flashcards(batches, target);
        if cards.is_empty() {
            return Err(AppError::Llm("The model returned no flashcards".to_string()));
        }

        Ok(Artifact::Deck { title, cards })
    }
}

async fn generate_chunk_flashcards(
    llm: &dyn LanguageModel,
    chunk: &Chunk,
    count: usize,
) -> Result<Vec<Flashcard>, AppError> {
    let prompt = FLASHCARD_PROMPT_TEMPLATE
        .replace("{count}", &count.to_string())
        .replace("{ellipsis_instruction}", NO_ELLIPSIS_INSTRUCTION)
        .replace("{language_instruction}", SOURCE_LANGUAGE_INSTRUCTION)
        .replace("{chunk}", &chunk.text);

    let batch: FlashcardBatch = call_json(llm, &prompt, FLASHCARD_SYSTEM)
        .await
        .map_err(|e| {
            AppError::Llm(format!(
                "Flashcard generation failed for chunk {}: {e}",
                chunk.index
            ))
        })?;

    let cards: Vec<Flashcard> = batch
        .flashcards
        .into_iter()
        .map(|card| Flashcard {
            question: card.question.trim().to_string(),
            answer: card.answer.trim().to_string(),
        })
        .filter(|card| !card.question.is_empty() && !card.answer.is_empty())
        .collect();

    debug!("Chunk {} produced {} flashcards", chunk.index, cards.len());
    Ok(cards)
}
