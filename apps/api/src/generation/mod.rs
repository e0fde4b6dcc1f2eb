// Content-generation pipeline.
// Size guard, chunking, title/flashcard/note generation, aggregation and persistence.
// All LLM calls go through llm_client::LanguageModel, never the Anthropic client directly.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::generation::flashcards::Flashcard;
use crate::llm_client::LanguageModel;
use crate::sources::CleanedText;

pub mod chunker;
pub mod flashcards;
pub mod handlers;
pub mod notes;
pub mod pipeline;
pub mod prompts;
pub mod size_guard;
pub mod store;
pub mod title;

#[cfg(test)]
pub mod testing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Flashcards,
    Summary,
}

/// The output of one pipeline run, before persistence.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    Deck {
        title: String,
        cards: Vec<Flashcard>,
    },
    Note {
        title: String,
        content: String,
        source: String,
    },
}

/// Strategy for turning cleaned text into an artifact. `FlashcardGenerator`
/// and `NoteGenerator` are the two implementations the pipeline is run with.
#[async_trait]
pub trait ArtifactGenerator: Send + Sync {
    fn kind(&self) -> ArtifactKind;

    async fn generate(
        &self,
        llm: &dyn LanguageModel,
        text: &CleanedText,
    ) -> Result<Artifact, AppError>;
}
