//! Generation pipeline: the fixed skeleton every generation endpoint runs.
//!
//! Flow: quota gate (rate limit + reserve) → extract → size guard →
//!       artifact generator (chunk, title ∥ fan-out, aggregate) → persist.
//!
//! Any failure or cancellation after the reservation releases it, so a user
//! is charged exactly one generation per persisted artifact.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::size_guard::{check_size, SizeLimits};
use crate::generation::store::GenerationStore;
use crate::generation::{Artifact, ArtifactGenerator};
use crate::llm_client::LanguageModel;
use crate::quota::QuotaGate;
use crate::sources::{Source, SourceExtractor};

/// A persisted artifact and the id it was stored under.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub id: Uuid,
    pub artifact: Artifact,
}

pub struct GenerationPipeline {
    pub llm: Arc<dyn LanguageModel>,
    pub extractor: Arc<dyn SourceExtractor>,
    pub store: Arc<dyn GenerationStore>,
    pub quota: QuotaGate,
    pub limits: SizeLimits,
}

impl GenerationPipeline {
    pub async fn run(
        &self,
        user_id: Uuid,
        source: Source,
        generator: &dyn ArtifactGenerator,
    ) -> Result<GenerationOutcome, AppError> {
        info!(
            "Generation requested: user={} source={:?} artifact={:?}",
            user_id,
            source.kind(),
            generator.kind()
        );

        // Dropping `pending` (request timeout, client gone) refunds in the background.
        let pending = self.quota.admit(user_id).await?;

        match self.produce(user_id, &source, generator).await {
            Ok(outcome) => {
                pending.commit();
                info!("Generation {} persisted for user {}", outcome.id, user_id);
                Ok(outcome)
            }
            Err(e) => {
                pending.refund().await;
                Err(e)
            }
        }
    }

    async fn produce(
        &self,
        user_id: Uuid,
        source: &Source,
        generator: &dyn ArtifactGenerator,
    ) -> Result<GenerationOutcome, AppError> {
        let text = self.extractor.extract(source).await?;
        info!(
            "Extracted {} words ({} chars) from {:?} source",
            text.word_count,
            text.text.chars().count(),
            source.kind()
        );

        check_size(&text, source.kind(), generator.kind(), &self.limits)?;

        let artifact = generator.generate(self.llm.as_ref(), &text).await?;

        let id = match &artifact {
            Artifact::Deck { title, cards } => {
                self.store.create_deck(user_id, title, cards).await?
            }
            Artifact::Note {
                title,
                content,
                source,
            } => self.store.create_note(user_id, title, content, source).await?,
        };

        Ok(GenerationOutcome { id, artifact })
    }
}
