//! Note Generator: title call, then the HTML body over the whole source.
//!
//! With `chunked` set, the body is instead generated per chunk (concurrently)
//! and the `<h2>` sections are concatenated in chunk order.

use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::info;

use crate::errors::AppError;
use crate::generation::chunker::{chunk_text, Chunk, ChunkPolicy};
use crate::generation::prompts::{
    NOTE_FORMAT_RULES, NOTE_PROMPT_TEMPLATE, NOTE_SECTION_PROMPT_TEMPLATE, NOTE_SYSTEM,
};
use crate::generation::title::{generate_title, DEFAULT_NOTE_TITLE};
use crate::generation::{Artifact, ArtifactGenerator, ArtifactKind};
use crate::llm_client::prompts::{NO_ELLIPSIS_INSTRUCTION, SOURCE_LANGUAGE_INSTRUCTION};
use crate::llm_client::{strip_code_fences, LanguageModel};
use crate::sources::{CleanedText, ExtractError};

#[derive(Debug, Clone, Default)]
pub struct NoteGenerator {
    pub chunked: bool,
    pub chunking: ChunkPolicy,
}

impl NoteGenerator {
    pub fn new(chunked: bool) -> Self {
        Self {
            chunked,
            ..Self::default()
        }
    }

    async fn whole_body(&self, llm: &dyn LanguageModel, text: &str) -> Result<String, AppError> {
        let prompt = fill_note_rules(NOTE_PROMPT_TEMPLATE).replace("{text}", text);
        let raw = llm
            .complete(&prompt, NOTE_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(format!("Note generation failed: {e}")))?;
        Ok(clean_note_html(&raw).to_string())
    }

    async fn chunked_body(&self, llm: &dyn LanguageModel, text: &str) -> Result<String, AppError> {
        let chunks = chunk_text(text, &self.chunking);
        info!("Generating chunked note body: chunks={}", chunks.len());

        let total = chunks.len();
        let sections =
            try_join_all(chunks.iter().map(|chunk| generate_section(llm, chunk, total))).await?;

        Ok(sections
            .iter()
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

#[async_trait]
impl ArtifactGenerator for NoteGenerator {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Summary
    }

    async fn generate(
        &self,
        llm: &dyn LanguageModel,
        text: &CleanedText,
    ) -> Result<Artifact, AppError> {
        let source = text.text.trim();
        if source.is_empty() {
            return Err(ExtractError::EmptyContent("source").into());
        }

        // Sequential: the body is only requested once the title call has succeeded.
        let title = generate_title(llm, source, DEFAULT_NOTE_TITLE).await?;
        let content = if self.chunked {
            self.chunked_body(llm, source).await?
        } else {
            self.whole_body(llm, source).await?
        };

        if content.is_empty() {
            return Err(AppError::Llm("The model returned an empty note".to_string()));
        }

        Ok(Artifact::Note {
            title,
            content,
            source: source.to_string(),
        })
    }
}

async fn generate_section(
    llm: &dyn LanguageModel,
    chunk: &Chunk,
    total: usize,
) -> Result<String, AppError> {
    let prompt = fill_note_rules(NOTE_SECTION_PROMPT_TEMPLATE)
        .replace("{part}", &(chunk.index + 1).to_string())
        .replace("{parts}", &total.to_string())
        .replace("{chunk}", &chunk.text);
    let raw = llm.complete(&prompt, NOTE_SYSTEM).await.map_err(|e| {
        AppError::Llm(format!(
            "Note generation failed for chunk {}: {e}",
            chunk.index
        ))
    })?;
    Ok(clean_note_html(&raw).to_string())
}

fn fill_note_rules(template: &str) -> String {
    template
        .replace("{format_rules}", NOTE_FORMAT_RULES)
        .replace("{ellipsis_instruction}", NO_ELLIPSIS_INSTRUCTION)
        .replace("{language_instruction}", SOURCE_LANGUAGE_INSTRUCTION)
}

/// Removes ```` ```html ```` / ```` ``` ```` wrappers the model adds despite instructions.
pub fn clean_note_html(raw: &str) -> &str {
    strip_code_fences(raw)
}
