//! Title Generator: one short model call over the opening of the source.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::errors::AppError;
use crate::generation::prompts::{TITLE_PROMPT_TEMPLATE, TITLE_SYSTEM};
use crate::llm_client::prompts::SOURCE_LANGUAGE_INSTRUCTION;
use crate::llm_client::LanguageModel;

pub const DEFAULT_DECK_TITLE: &str = "Generated Flashcards";
pub const DEFAULT_NOTE_TITLE: &str = "Untitled";

const TITLE_PREFIX_CHARS: usize = 1_000;
const MAX_TITLE_CHARS: usize = 150;

static RE_LANGUAGE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*\**\s*language\s*\**\s*:").unwrap());

static RE_LANGUAGE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*[(\[]\s*language\s*:[^)\]]*[)\]]").unwrap());

static RE_TITLE_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*\**\s*title\s*\**\s*:\s*\**").unwrap());

pub async fn generate_title(
    llm: &dyn LanguageModel,
    text: &str,
    fallback: &str,
) -> Result<String, AppError> {
    let prefix: String = text.chars().take(TITLE_PREFIX_CHARS).collect();
    let prompt = TITLE_PROMPT_TEMPLATE
        .replace("{language_instruction}", SOURCE_LANGUAGE_INSTRUCTION)
        .replace("{text}", &prefix);

    let raw = llm
        .complete(&prompt, TITLE_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Title generation failed: {e}")))?;

    Ok(clean_title(&raw).unwrap_or_else(|| {
        warn!("Model returned no usable title, using fallback {fallback:?}");
        fallback.to_string()
    }))
}

/// Removes label artifacts the model sometimes adds despite instructions
/// (`Title: ...`, `Language: ...`, markdown, quotes) and keeps the first real line.
pub fn clean_title(raw: &str) -> Option<String> {
    raw.lines()
        .filter(|line| !RE_LANGUAGE_LINE.is_match(line))
        .map(|line| {
            let line = RE_LANGUAGE_SUFFIX.replace_all(line, "");
            let line = RE_TITLE_LABEL.replace(&line, "");
            line.trim()
                .trim_start_matches('#')
                .trim_matches(|c: char| {
                    c.is_whitespace() || matches!(c, '*' | '"' | '\'' | '`' | '“' | '”')
                })
                .to_string()
        })
        .find(|line| !line.is_empty())
        .map(|line| line.chars().take(MAX_TITLE_CHARS).collect())
}
