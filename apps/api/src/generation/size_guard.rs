//! Size Guard: rejects oversized sources before any model call, bounding cost and latency.

use crate::errors::AppError;
use crate::generation::ArtifactKind;
use crate::sources::{CleanedText, SourceKind};

#[derive(Debug, Clone)]
pub struct SizeLimits {
    pub max_pdf_pages: usize,
    /// Applies to every source on the summary path.
    pub max_summary_words: usize,
    /// Applies to web articles on both paths.
    pub max_web_words: usize,
    pub max_video_seconds: u64,
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self {
            max_pdf_pages: 100,
            max_summary_words: 10_000,
            max_web_words: 5_000,
            max_video_seconds: 7_200,
        }
    }
}

/// Returns `AppError::PayloadTooLarge` naming the measured value and the limit.
/// The flashcard path has no word cap of its own; the chunker bounds its call count.
pub fn check_size(
    text: &CleanedText,
    source: SourceKind,
    artifact: ArtifactKind,
    limits: &SizeLimits,
) -> Result<(), AppError> {
    if let Some(pages) = text.page_count {
        if pages > limits.max_pdf_pages {
            return Err(AppError::PayloadTooLarge(format!(
                "The PDF has {pages} pages; the maximum is {} pages.",
                limits.max_pdf_pages
            )));
        }
    }

    if let Some(seconds) = text.duration_seconds {
        if let Some(message) = duration_violation(seconds, limits.max_video_seconds) {
            return Err(AppError::PayloadTooLarge(message));
        }
    }

    if source == SourceKind::Web && text.word_count > limits.max_web_words {
        return Err(AppError::PayloadTooLarge(format!(
            "The article has {} words; the maximum is {} words.",
            text.word_count, limits.max_web_words
        )));
    }

    if artifact == ArtifactKind::Summary && text.word_count > limits.max_summary_words {
        return Err(AppError::PayloadTooLarge(format!(
            "The source has {} words; the maximum for notes is {} words.",
            text.word_count, limits.max_summary_words
        )));
    }

    Ok(())
}

/// Shared with the YouTube extractor, which checks duration before fetching captions.
pub fn duration_violation(seconds: u64, limit: u64) -> Option<String> {
    (seconds > limit).then(|| {
        format!("The video is {seconds} seconds long; the maximum is {limit} seconds.")
    })
}
