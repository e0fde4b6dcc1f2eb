//! PDF extraction via `pdf-extract`, run on the blocking pool.

use bytes::Bytes;
use tracing::debug;

use crate::sources::normalize::normalize_pdf_text;
use crate::sources::{CleanedText, ExtractError};

const PDF_MAGIC: &[u8] = b"%PDF";

pub async fn extract(bytes: Bytes) -> Result<CleanedText, ExtractError> {
    if !looks_like_pdf(&bytes) {
        return Err(ExtractError::UnreadableFile(
            "the file is not a PDF document".to_string(),
        ));
    }

    // CPU-bound, and may panic on malformed input (surfaces as a JoinError).
    let pages = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem_by_pages(&bytes)
    })
    .await
    .map_err(|e| ExtractError::UnreadableFile(format!("the PDF parser failed: {e}")))?
    .map_err(|e| ExtractError::UnreadableFile(e.to_string()))?;

    let page_count = pages.len();
    let text = normalize_pdf_text(&pages.join("\n"));
    debug!(page_count, chars = text.len(), "PDF text extracted");

    if text.is_empty() {
        return Err(ExtractError::EmptyContent("PDF"));
    }

    Ok(CleanedText::new(text).with_pages(page_count))
}

/// Readers accept the `%PDF` header anywhere in the first 1024 bytes.
fn looks_like_pdf(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    head.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC)
}
