//! Source extraction: turns a PDF upload, YouTube URL, web URL or pasted text
//! into one `CleanedText` blob plus the size metrics the size guard needs.
//!
//! `AppState` holds an `Arc<dyn SourceExtractor>`; `HttpSourceExtractor` is the
//! production implementation and dispatches on the `Source` variant.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub mod normalize;
pub mod pdf;
pub mod web;
pub mod youtube;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; GStudyBot/1.0; +https://gstudy.app)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
    YouTube,
    Web,
    Text,
}

/// A source descriptor as received from the client.
#[derive(Debug, Clone)]
pub enum Source {
    Pdf(Bytes),
    YouTube { url: String },
    Web { url: String },
    Text { content: String },
}

impl Source {
    pub fn kind(&self) -> SourceKind {
        match self {
            Source::Pdf(_) => SourceKind::Pdf,
            Source::YouTube { .. } => SourceKind::YouTube,
            Source::Web { .. } => SourceKind::Web,
            Source::Text { .. } => SourceKind::Text,
        }
    }
}

/// Source material after extraction and normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedText {
    pub text: String,
    pub word_count: usize,
    pub page_count: Option<usize>,
    pub duration_seconds: Option<u64>,
}

impl CleanedText {
    pub fn new(text: String) -> Self {
        let word_count = word_count(&text);
        Self {
            text,
            word_count,
            page_count: None,
            duration_seconds: None,
        }
    }

    pub fn with_pages(mut self, page_count: usize) -> Self {
        self.page_count = Some(page_count);
        self
    }

    pub fn with_duration(mut self, duration_seconds: u64) -> Self {
        self.duration_seconds = Some(duration_seconds);
        self
    }
}

/// Number of whitespace-separated tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Could not read the uploaded file: {0}")]
    UnreadableFile(String),

    #[error("No transcript is available for this video")]
    NoTranscript,

    #[error("No readable text could be extracted from the {0}")]
    EmptyContent(&'static str),

    #[error("Failed to fetch the {upstream}: {message}")]
    Fetch { upstream: String, message: String },

    #[error("{0}")]
    TooLarge(String),
}

#[async_trait]
pub trait SourceExtractor: Send + Sync {
    async fn extract(&self, source: &Source) -> Result<CleanedText, ExtractError>;
}

/// Production extractor: network fetches go through one shared `reqwest::Client`.
pub struct HttpSourceExtractor {
    client: reqwest::Client,
    max_video_seconds: u64,
}

impl HttpSourceExtractor {
    pub fn new(max_video_seconds: u64) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(20))
            .build()?;
        Ok(Self {
            client,
            max_video_seconds,
        })
    }
}

#[async_trait]
impl SourceExtractor for HttpSourceExtractor {
    async fn extract(&self, source: &Source) -> Result<CleanedText, ExtractError> {
        match source {
            Source::Pdf(bytes) => pdf::extract(bytes.clone()).await,
            Source::YouTube { url } => {
                youtube::extract(&self.client, url, self.max_video_seconds).await
            }
            Source::Web { url } => web::extract(&self.client, url).await,
            Source::Text { content } => extract_text(content),
        }
    }
}

fn extract_text(content: &str) -> Result<CleanedText, ExtractError> {
    let text = normalize::collapse_whitespace(content);
    if text.is_empty() {
        return Err(ExtractError::EmptyContent("pasted text"));
    }
    Ok(CleanedText::new(text))
}

/// Parses and checks an http(s) URL supplied by the client.
pub(crate) fn parse_http_url(raw: &str) -> Result<reqwest::Url, ExtractError> {
    let url = reqwest::Url::parse(raw.trim())
        .map_err(|e| ExtractError::InvalidUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ExtractError::InvalidUrl(format!(
            "unsupported scheme '{other}'"
        ))),
    }
}

pub(crate) async fn fetch_text(
    client: &reqwest::Client,
    url: reqwest::Url,
    upstream: &str,
) -> Result<String, ExtractError> {
    let fetch_error = |e: reqwest::Error| ExtractError::Fetch {
        upstream: upstream.to_string(),
        message: e.to_string(),
    };
    client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(fetch_error)?
        .text()
        .await
        .map_err(fetch_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count_splits_on_any_whitespace() {
        assert_eq!(word_count("one two\tthree\n\nfour  "), 4);
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   "), 0);
    }

    #[test]
    fn test_cleaned_text_counts_words() {
        let cleaned = CleanedText::new("cells divide by mitosis".to_string()).with_pages(3);
        assert_eq!(cleaned.word_count, 4);
        assert_eq!(cleaned.page_count, Some(3));
        assert_eq!(cleaned.duration_seconds, None);
    }

    #[test]
    fn test_text_passthrough_collapses_whitespace() {
        let cleaned = extract_text("  The cell\n\nis   the unit of life. ").unwrap();
        assert_eq!(cleaned.text, "The cell is the unit of life.");
        assert_eq!(cleaned.word_count, 7);
    }

    #[test]
    fn test_text_passthrough_rejects_blank() {
        assert!(matches!(
            extract_text(" \n\t "),
            Err(ExtractError::EmptyContent(_))
        ));
    }

    #[test]
    fn test_parse_http_url_rejects_other_schemes() {
        assert!(parse_http_url("https://example.com/post").is_ok());
        assert!(matches!(
            parse_http_url("ftp://example.com/file"),
            Err(ExtractError::InvalidUrl(_))
        ));
        assert!(matches!(
            parse_http_url("not a url"),
            Err(ExtractError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_source_kind() {
        assert_eq!(Source::Pdf(Bytes::new()).kind(), SourceKind::Pdf);
        assert_eq!(
            Source::Text {
                content: String::new()
            }
            .kind(),
            SourceKind::Text
        );
    }
}
