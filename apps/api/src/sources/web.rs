//! Web article extraction: fetch HTML, prefer the `<article>` element,
//! fall back to `<body>`, then reduce to plain text.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::sources::normalize::{decode_html_entities, strip_unsafe_chars};
use crate::sources::{fetch_text, parse_http_url, CleanedText, ExtractError};

static RE_NON_CONTENT: Lazy<[Regex; 4]> = Lazy::new(|| {
    [
        Regex::new(r"(?is)<script\b.*?</script\s*>").unwrap(),
        Regex::new(r"(?is)<style\b.*?</style\s*>").unwrap(),
        Regex::new(r"(?is)<noscript\b.*?</noscript\s*>").unwrap(),
        Regex::new(r"(?s)<!--.*?-->").unwrap(),
    ]
});

static RE_ARTICLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<article\b[^>]*>(.*?)</article\s*>").unwrap());

static RE_BODY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<body\b[^>]*>(.*)</body\s*>").unwrap());

static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

pub async fn extract(client: &reqwest::Client, url: &str) -> Result<CleanedText, ExtractError> {
    let url = parse_http_url(url)?;
    let html = fetch_text(client, url, "web page").await?;

    let text = extract_article_text(&html);
    debug!(chars = text.len(), "Web article text extracted");

    if text.is_empty() {
        return Err(ExtractError::EmptyContent("web page"));
    }
    Ok(CleanedText::new(text))
}

/// Reduces an HTML document to the readable text of its article (or body).
pub fn extract_article_text(html: &str) -> String {
    let mut html = html.to_string();
    for re in RE_NON_CONTENT.iter() {
        html = re.replace_all(&html, " ").into_owned();
    }

    let region = RE_ARTICLE
        .captures(&html)
        .or_else(|| RE_BODY.captures(&html))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(&html);

    let text = RE_TAG.replace_all(region, " ");
    strip_unsafe_chars(&decode_html_entities(&text))
}
