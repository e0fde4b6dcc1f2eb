//! Deterministic text cleanup shared by the extractors.
//! Every function here is pure and idempotent.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// A word split across a line break by a hyphen: `exam-\nple`.
static RE_HYPHEN_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\p{L})-[ \t]*\r?\n\s*(\p{L})").unwrap());

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Anything that is not a letter, digit, whitespace or ordinary punctuation.
static RE_UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[^\p{L}\p{N}\s.,;:!?'"()%&/\-]"#).unwrap());

static RE_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});").unwrap());

/// Cleans text pulled out of a PDF: repairs hyphenated line breaks, then
/// collapses newlines and runs of spaces into single spaces.
pub fn normalize_pdf_text(raw: &str) -> String {
    let joined = RE_HYPHEN_BREAK.replace_all(raw, "$1$2");
    collapse_whitespace(&joined)
}

pub fn collapse_whitespace(text: &str) -> String {
    RE_WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Drops characters outside the letters/digits/punctuation set, then collapses whitespace.
pub fn strip_unsafe_chars(text: &str) -> String {
    let stripped = RE_UNSAFE_CHARS.replace_all(text, "");
    collapse_whitespace(&stripped)
}

/// Decodes numeric and the common named HTML entities. Unknown entities are left as-is.
pub fn decode_html_entities(text: &str) -> String {
    RE_ENTITY
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            decode_entity(entity).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_entity(entity: &str) -> Option<String> {
    if let Some(hex) = entity
        .strip_prefix("#x")
        .or_else(|| entity.strip_prefix("#X"))
    {
        return u32::from_str_radix(hex, 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from);
    }
    if let Some(dec) = entity.strip_prefix('#') {
        return dec
            .parse::<u32>()
            .ok()
            .and_then(char::from_u32)
            .map(String::from);
    }
    let decoded = match entity {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        "ndash" => "-",
        "mdash" => "-",
        "hellip" => "...",
        "rsquo" | "lsquo" => "'",
        "rdquo" | "ldquo" => "\"",
        _ => return None,
    };
    Some(decoded.to_string())
}
