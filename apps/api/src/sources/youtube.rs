//! YouTube transcript extraction.
//!
//! Flow: resolve video id → fetch watch page → read duration and caption
//! tracks from the embedded player response → reject overly long videos →
//! fetch the caption XML → concatenate segments in order.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::generation::size_guard::duration_violation;
use crate::sources::normalize::{collapse_whitespace, decode_html_entities};
use crate::sources::{fetch_text, parse_http_url, CleanedText, ExtractError};

static RE_VIDEO_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:youtube\.com/(?:watch\?(?:[^#]*&)?v=|embed/|shorts/|live/|v/)|youtu\.be/)([A-Za-z0-9_-]{11})",
    )
    .unwrap()
});

static RE_BARE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());

static RE_CAPTION_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<text\b[^>]*>(.*?)</text>").unwrap());

const PLAYER_RESPONSE_MARKER: &str = "ytInitialPlayerResponse";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    video_details: Option<VideoDetails>,
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoDetails {
    length_seconds: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: CaptionTrackList,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrackList {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    /// `"asr"` for auto-generated tracks.
    kind: Option<String>,
}

#[derive(Debug, PartialEq)]
struct VideoMetadata {
    duration_seconds: u64,
    caption_url: Option<String>,
}

pub async fn extract(
    client: &reqwest::Client,
    url: &str,
    max_duration_seconds: u64,
) -> Result<CleanedText, ExtractError> {
    let id = video_id(url)?;
    let watch_url = parse_http_url(&format!("https://www.youtube.com/watch?v={id}&hl=en"))?;
    let html = fetch_text(client, watch_url, "YouTube video page").await?;

    let metadata = parse_player_response(&html)?;
    debug!(video_id = %id, duration = metadata.duration_seconds, "YouTube metadata resolved");

    if let Some(message) = duration_violation(metadata.duration_seconds, max_duration_seconds) {
        return Err(ExtractError::TooLarge(message));
    }

    let caption_url = metadata.caption_url.ok_or(ExtractError::NoTranscript)?;
    let caption_url = parse_http_url(&caption_url)?;
    let xml = fetch_text(client, caption_url, "YouTube transcript").await?;

    let text = parse_transcript(&xml);
    if text.is_empty() {
        return Err(ExtractError::NoTranscript);
    }
    Ok(CleanedText::new(text).with_duration(metadata.duration_seconds))
}

/// Resolves the 11-character video id from any common YouTube URL shape.
pub fn video_id(url: &str) -> Result<String, ExtractError> {
    let url = url.trim();
    if RE_BARE_ID.is_match(url) {
        return Ok(url.to_string());
    }
    RE_VIDEO_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ExtractError::InvalidUrl(format!("not a YouTube video URL: {url}")))
}

fn parse_player_response(html: &str) -> Result<VideoMetadata, ExtractError> {
    let unavailable = || ExtractError::Fetch {
        upstream: "YouTube video page".to_string(),
        message: "video details are unavailable".to_string(),
    };

    let start = html
        .find(PLAYER_RESPONSE_MARKER)
        .and_then(|at| html[at..].find('{').map(|brace| at + brace))
        .ok_or_else(unavailable)?;

    // The object is followed by more script; stream-parse exactly one value.
    let player: PlayerResponse = serde_json::Deserializer::from_str(&html[start..])
        .into_iter::<PlayerResponse>()
        .next()
        .ok_or_else(unavailable)?
        .map_err(|_| unavailable())?;

    let duration_seconds = player
        .video_details
        .and_then(|d| d.length_seconds.parse::<u64>().ok())
        .ok_or_else(unavailable)?;

    let tracks = player
        .captions
        .map(|c| c.player_captions_tracklist_renderer.caption_tracks)
        .unwrap_or_default();
    // Prefer a human-written track over auto-generated captions.
    let caption_url = tracks
        .iter()
        .find(|t| t.kind.as_deref() != Some("asr"))
        .or_else(|| tracks.first())
        .map(|t| t.base_url.clone());

    Ok(VideoMetadata {
        duration_seconds,
        caption_url,
    })
}

/// Concatenates caption segments in document order.
fn parse_transcript(xml: &str) -> String {
    let segments: Vec<String> = RE_CAPTION_SEGMENT
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        // Caption text arrives double-escaped (`&amp;#39;`).
        .map(|m| decode_html_entities(&decode_html_entities(m.as_str())))
        .collect();
    collapse_whitespace(&segments.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_id_from_url_shapes() {
        let expected = "dQw4w9WgXcQ";
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42",
            "https://youtu.be/dQw4w9WgXcQ?si=abc",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://m.youtube.com/live/dQw4w9WgXcQ",
            "dQw4w9WgXcQ",
        ] {
            assert_eq!(video_id(url).unwrap(), expected, "failed for {url}");
        }
    }

    #[test]
    fn test_video_id_rejects_other_sites() {
        assert!(matches!(
            video_id("https://vimeo.com/123456789"),
            Err(ExtractError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_parse_player_response_prefers_manual_captions() {
        let html = r#"<script>var ytInitialPlayerResponse = {"videoDetails":{"lengthSeconds":"613","title":"x"},
            "captions":{"playerCaptionsTracklistRenderer":{"captionTracks":[
              {"baseUrl":"https://www.youtube.com/api/timedtext?v=a&kind=asr","kind":"asr"},
              {"baseUrl":"https://www.youtube.com/api/timedtext?v=a&lang=en"}]}}};var meta = {};</script>"#;
        let metadata = parse_player_response(html).unwrap();
        assert_eq!(metadata.duration_seconds, 613);
        assert_eq!(
            metadata.caption_url.as_deref(),
            Some("https://www.youtube.com/api/timedtext?v=a&lang=en")
        );
    }

    #[test]
    fn test_parse_player_response_without_captions() {
        let html = r#"ytInitialPlayerResponse = {"videoDetails":{"lengthSeconds":"30"}};"#;
        let metadata = parse_player_response(html).unwrap();
        assert_eq!(metadata.caption_url, None);
    }

    #[test]
    fn test_parse_player_response_missing_marker() {
        assert!(parse_player_response("<html>consent page</html>").is_err());
    }

    #[test]
    fn test_parse_transcript_concatenates_in_order() {
        let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript>
            <text start="0" dur="1.5">Welcome back,</text>
            <text start="1.5" dur="2">today we&amp;#39;ll cover
            cells</text><text start="3.5" dur="1">&amp;amp; tissues.</text></transcript>"#;
        assert_eq!(
            parse_transcript(xml),
            "Welcome back, today we'll cover cells & tissues."
        );
    }
}
