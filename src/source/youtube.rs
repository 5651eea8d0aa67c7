//! YouTube transcript source.
//!
//! Fetches caption tracks for a video and concatenates them into a single
//! text blob. No audio is downloaded; only the published captions are used.

use crate::error::{Result, SvarError};
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

/// Extract a video id from a YouTube URL.
///
/// Accepts `https://youtu.be/<id>` (first path segment) or any URL carrying a
/// `v=<id>` query parameter. Every other shape is rejected.
pub fn extract_video_id(input: &str) -> Result<String> {
    let parsed = Url::parse(input.trim())
        .map_err(|_| SvarError::InvalidSource(format!("Not a valid URL: {}", input)))?;

    if parsed.host_str() == Some("youtu.be") {
        let id = parsed
            .path_segments()
            .and_then(|mut segments| segments.next())
            .filter(|segment| !segment.is_empty());
        if let Some(id) = id {
            return Ok(id.to_string());
        }
    }

    if let Some((_, id)) = parsed.query_pairs().find(|(key, _)| key == "v") {
        if !id.is_empty() {
            return Ok(id.into_owned());
        }
    }

    Err(SvarError::InvalidSource(format!(
        "Could not find a video id in: {}",
        input
    )))
}

/// A caption track advertised by the watch page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    /// "asr" marks auto-generated tracks.
    #[serde(default)]
    pub kind: Option<String>,
}

/// Pick the track to fetch: the preferred language when available, the first
/// (default) track otherwise.
fn select_track<'a>(
    tracks: &'a [CaptionTrack],
    preferred_language: Option<&str>,
) -> Option<&'a CaptionTrack> {
    if let Some(lang) = preferred_language {
        if let Some(track) = tracks.iter().find(|t| t.language_code == lang) {
            return Some(track);
        }
    }
    tracks.first()
}

/// Transcript payload in YouTube's json3 format.
#[derive(Debug, Deserialize)]
struct TranscriptPayload {
    #[serde(default)]
    events: Vec<TranscriptEvent>,
}

#[derive(Debug, Deserialize)]
struct TranscriptEvent {
    #[serde(default)]
    segs: Vec<TranscriptSeg>,
}

#[derive(Debug, Deserialize)]
struct TranscriptSeg {
    #[serde(default)]
    utf8: String,
}

/// Join caption segments into one blob, separated by single spaces.
fn concat_events(payload: &TranscriptPayload) -> String {
    payload
        .events
        .iter()
        .flat_map(|event| event.segs.iter())
        .map(|seg| seg.utf8.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// YouTube transcript source.
pub struct YoutubeTranscriptSource {
    http: reqwest::Client,
    caption_tracks_regex: Regex,
}

impl YoutubeTranscriptSource {
    pub fn new() -> Self {
        // The track list is embedded as JSON in the watch page markup.
        let caption_tracks_regex =
            Regex::new(r#""captionTracks":(\[.*?\])"#).expect("Invalid regex");

        Self {
            http: reqwest::Client::new(),
            caption_tracks_regex,
        }
    }

    /// Fetch the transcript for a video, preferring the given language.
    ///
    /// Falls back to the default track when the preferred language is
    /// unavailable. Timing metadata is discarded; segment texts are joined
    /// with single spaces.
    #[instrument(skip(self))]
    pub async fn fetch_transcript(
        &self,
        video_id: &str,
        preferred_language: Option<&str>,
    ) -> Result<String> {
        let tracks = self.fetch_caption_tracks(video_id).await?;

        let track = select_track(&tracks, preferred_language).ok_or_else(|| {
            SvarError::SourceUnavailable(format!("No transcript exists for video {}", video_id))
        })?;
        debug!(
            "Selected caption track {} for video {}",
            track.language_code, video_id
        );

        let transcript_url = format!("{}&fmt=json3", track.base_url);
        let payload: TranscriptPayload = self
            .http
            .get(&transcript_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let text = concat_events(&payload);
        if text.is_empty() {
            return Err(SvarError::SourceUnavailable(format!(
                "Transcript for video {} is empty",
                video_id
            )));
        }

        Ok(text)
    }

    /// Fetch the caption track list from the watch page.
    async fn fetch_caption_tracks(&self, video_id: &str) -> Result<Vec<CaptionTrack>> {
        let watch_url = format!("https://www.youtube.com/watch?v={}", video_id);
        let html = self
            .http
            .get(&watch_url)
            .header("Accept-Language", "en-US")
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let tracks_json = self
            .caption_tracks_regex
            .captures(&html)
            .and_then(|caps| caps.get(1))
            .ok_or_else(|| {
                SvarError::SourceUnavailable(format!(
                    "No transcript exists for video {}",
                    video_id
                ))
            })?;

        let tracks: Vec<CaptionTrack> = serde_json::from_str(tracks_json.as_str())?;
        if tracks.is_empty() {
            return Err(SvarError::SourceUnavailable(format!(
                "No transcript exists for video {}",
                video_id
            )));
        }

        Ok(tracks)
    }
}

impl Default for YoutubeTranscriptSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id_short_link() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_extract_video_id_query_param() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap(),
            "dQw4w9WgXcQ"
        );
        // The v parameter counts on any host
        assert_eq!(
            extract_video_id("https://m.youtube.com/watch?t=42&v=abc123").unwrap(),
            "abc123"
        );
    }

    #[test]
    fn test_extract_video_id_invalid_shapes() {
        assert!(matches!(
            extract_video_id("not-a-url"),
            Err(SvarError::InvalidSource(_))
        ));
        assert!(matches!(
            extract_video_id("https://example.com/watch"),
            Err(SvarError::InvalidSource(_))
        ));
        assert!(matches!(
            extract_video_id("https://youtu.be/"),
            Err(SvarError::InvalidSource(_))
        ));
        assert!(matches!(
            extract_video_id(""),
            Err(SvarError::InvalidSource(_))
        ));
    }

    fn track(lang: &str) -> CaptionTrack {
        CaptionTrack {
            base_url: format!("https://captions.example/{}", lang),
            language_code: lang.to_string(),
            kind: None,
        }
    }

    #[test]
    fn test_select_track_prefers_language() {
        let tracks = vec![track("en"), track("hi")];
        let selected = select_track(&tracks, Some("hi")).unwrap();
        assert_eq!(selected.language_code, "hi");
    }

    #[test]
    fn test_select_track_falls_back_to_default() {
        let tracks = vec![track("en"), track("de")];
        let selected = select_track(&tracks, Some("hi")).unwrap();
        assert_eq!(selected.language_code, "en");
    }

    #[test]
    fn test_select_track_empty() {
        assert!(select_track(&[], Some("en")).is_none());
    }

    #[test]
    fn test_concat_events_joins_with_spaces() {
        let payload: TranscriptPayload = serde_json::from_str(
            r#"{"events":[
                {"segs":[{"utf8":"hello"},{"utf8":"\n"}]},
                {},
                {"segs":[{"utf8":" world "}]}
            ]}"#,
        )
        .unwrap();

        assert_eq!(concat_events(&payload), "hello world");
    }
}
