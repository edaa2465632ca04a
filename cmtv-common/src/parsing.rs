//! Text extraction helpers for scraped titles, links and table cells
//!
//! Each helper is narrow on purpose: it handles the one convention the
//! corresponding source uses and documents its fallback.

use once_cell::sync::Lazy;
use regex::Regex;

/// Artist used when a video title carries no recognizable separator
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

static VIDEO_ID_QUERY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&]v=([^&#]+)").expect("valid video id regex"));
static VIDEO_ID_SHORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"youtu\.be/([^?&#/]+)").expect("valid short link regex"));
static QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"["“]([^"”]+)["”]"#).expect("valid quote regex"));
static REFERENCE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\d+\]").expect("valid reference regex"));
static PARENTHESIZED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(.*?\)").expect("valid parentheses regex"));

/// Artist/title pair split out of a raw video title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTitle {
    pub artist: String,
    pub title: String,
}

/// Split an "Artist - Title" (or "Artist: Title") video title
///
/// The first separator splits; later occurrences stay in the title. With no
/// separator the artist is [`UNKNOWN_ARTIST`] and the title is the raw text.
pub fn parse_video_title(raw: &str) -> ParsedTitle {
    for separator in [" - ", ": "] {
        if let Some((artist, title)) = raw.split_once(separator) {
            return ParsedTitle {
                artist: artist.trim().to_string(),
                title: title.trim().to_string(),
            };
        }
    }

    ParsedTitle {
        artist: UNKNOWN_ARTIST.to_string(),
        title: raw.to_string(),
    }
}

/// Extract the video id from a watch URL (`...?v=<id>&...`) or a `youtu.be/<id>` link
pub fn extract_video_id(href: &str) -> Option<String> {
    VIDEO_ID_QUERY
        .captures(href)
        .or_else(|| VIDEO_ID_SHORT.captures(href))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// First double-quoted run in a table cell (straight or typographic quotes)
pub fn extract_quoted_title(cell_text: &str) -> Option<String> {
    QUOTED
        .captures(cell_text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Strip `[n]` reference markers and parenthesized runs from an artist cell
pub fn clean_artist_cell(cell_text: &str) -> String {
    let without_refs = REFERENCE_MARKER.replace_all(cell_text, "");
    let without_parens = PARENTHESIZED.replace_all(&without_refs, "");
    without_parens.trim().to_string()
}

/// Collapse runs of whitespace (including newlines from markup) to single spaces
pub fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
