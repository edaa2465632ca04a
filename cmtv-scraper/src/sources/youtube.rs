//! YouTube page parsing: playlists, watch pages and search results
//!
//! YouTube renders its lists client-side from a JSON blob assigned to
//! `ytInitialData` inside a script tag. Parsers read that blob first and fall
//! back to rendered markup (`a#video-title`) when a page was saved after
//! rendering.

use cmtv_common::parsing::{extract_video_id, parse_video_title, squash_whitespace};
use cmtv_common::Candidate;
use scraper::Html;
use serde_json::Value;

use super::selector;
use crate::error::ScrapeResult;

const INITIAL_DATA_MARKER: &str = "ytInitialData";

/// Watch page URL for a video id
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Playlist page URL for a playlist id
pub fn playlist_url(playlist_id: &str) -> String {
    format!("https://www.youtube.com/playlist?list={}", playlist_id)
}

/// Search results URL for a free-text query
pub fn search_url(query: &str) -> String {
    match reqwest::Url::parse_with_params(
        "https://www.youtube.com/results",
        &[("search_query", query)],
    ) {
        Ok(url) => url.to_string(),
        Err(_) => format!("https://www.youtube.com/results?search_query={}", query),
    }
}

/// A video entry as listed on a playlist page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistVideo {
    pub video_id: String,
    pub raw_title: String,
}

impl PlaylistVideo {
    /// Split the raw title into artist/title and build a merge candidate
    pub fn into_candidate(self) -> Candidate {
        let parsed = parse_video_title(&self.raw_title);
        Candidate::new(parsed.title, parsed.artist, self.video_id)
    }
}

/// Extract and parse the `ytInitialData` JSON object embedded in a page
pub fn extract_initial_data(html: &str) -> Option<Value> {
    let marker = html.find(INITIAL_DATA_MARKER)?;
    let rest = &html[marker + INITIAL_DATA_MARKER.len()..];
    let brace = rest.find('{')?;
    // Only `=`, whitespace or a closing quote/bracket may sit between marker and object
    if !rest[..brace]
        .chars()
        .all(|c| c.is_whitespace() || matches!(c, '=' | '"' | '\'' | ']' | ':'))
    {
        return None;
    }

    serde_json::Deserializer::from_str(&rest[brace..])
        .into_iter::<Value>()
        .next()
        .and_then(|parsed| parsed.ok())
}

/// Collect every object stored under `key`, depth-first in document order
fn collect_renderers<'a>(value: &'a Value, key: &str, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                if k == key {
                    out.push(v);
                } else {
                    collect_renderers(v, key, out);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_renderers(item, key, out);
            }
        }
        _ => {}
    }
}

/// Text of a YouTube text object (`simpleText` or concatenated `runs`)
fn text_of(value: &Value) -> Option<String> {
    if let Some(simple) = value.get("simpleText").and_then(Value::as_str) {
        return Some(simple.trim().to_string());
    }
    let runs = value.get("runs")?.as_array()?;
    let text: String = runs
        .iter()
        .filter_map(|run| run.get("text").and_then(Value::as_str))
        .collect();
    Some(text.trim().to_string())
}

/// Parse the videos listed on a playlist page, in playlist order
pub fn parse_playlist_page(html: &str) -> ScrapeResult<Vec<PlaylistVideo>> {
    if let Some(data) = extract_initial_data(html) {
        let mut renderers = Vec::new();
        collect_renderers(&data, "playlistVideoRenderer", &mut renderers);

        let videos: Vec<PlaylistVideo> = renderers
            .into_iter()
            .filter_map(|renderer| {
                let video_id = renderer.get("videoId")?.as_str()?.to_string();
                let raw_title = renderer.get("title").and_then(text_of)?;
                (!video_id.is_empty() && !raw_title.is_empty())
                    .then_some(PlaylistVideo { video_id, raw_title })
            })
            .collect();

        if !videos.is_empty() {
            return Ok(videos);
        }
    }

    parse_rendered_video_links(html)
}

/// Fallback for rendered markup: `a#video-title` anchors with a watch link
fn parse_rendered_video_links(html: &str) -> ScrapeResult<Vec<PlaylistVideo>> {
    let document = Html::parse_document(html);
    let anchors = selector("a#video-title")?;

    Ok(document
        .select(&anchors)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            let video_id = extract_video_id(href)?;
            let raw_title = anchor
                .value()
                .attr("title")
                .map(str::to_string)
                .unwrap_or_else(|| squash_whitespace(&anchor.text().collect::<String>()));
            (!raw_title.is_empty()).then_some(PlaylistVideo { video_id, raw_title })
        })
        .collect())
}

/// Title of a watch page
///
/// Tries `meta[name=title]`, `meta[property=og:title]`, `h1.title`, then the
/// document title minus the " - YouTube" suffix.
pub fn parse_video_page_title(html: &str) -> ScrapeResult<Option<String>> {
    let document = Html::parse_document(html);

    for css in [r#"meta[name="title"]"#, r#"meta[property="og:title"]"#] {
        let sel = selector(css)?;
        if let Some(content) = document
            .select(&sel)
            .filter_map(|m| m.value().attr("content"))
            .map(squash_whitespace)
            .find(|c| !c.is_empty())
        {
            return Ok(Some(content));
        }
    }

    for css in ["h1.ytd-watch-metadata yt-formatted-string", "h1.title"] {
        let sel = selector(css)?;
        if let Some(text) = document
            .select(&sel)
            .map(|h| squash_whitespace(&h.text().collect::<String>()))
            .find(|t| !t.is_empty())
        {
            return Ok(Some(text));
        }
    }

    let title_sel = selector("title")?;
    Ok(document
        .select(&title_sel)
        .map(|t| squash_whitespace(&t.text().collect::<String>()))
        .map(|t| t.trim_end_matches(" - YouTube").trim().to_string())
        .find(|t| !t.is_empty() && t != "YouTube"))
}

/// First video id on a search results page
pub fn parse_search_first_video(html: &str) -> ScrapeResult<Option<String>> {
    if let Some(data) = extract_initial_data(html) {
        let mut renderers = Vec::new();
        collect_renderers(&data, "videoRenderer", &mut renderers);
        if let Some(id) = renderers
            .into_iter()
            .filter_map(|r| r.get("videoId").and_then(Value::as_str))
            .find(|id| !id.is_empty())
        {
            return Ok(Some(id.to_string()));
        }
    }

    let document = Html::parse_document(html);
    let anchors = selector(r#"a#video-title[href^="/watch?v="]"#)?;
    Ok(document
        .select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .find_map(extract_video_id))
}
