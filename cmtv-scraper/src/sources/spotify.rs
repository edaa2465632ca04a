//! Spotify playlist page parsing
//!
//! Only title/artist pairs come from Spotify; videos are found afterwards by
//! searching YouTube.

use cmtv_common::parsing::squash_whitespace;
use scraper::{ElementRef, Html};

use super::{selector, TrackRef};
use crate::error::ScrapeResult;

fn first_text(row: &ElementRef<'_>, css: &str) -> ScrapeResult<Option<String>> {
    let sel = selector(css)?;
    Ok(row
        .select(&sel)
        .map(|e| squash_whitespace(&e.text().collect::<String>()))
        .find(|t| !t.is_empty()))
}

/// Parse the track rows of a playlist page, in playlist order
///
/// Rows missing either a title or an artist are skipped.
pub fn parse_playlist_page(html: &str) -> ScrapeResult<Vec<TrackRef>> {
    let document = Html::parse_document(html);
    let rows = selector(r#"[data-testid="tracklist-row"]"#)?;

    let mut tracks = Vec::new();
    for row in document.select(&rows) {
        let title = match first_text(&row, r#"[data-testid="internal-track-link"]"#)? {
            Some(title) => Some(title),
            None => first_text(&row, r#"a[href*="/track/"]"#)?,
        };
        let artist = first_text(&row, r#"a[href*="/artist/"]"#)?;

        match (title, artist) {
            (Some(title), Some(artist)) => tracks.push(TrackRef { title, artist }),
            _ => tracing::debug!("Skipping Spotify row without title or artist"),
        }
    }
    Ok(tracks)
}
