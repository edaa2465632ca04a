//! Wikipedia chart table parsing
//!
//! Reads the "List of Billboard number-one country songs" tables: the song
//! title is quoted in the first cell and the artist sits in the second cell
//! with reference markers and "(featuring ...)" notes attached.

use cmtv_common::parsing::{clean_artist_cell, extract_quoted_title};
use scraper::Html;
use std::collections::HashSet;

use super::{selector, TrackRef};
use crate::error::ScrapeResult;

/// Parse unique songs from `table.wikitable` rows, in table order
///
/// A song reappearing in later weeks is kept once. At most `limit` songs are
/// returned.
pub fn parse_chart_tables(html: &str, limit: usize) -> ScrapeResult<Vec<TrackRef>> {
    let document = Html::parse_document(html);
    let rows = selector("table.wikitable tbody tr")?;
    let cells = selector("td")?;

    let mut seen = HashSet::new();
    let mut tracks = Vec::new();

    for row in document.select(&rows) {
        if tracks.len() >= limit {
            break;
        }

        let texts: Vec<String> = row
            .select(&cells)
            .map(|cell| cell.text().collect::<String>())
            .collect();
        if texts.len() < 2 {
            continue;
        }

        let Some(title) = extract_quoted_title(&texts[0]) else {
            continue;
        };
        let artist = clean_artist_cell(&texts[1]);
        if artist.is_empty() || title == "Song" || artist == "Artist" {
            continue;
        }

        if seen.insert(format!("{}-{}", title, artist)) {
            tracks.push(TrackRef { title, artist });
        }
    }

    Ok(tracks)
}
