//! Billboard chart page parsing

use cmtv_common::parsing::squash_whitespace;
use scraper::Html;

use super::{selector, TrackRef};
use crate::error::ScrapeResult;

/// Parse chart entries in rank order, at most `limit`
///
/// Each chart row is a `ul.o-chart-results-list-row`; the list item holding
/// `h3#title-of-a-story` carries the title, and the first `span.c-label`
/// inside that same item is the artist.
pub fn parse_chart_page(html: &str, limit: usize) -> ScrapeResult<Vec<TrackRef>> {
    let document = Html::parse_document(html);
    let rows = selector("ul.o-chart-results-list-row")?;
    let items = selector("li")?;
    let title_sel = selector("h3#title-of-a-story")?;
    let artist_sel = selector("span.c-label")?;

    let mut tracks = Vec::new();
    for row in document.select(&rows) {
        if tracks.len() >= limit {
            break;
        }

        let entry = row.select(&items).find_map(|item| {
            let title = item
                .select(&title_sel)
                .map(|h| squash_whitespace(&h.text().collect::<String>()))
                .find(|t| !t.is_empty())?;
            let artist = item
                .select(&artist_sel)
                .map(|s| squash_whitespace(&s.text().collect::<String>()))
                .find(|t| !t.is_empty())?;
            Some(TrackRef { title, artist })
        });

        if let Some(track) = entry {
            tracks.push(track);
        }
    }

    Ok(tracks)
}
