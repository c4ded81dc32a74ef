//! Dashboard fetch orchestration
//!
//! One fetch produces one consolidated snapshot. The six base reads are
//! required and awaited jointly; a single failure among them aborts the
//! fetch. The per-artist tag lookups and the similar-artists lookup are
//! optional enrichment: a failure there degrades the output instead of
//! aborting.

use std::collections::HashMap;
use std::future::Future;

use tracing::warn;

use crate::config::{
    GENRE_ARTIST_LIMIT, GENRE_LIMIT, RECENT_LIMIT, SIMILAR_LIMIT, TAGS_PER_ARTIST, TOP_LIMIT,
};
use crate::lastfm::{LastfmClient, LastfmError};
use crate::models::{DashboardData, GenreCount, LastfmArtist, LastfmTag, Period};

/// Fetch everything for one user/period and assemble the snapshot
pub async fn fetch_dashboard(
    client: &LastfmClient,
    username: &str,
    period: Period,
) -> Result<DashboardData, LastfmError> {
    // required reads: all six must succeed or the whole fetch fails
    let (user, top_artists, top_tracks, top_albums, recent_tracks, top_tags) = tokio::try_join!(
        client.get_user_info(username),
        client.get_top_artists(username, period, TOP_LIMIT),
        client.get_top_tracks(username, period, TOP_LIMIT),
        client.get_top_albums(username, period, TOP_LIMIT),
        client.get_recent_tracks(username, RECENT_LIMIT),
        client.get_user_top_tags(username),
    )?;

    // optional wave: per-artist tags, each failure contributing zero tags
    let considered = &top_artists[..top_artists.len().min(GENRE_ARTIST_LIMIT)];
    let tag_lists = futures::future::join_all(considered.iter().map(|artist| {
        optional(
            client.get_artist_top_tags(&artist.name),
            format!("tags for artist '{}'", artist.name),
        )
    }))
    .await;

    let genre_breakdown = aggregate_genres(considered, &tag_lists);

    // optional: similar artists for the current favorite
    let similar_artists = match top_artists.first() {
        Some(artist) => {
            optional(
                client.get_similar_artists(&artist.name, SIMILAR_LIMIT),
                format!("similar artists for '{}'", artist.name),
            )
            .await
        }
        None => Vec::new(),
    };

    Ok(DashboardData {
        username: username.to_string(),
        period,
        user,
        top_artists,
        top_tracks,
        top_albums,
        recent_tracks,
        top_tags,
        genre_breakdown,
        similar_artists,
    })
}

/// Await an optional lookup, logging the failure and yielding the default
async fn optional<T, F>(fut: F, what: String) -> T
where
    T: Default,
    F: Future<Output = Result<T, LastfmError>>,
{
    match fut.await {
        Ok(value) => value,
        Err(e) => {
            warn!("Skipping {}: {}", what, e);
            T::default()
        }
    }
}

/// Aggregate artist tags into a genre breakdown
///
/// Every tag of an artist (up to five) is credited with that artist's full
/// play count, so a genre shared by heavily-played artists outranks one
/// shared by many lightly-played ones. Tag names are merged case-insensitively.
pub fn aggregate_genres(artists: &[LastfmArtist], tag_lists: &[Vec<LastfmTag>]) -> Vec<GenreCount> {
    let mut totals: HashMap<String, i64> = HashMap::new();

    for (artist, tags) in artists.iter().zip(tag_lists) {
        let playcount = artist.playcount();
        for tag in tags.iter().take(TAGS_PER_ARTIST) {
            *totals.entry(tag.name.to_lowercase()).or_insert(0) += playcount;
        }
    }

    let mut breakdown: Vec<GenreCount> = totals
        .into_iter()
        .map(|(name, count)| GenreCount { name, count })
        .collect();

    // count descending, name ascending on ties so output is deterministic
    breakdown.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    breakdown.truncate(GENRE_LIMIT);

    breakdown
}
