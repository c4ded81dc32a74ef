//! Dashboard snapshot model

use serde::{Deserialize, Serialize};

use super::{
    LastfmAlbum, LastfmArtist, LastfmTag, LastfmTrack, LastfmUser, Period, RecentTrack,
    SimilarArtist,
};

/// One aggregated genre entry, weighted by listening volume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreCount {
    pub name: String,
    pub count: i64,
}

/// The consolidated dashboard snapshot
///
/// Rebuilt wholesale on every fetch; never partially updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub username: String,
    pub period: Period,
    pub user: LastfmUser,
    pub top_artists: Vec<LastfmArtist>,
    pub top_tracks: Vec<LastfmTrack>,
    pub top_albums: Vec<LastfmAlbum>,
    pub recent_tracks: Vec<RecentTrack>,
    pub top_tags: Vec<LastfmTag>,
    pub genre_breakdown: Vec<GenreCount>,
    pub similar_artists: Vec<SimilarArtist>,
}
