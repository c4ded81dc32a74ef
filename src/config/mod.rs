//! Configuration module for fmdash
//!
//! This module contains the application configuration structures and path management.

mod paths;
mod user_config;

pub use paths::Paths;
pub use user_config::UserConfig;

/// Limit for the top artists/tracks/albums reads
pub const TOP_LIMIT: u32 = 50;

/// Limit for the recent tracks read
pub const RECENT_LIMIT: u32 = 30;

/// Number of top artists considered for the genre breakdown
pub const GENRE_ARTIST_LIMIT: usize = 20;

/// Tags counted per artist when aggregating genres
pub const TAGS_PER_ARTIST: usize = 5;

/// Maximum genre breakdown entries kept after sorting
pub const GENRE_LIMIT: usize = 15;

/// Limit for the similar-artists lookup
pub const SIMILAR_LIMIT: u32 = 8;
