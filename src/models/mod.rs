//! Data models for fmdash
//!
//! This module contains all the core data structures used throughout the application.

mod dashboard;
mod enums;
mod lastfm;
mod user;

pub use dashboard::{DashboardData, GenreCount};
pub use enums::Period;
pub use lastfm::{
    pick_image, LastfmAlbum, LastfmArtist, LastfmImage, LastfmTag, LastfmTrack, LastfmUser,
    RecentTrack, SimilarArtist,
};
pub use user::{Profile, User};
