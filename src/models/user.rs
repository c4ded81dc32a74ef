//! Local account and profile models

use serde::{Deserialize, Serialize};

/// A local account, provisioned from a Last.fm identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Database ID
    pub id: i64,
    /// Username (the Last.fm username verbatim)
    pub username: String,
    /// Password hash (not serialized to JSON)
    #[serde(skip_serializing)]
    pub password: String,
}

impl User {
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            id: 0,
            username,
            password: password_hash,
        }
    }
}

/// Persisted mirror of the Last.fm profile, one row per local account
///
/// Created on first successful token exchange; the session key, avatar and
/// playcount are refreshed on every later login. Never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,
    pub lastfm_username: String,
    pub lastfm_session_key: String,
    pub display_name: String,
    pub avatar_url: String,
    pub country: Option<String>,
    pub playcount: i64,
    /// Registration date as unix seconds
    pub registered_at: Option<i64>,
}
