//! Profile table operations

use anyhow::Result;
use sqlx::FromRow;

use crate::db::DbEngine;
use crate::models::Profile;

/// Database row for profile table
#[derive(Debug, FromRow)]
struct ProfileRow {
    id: i64,
    user_id: i64,
    lastfm_username: String,
    lastfm_session_key: String,
    display_name: String,
    avatar_url: String,
    country: Option<String>,
    playcount: i64,
    registered_at: Option<i64>,
}

impl ProfileRow {
    fn into_profile(self) -> Profile {
        Profile {
            id: self.id,
            user_id: self.user_id,
            lastfm_username: self.lastfm_username,
            lastfm_session_key: self.lastfm_session_key,
            display_name: self.display_name,
            avatar_url: self.avatar_url,
            country: self.country,
            playcount: self.playcount,
            registered_at: self.registered_at,
        }
    }
}

/// Profile table operations
pub struct ProfileTable;

impl ProfileTable {
    /// Get profile by owning user ID
    pub async fn get_by_user_id(user_id: i64) -> Result<Option<Profile>> {
        let engine = DbEngine::get()?;
        let pool = engine.pool();

        let row: Option<ProfileRow> = sqlx::query_as("SELECT * FROM profile WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(|r| r.into_profile()))
    }

    /// Get profile by Last.fm username
    pub async fn get_by_lastfm_username(lastfm_username: &str) -> Result<Option<Profile>> {
        let engine = DbEngine::get()?;
        let pool = engine.pool();

        let row: Option<ProfileRow> =
            sqlx::query_as("SELECT * FROM profile WHERE lastfm_username = ?")
                .bind(lastfm_username)
                .fetch_optional(pool)
                .await?;

        Ok(row.map(|r| r.into_profile()))
    }

    /// Insert a profile
    pub async fn insert(profile: &Profile) -> Result<i64> {
        let engine = DbEngine::get()?;
        let pool = engine.pool();

        let result = sqlx::query(
            "INSERT INTO profile (user_id, lastfm_username, lastfm_session_key, display_name, \
             avatar_url, country, playcount, registered_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(profile.user_id)
        .bind(&profile.lastfm_username)
        .bind(&profile.lastfm_session_key)
        .bind(&profile.display_name)
        .bind(&profile.avatar_url)
        .bind(&profile.country)
        .bind(profile.playcount)
        .bind(profile.registered_at)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Refresh the mutable fields on a later login
    pub async fn update_on_login(
        user_id: i64,
        session_key: &str,
        avatar_url: &str,
        playcount: i64,
    ) -> Result<()> {
        let engine = DbEngine::get()?;
        let pool = engine.pool();

        sqlx::query(
            "UPDATE profile SET lastfm_session_key = ?, avatar_url = ?, playcount = ? \
             WHERE user_id = ?",
        )
        .bind(session_key)
        .bind(avatar_url)
        .bind(playcount)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Get profile count
    pub async fn count() -> Result<i64> {
        let engine = DbEngine::get()?;
        let pool = engine.pool();

        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM profile")
            .fetch_one(pool)
            .await?;

        Ok(row.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tables::UserTable;
    use crate::models::User;

    // single test so the global engine is initialized exactly once
    #[tokio::test]
    async fn test_profile_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        crate::db::setup_sqlite_at(&dir.path().join("test.db"))
            .await
            .unwrap();

        // first login provisions one account and one profile
        let user_id = UserTable::insert(&User::new("alice".to_string(), "hash".to_string()))
            .await
            .unwrap();

        let profile = Profile {
            id: 0,
            user_id,
            lastfm_username: "alice".to_string(),
            lastfm_session_key: "sk-1".to_string(),
            display_name: "Alice".to_string(),
            avatar_url: "http://img/alice.png".to_string(),
            country: Some("Iceland".to_string()),
            playcount: 100,
            registered_at: Some(1_371_639_437),
        };
        ProfileTable::insert(&profile).await.unwrap();

        assert_eq!(UserTable::count().await.unwrap(), 1);
        assert_eq!(ProfileTable::count().await.unwrap(), 1);

        let stored = ProfileTable::get_by_user_id(user_id).await.unwrap().unwrap();
        assert_eq!(stored.lastfm_session_key, "sk-1");
        assert_eq!(stored.playcount, 100);
        assert_eq!(stored.registered_at, Some(1_371_639_437));

        // a later login updates the same row instead of creating another
        ProfileTable::update_on_login(user_id, "sk-2", "http://img/new.png", 150)
            .await
            .unwrap();

        assert_eq!(ProfileTable::count().await.unwrap(), 1);
        let updated = ProfileTable::get_by_user_id(user_id).await.unwrap().unwrap();
        assert_eq!(updated.lastfm_session_key, "sk-2");
        assert_eq!(updated.avatar_url, "http://img/new.png");
        assert_eq!(updated.playcount, 150);
        // immutable fields are untouched
        assert_eq!(updated.display_name, "Alice");
        assert_eq!(updated.country.as_deref(), Some("Iceland"));

        // lookup by the external identity works too
        let by_name = ProfileTable::get_by_lastfm_username("alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_name.user_id, user_id);
    }
}
