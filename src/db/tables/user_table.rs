//! User table operations

use anyhow::Result;
use sqlx::FromRow;

use crate::db::DbEngine;
use crate::models::User;

/// Database row for user table
#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password: String,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            password: self.password,
        }
    }
}

/// User table operations
pub struct UserTable;

impl UserTable {
    /// Get user by ID
    pub async fn get_by_id(id: i64) -> Result<Option<User>> {
        let engine = DbEngine::get()?;
        let pool = engine.pool();

        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM user WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(|r| r.into_user()))
    }

    /// Get user by username
    pub async fn get_by_username(username: &str) -> Result<Option<User>> {
        let engine = DbEngine::get()?;
        let pool = engine.pool();

        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM user WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(|r| r.into_user()))
    }

    /// Insert a user
    pub async fn insert(user: &User) -> Result<i64> {
        let engine = DbEngine::get()?;
        let pool = engine.pool();

        let result = sqlx::query("INSERT INTO user (username, password) VALUES (?, ?)")
            .bind(&user.username)
            .bind(&user.password)
            .execute(pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    /// Get user count
    pub async fn count() -> Result<i64> {
        let engine = DbEngine::get()?;
        let pool = engine.pool();

        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user")
            .fetch_one(pool)
            .await?;

        Ok(row.0)
    }
}
