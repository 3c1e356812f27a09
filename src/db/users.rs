//! User queries.

use crate::db::{DbPool, User};

pub async fn find_by_username(db: &DbPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT id, username, password_hash FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(db)
        .await
}

pub async fn insert(db: &DbPool, username: &str, password_hash: &str) -> Result<i64, sqlx::Error> {
    let result = sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
        .bind(username)
        .bind(password_hash)
        .execute(db)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn update_password_hash(
    db: &DbPool,
    username: &str,
    password_hash: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET password_hash = ? WHERE username = ?")
        .bind(password_hash)
        .bind(username)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

pub async fn count(db: &DbPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(db)
        .await
}
