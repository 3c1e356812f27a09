//! Database seeders for built-in data
//!
//! The store ships with exactly one operator account. Its name and initial
//! password come from configuration.

use sqlx::SqlitePool;
use tracing::info;

use crate::auth::hash_password;
use crate::db::users;

/// Create the admin account if it does not exist yet. Returns true when created.
pub async fn seed_admin_user(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<bool, sqlx::Error> {
    if users::find_by_username(pool, username).await?.is_some() {
        return Ok(false);
    }

    users::insert(pool, username, &hash_password(password)).await?;
    info!(username = %username, "Created admin account");
    Ok(true)
}
