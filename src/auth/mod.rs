//! Password digests, credential checks and the session value.

use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::db::{users, DbPool};
use crate::error::{CrmError, CrmResult};

/// Unsalted SHA-256 of the password, lower-case hex
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verify a password against a stored digest
pub fn verify_password(password: &str, hash: &str) -> bool {
    let computed = hash_password(password);
    let computed = computed.as_bytes();
    let stored = hash.as_bytes();

    // Only compare if lengths match (constant-time check)
    computed.len() == stored.len() && computed.ct_eq(stored).into()
}

/// Generate a random session token
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

/// A logged-in operator. Exists only while the main interface is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub username: String,
}

impl Session {
    fn new(username: impl Into<String>) -> Self {
        Self {
            token: generate_token(),
            username: username.into(),
        }
    }
}

/// Check a username/password pair and open a session on success
pub async fn authenticate(db: &DbPool, username: &str, password: &str) -> CrmResult<Session> {
    let user = users::find_by_username(db, username).await?;

    match user {
        Some(user) if verify_password(password, &user.password_hash) => {
            info!(username = %user.username, "Login succeeded");
            Ok(Session::new(user.username))
        }
        _ => {
            warn!(username = %username, "Login failed");
            Err(CrmError::InvalidCredentials)
        }
    }
}

/// Replace the session user's password after checking the current one.
///
/// Checks run in prompt order: current password, new password, confirmation.
pub async fn change_password(
    db: &DbPool,
    username: &str,
    current: &str,
    new: &str,
    confirm: &str,
) -> CrmResult<()> {
    let user = users::find_by_username(db, username)
        .await?
        .ok_or(CrmError::IncorrectPassword)?;

    if !verify_password(current, &user.password_hash) {
        return Err(CrmError::IncorrectPassword);
    }
    if new.is_empty() {
        return Err(CrmError::EmptyPassword);
    }
    if new != confirm {
        return Err(CrmError::PasswordMismatch);
    }

    users::update_password_hash(db, username, &hash_password(new)).await?;
    info!(username = %username, "Password changed");
    Ok(())
}
